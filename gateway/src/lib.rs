//! Access to the voting network's gateways.
//!
//! Gateways are interchangeable relays. [`GatewayPool`] keeps a ranked list
//! of them, sends every request to the head and rotates past gateways that
//! fail transiently. Each exchange is a signed JSON request/response pair
//! (see [`wire`]) carried by a [`GatewayTransport`].

pub mod config;
pub mod discovery;
pub mod error;
pub mod handle;
pub mod pool;
pub mod transport;
pub mod wire;

pub use config::{ErrorPolicy, GatewayCandidate, GatewayConfig};
pub use discovery::{discover_gateways, parse_bootnodes};
pub use error::GatewayError;
pub use handle::GatewayHandle;
pub use pool::GatewayPool;
pub use transport::{GatewayTransport, HttpTransport};
pub use wire::{GatewayRequest, GatewayResponse};
