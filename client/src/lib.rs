//! High-level client for the ballotlink voting protocol.
//!
//! [`VotingProtocolClient`] ties the pieces together: it talks to gateways
//! through a caller-owned [`GatewayPool`](ballotlink_gateway::GatewayPool),
//! manages processes through a [`ChainProvider`](ballotlink_chain::ChainProvider),
//! stores metadata through a [`ContentStorage`] and computes results
//! digests once a process is over.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod results;
pub mod sleeper;
pub mod state;
pub mod storage;

pub use client::{ProcessKeys, RawResults, VotingProtocolClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use logging::{init_logging, LogFormat};
pub use metadata::{Choice, MultiLanguage, ProcessMetadata, Question};
pub use results::{digest_results, DigestedQuestion, DigestedResults, OptionResult};
pub use sleeper::{Sleeper, TokioSleeper};
pub use state::{EnvelopeStatus, ProcessState};
pub use storage::{fetch_content, pinned_origin, ContentStorage, GatewayStorage, StorageError};
