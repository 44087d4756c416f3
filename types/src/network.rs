//! Deployment environment identifier.

use serde::{Deserialize, Serialize};

/// Which deployment of the voting network a gateway belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// The production network.
    #[default]
    Prod,
    /// The staging network.
    Stg,
    /// Local development network.
    Dev,
}

impl Environment {
    /// Human-readable name, also the key used in bootnode documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Stg => "stg",
            Self::Dev => "dev",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
