use thiserror::Error;

use crate::core::types::{ConnectionId, PersonId, ToolId};

#[derive(Error, Debug)]
pub enum OutbreakError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("Person {id} out of range (population {population})")]
    PersonOutOfRange { id: PersonId, population: usize },

    #[error("Connection {id:?} out of range ({count} connections)")]
    ConnectionOutOfRange { id: ConnectionId, count: usize },

    #[error("No connection between persons {0} and {1}")]
    NoSuchConnection(PersonId, PersonId),

    #[error("{tool} cannot be applied to this kind of target")]
    InvalidTarget { tool: ToolId },

    #[error("Game is already over on day {0}")]
    GameOver(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OutbreakError>;
