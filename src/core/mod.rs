pub mod config;
pub mod error;
pub mod types;

pub use config::{DifficultyConfig, EngineConfig, GameConfig, NetworkParams, ScenarioConfig, ToolConfig};
pub use error::{OutbreakError, Result};
pub use types::{ConnectionId, Day, HealthState, PersonId, ToolId, Topology};
