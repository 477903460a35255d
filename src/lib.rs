//! Outbreak Sim - turn-based outbreak control on contact networks

pub mod core;
pub mod interventions;
pub mod network;
pub mod scoring;
pub mod session;
pub mod simulation;

pub use crate::core::config::GameConfig;
pub use crate::core::error::{OutbreakError, Result};
pub use crate::core::types::{ConnectionId, HealthState, PersonId, ToolId, Topology};
pub use crate::interventions::{Target, ToolOutcome};
pub use crate::scoring::ScoreReport;
pub use crate::session::{DayReport, SessionController};
