//! Player interventions: legality rules and effects

pub mod engine;
pub mod rules;

pub use engine::{Effect, InterventionEngine, Target, ToolOutcome};
pub use rules::Denial;

use serde::Serialize;

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{Day, ToolId};
use crate::session::state::GameState;

/// Tool panel entry: today's usage against the adjusted limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub tool: ToolId,
    pub used_today: u32,
    pub daily_limit: u32,
    pub available_day: Day,
    /// Unlocked and with uses left today
    pub available: bool,
}

/// Status of every tool for the current day
pub fn tool_status(config: &GameConfig, state: &GameState) -> Result<Vec<ToolStatus>> {
    ToolId::ALL
        .iter()
        .map(|&tool| {
            let tool_config = config.tool(tool)?;
            let daily_limit = tool_config.daily_limit(&state.difficulty);
            let used_today = state.usage(tool);
            Ok(ToolStatus {
                tool,
                used_today,
                daily_limit,
                available_day: tool_config.available_day,
                available: !state.is_game_over()
                    && state.day() >= tool_config.available_day
                    && used_today < daily_limit,
            })
        })
        .collect()
}
