//! Intervention legality rules
//!
//! Checks run in a fixed order and the first failure wins:
//! game over -> availability day -> daily quota -> once-per-person ->
//! target still present -> tool-specific target restrictions.
//! A denial is a normal outcome, not an error.

use serde::Serialize;
use std::fmt;

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{ConnectionId, Day, HealthState, PersonId, ToolId};
use crate::network::graph::Network;
use crate::session::state::GameState;

/// A target after kind and range validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTarget {
    Person(PersonId),
    Connection(ConnectionId),
}

/// Why an intervention was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Denial {
    GameOver,
    NotYetAvailable { tool: ToolId, available_day: Day },
    DailyLimitReached { tool: ToolId, limit: u32 },
    AlreadyUsedOn { tool: ToolId, person: PersonId },
    AlreadyRemoved { person: PersonId },
    AlreadySevered { source: PersonId, target: PersonId },
    VaccinateInfected { person: PersonId },
    NaturalImmunity { person: PersonId },
    NotHealthy { person: PersonId },
    ConnectivityFloor { floor: usize },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::GameOver => write!(f, "The simulation has ended"),
            Denial::NotYetAvailable { tool, available_day } => {
                write!(f, "{} not available until day {}", tool, available_day)
            }
            Denial::DailyLimitReached { tool, limit } => {
                write!(f, "Daily limit reached for {} ({}/day)", tool, limit)
            }
            Denial::AlreadyUsedOn { tool, person } => {
                write!(f, "{} already used on person {}", tool, person)
            }
            Denial::AlreadyRemoved { person } => {
                write!(f, "Person {} has already been removed from the network", person)
            }
            Denial::AlreadySevered { source, target } => {
                write!(f, "Connection between persons {} and {} is already severed", source, target)
            }
            Denial::VaccinateInfected { person } => {
                write!(f, "Cannot vaccinate infected person {} - try quarantine instead", person)
            }
            Denial::NaturalImmunity { person } => {
                write!(f, "Person {} has already recovered and has natural immunity", person)
            }
            Denial::NotHealthy { .. } => write!(f, "Can only vaccinate healthy individuals"),
            Denial::ConnectivityFloor { floor } => write!(
                f,
                "Cannot sever more connections - at least {} connections are required for society to function",
                floor
            ),
        }
    }
}

/// Evaluate every legality rule for `tool` on `target`
///
/// Returns `Ok(None)` when the intervention is allowed.
pub fn check(
    config: &GameConfig,
    state: &GameState,
    network: &Network,
    tool: ToolId,
    target: ResolvedTarget,
) -> Result<Option<Denial>> {
    if state.is_game_over() {
        return Ok(Some(Denial::GameOver));
    }

    let tool_config = config.tool(tool)?;

    if state.day() < tool_config.available_day {
        return Ok(Some(Denial::NotYetAvailable {
            tool,
            available_day: tool_config.available_day,
        }));
    }

    let limit = tool_config.daily_limit(&state.difficulty);
    if state.usage(tool) >= limit {
        return Ok(Some(Denial::DailyLimitReached { tool, limit }));
    }

    match target {
        ResolvedTarget::Person(id) => {
            if tool_config.once_per_person && state.has_used_on(tool, id) {
                return Ok(Some(Denial::AlreadyUsedOn { tool, person: id }));
            }

            let person = network.person(id)?;
            if person.removed {
                return Ok(Some(Denial::AlreadyRemoved { person: id }));
            }

            if tool == ToolId::Vaccinate {
                return Ok(vaccination_denial(id, person.health));
            }
            Ok(None)
        }
        ResolvedTarget::Connection(id) => {
            let connection = network.connection(id)?;
            if connection.severed {
                return Ok(Some(Denial::AlreadySevered {
                    source: connection.source,
                    target: connection.target,
                }));
            }

            // Severing must leave strictly more than the floor
            let floor = config.engine.min_connectivity;
            if network.active_edge_count().saturating_sub(1) <= floor {
                return Ok(Some(Denial::ConnectivityFloor { floor }));
            }
            Ok(None)
        }
    }
}

fn vaccination_denial(person: PersonId, health: HealthState) -> Option<Denial> {
    match health {
        HealthState::Susceptible => None,
        HealthState::Infected => Some(Denial::VaccinateInfected { person }),
        HealthState::Recovered => Some(Denial::NaturalImmunity { person }),
        _ => Some(Denial::NotHealthy { person }),
    }
}
