//! Intervention execution - validates a tool use and applies its effect

use serde::Serialize;

use crate::core::config::GameConfig;
use crate::core::error::{OutbreakError, Result};
use crate::core::types::{ConnectionId, HealthState, PersonId, ToolId};
use crate::interventions::rules::{self, Denial, ResolvedTarget};
use crate::network::graph::Network;
use crate::session::state::GameState;
use crate::simulation::events::Cue;

/// What the host asks a tool to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Person(PersonId),
    Connection(ConnectionId),
    /// The connection joining two people
    Contact(PersonId, PersonId),
}

/// The state change produced by a successful intervention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Effect {
    Vaccinated(PersonId),
    Quarantined { person: PersonId, previous: HealthState },
    Severed(ConnectionId),
    Tested { person: PersonId, positive: bool },
    Traced { person: PersonId, contacts: Vec<(PersonId, HealthState)> },
}

/// Result of a tool use: applied, or denied with a reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ToolOutcome {
    Applied {
        tool: ToolId,
        effect: Effect,
        message: String,
        cue: Cue,
    },
    Denied(Denial),
}

impl ToolOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ToolOutcome::Applied { .. })
    }

    /// Denial reason, if any
    pub fn reason(&self) -> Option<String> {
        match self {
            ToolOutcome::Applied { .. } => None,
            ToolOutcome::Denied(denial) => Some(denial.to_string()),
        }
    }

    pub fn cue(&self) -> Cue {
        match self {
            ToolOutcome::Applied { cue, .. } => *cue,
            ToolOutcome::Denied(_) => Cue::ActionDenied,
        }
    }

    pub fn effect(&self) -> Option<&Effect> {
        match self {
            ToolOutcome::Applied { effect, .. } => Some(effect),
            ToolOutcome::Denied(_) => None,
        }
    }
}

/// Applies player tools to the shared network and game state
pub struct InterventionEngine;

impl InterventionEngine {
    /// Validate and, if legal, apply `tool` to `target`
    ///
    /// Denials leave network, quotas and stats untouched apart from the log
    /// entry. Errors are reserved for malformed requests: out-of-range ids or
    /// a target kind the tool cannot act on.
    pub fn apply(
        network: &mut Network,
        state: &mut GameState,
        config: &GameConfig,
        tool: ToolId,
        target: Target,
    ) -> Result<ToolOutcome> {
        let resolved = resolve_target(network, tool, target)?;

        if let Some(denial) = rules::check(config, state, network, tool, resolved)? {
            tracing::debug!("{} denied: {}", tool, denial);
            state.log(denial.to_string(), false);
            return Ok(ToolOutcome::Denied(denial));
        }

        let (effect, message, important, cue) = match resolved {
            ResolvedTarget::Person(id) => apply_to_person(network, state, tool, id)?,
            ResolvedTarget::Connection(id) => {
                network.sever(id)?;
                let connection = network.connection(id)?;
                state.stats.links_severed += 1;
                let message = format!(
                    "Severed connection between persons {} and {}",
                    connection.source, connection.target
                );
                (Effect::Severed(id), message, false, Cue::LinkBreak)
            }
        };

        let once = config.tool(tool)?.once_per_person;
        let recorded = match resolved {
            ResolvedTarget::Person(id) if once => Some(id),
            _ => None,
        };
        state.record_use(tool, recorded);
        state.log(message.clone(), important);
        tracing::debug!("{} applied on day {}: {}", tool, state.day(), message);

        Ok(ToolOutcome::Applied {
            tool,
            effect,
            message,
            cue,
        })
    }
}

fn resolve_target(network: &Network, tool: ToolId, target: Target) -> Result<ResolvedTarget> {
    let resolved = match target {
        Target::Person(id) => {
            network.person(id)?;
            ResolvedTarget::Person(id)
        }
        Target::Connection(id) => {
            network.connection(id)?;
            ResolvedTarget::Connection(id)
        }
        Target::Contact(a, b) => {
            network.person(a)?;
            network.person(b)?;
            let id = network
                .connection_between(a, b)
                .ok_or(OutbreakError::NoSuchConnection(a, b))?;
            ResolvedTarget::Connection(id)
        }
    };

    let kind_matches = match resolved {
        ResolvedTarget::Person(_) => !tool.targets_connection(),
        ResolvedTarget::Connection(_) => tool.targets_connection(),
    };
    if !kind_matches {
        return Err(OutbreakError::InvalidTarget { tool });
    }
    Ok(resolved)
}

fn apply_to_person(
    network: &mut Network,
    state: &mut GameState,
    tool: ToolId,
    id: PersonId,
) -> Result<(Effect, String, bool, Cue)> {
    match tool {
        ToolId::Vaccinate => {
            let person = network.person_mut(id)?;
            person.health = HealthState::Vaccinated;
            person.removed = true;
            state.stats.total_vaccinated += 1;
            state.stats.total_protected += 1;
            Ok((
                Effect::Vaccinated(id),
                format!("Successfully vaccinated healthy person {}", id),
                true,
                Cue::Vaccination,
            ))
        }
        ToolId::Quarantine => {
            let person = network.person_mut(id)?;
            let previous = person.health;
            person.health = HealthState::Quarantined;
            person.removed = true;
            state.stats.total_quarantined += 1;
            state.stats.total_protected += 1;
            Ok((
                Effect::Quarantined {
                    person: id,
                    previous,
                },
                format!("Quarantined {} person {}", previous, id),
                true,
                Cue::Quarantine,
            ))
        }
        ToolId::Test => {
            let positive = network.person(id)?.health.carries_infection();
            state.stats.tests_run += 1;
            let result = if positive { "positive" } else { "negative" };
            Ok((
                Effect::Tested {
                    person: id,
                    positive,
                },
                format!("Person {} tested {}", id, result),
                positive,
                Cue::Inspection,
            ))
        }
        ToolId::ContactTrace => {
            let mut contacts = Vec::new();
            for contact in network.active_contacts(id) {
                contacts.push((contact, network.person(contact)?.health));
            }
            contacts.sort_by_key(|(contact, _)| *contact);
            state.stats.traces_run += 1;

            let listing: Vec<String> = contacts
                .iter()
                .map(|(contact, health)| format!("{} ({})", contact, health))
                .collect();
            let message = if listing.is_empty() {
                format!("Person {} has no active contacts", id)
            } else {
                format!(
                    "Traced {} active contacts of person {}: {}",
                    listing.len(),
                    id,
                    listing.join(", ")
                )
            };
            Ok((
                Effect::Traced {
                    person: id,
                    contacts,
                },
                message,
                false,
                Cue::Inspection,
            ))
        }
        ToolId::SeverLink => Err(OutbreakError::InvalidTarget { tool }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GameConfig, GameState, Network) {
        let config = GameConfig::default();
        let mut state = GameState::new(
            config.scenario("urban").unwrap().clone(),
            config.difficulty("medium").unwrap().clone(),
            60,
        );
        // Every tool is available from day 3
        state.begin_next_day();
        state.begin_next_day();
        // Path 0-1-...-59 (59 edges)
        let pairs: Vec<(u32, u32)> = (0..59).map(|i| (i, i + 1)).collect();
        let network = Network::from_edges(60, &pairs).unwrap();
        (config, state, network)
    }

    #[test]
    fn test_vaccinate_removes_person_and_counts() {
        let (config, mut state, mut network) = setup();
        let outcome = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::Vaccinate,
            Target::Person(PersonId(5)),
        )
        .unwrap();

        assert!(outcome.is_allowed());
        assert_eq!(outcome.cue(), Cue::Vaccination);
        let person = network.person(PersonId(5)).unwrap();
        assert_eq!(person.health, HealthState::Vaccinated);
        assert!(person.removed);
        assert_eq!(state.usage(ToolId::Vaccinate), 1);
        assert!(state.has_used_on(ToolId::Vaccinate, PersonId(5)));
        assert_eq!(state.stats().total_vaccinated, 1);
        assert_eq!(state.stats().total_protected, 1);
        assert!(state.action_log().last().unwrap().important);
    }

    #[test]
    fn test_quarantine_records_previous_state() {
        let (config, mut state, mut network) = setup();
        network.person_mut(PersonId(7)).unwrap().health = HealthState::Infected;
        let outcome = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::Quarantine,
            Target::Person(PersonId(7)),
        )
        .unwrap();

        assert_eq!(
            outcome.effect(),
            Some(&Effect::Quarantined {
                person: PersonId(7),
                previous: HealthState::Infected
            })
        );
        assert_eq!(
            state.action_log().last().unwrap().message,
            "Quarantined infected person 7"
        );
        assert!(network.person(PersonId(7)).unwrap().is_quarantined());
    }

    #[test]
    fn test_denial_changes_nothing_but_the_log() {
        let (config, mut state, mut network) = setup();
        network.person_mut(PersonId(3)).unwrap().health = HealthState::Infected;
        let before = network.clone();

        let outcome = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::Vaccinate,
            Target::Person(PersonId(3)),
        )
        .unwrap();

        assert!(!outcome.is_allowed());
        assert_eq!(outcome.cue(), Cue::ActionDenied);
        assert!(outcome.reason().unwrap().contains("try quarantine instead"));
        assert_eq!(network, before);
        assert_eq!(state.usage(ToolId::Vaccinate), 0);
        assert_eq!(state.action_log().len(), 1);
    }

    #[test]
    fn test_sever_by_contact_pair() {
        let (config, mut state, mut network) = setup();
        let outcome = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::SeverLink,
            Target::Contact(PersonId(11), PersonId(10)),
        )
        .unwrap();

        let id = network.connection_between(PersonId(10), PersonId(11)).unwrap();
        assert_eq!(outcome.effect(), Some(&Effect::Severed(id)));
        assert!(network.connection(id).unwrap().severed);
        assert_eq!(state.stats().links_severed, 1);
        assert_eq!(state.once_per_person_records(), 0);
    }

    #[test]
    fn test_malformed_requests_are_errors() {
        let (config, mut state, mut network) = setup();
        let out_of_range = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::Quarantine,
            Target::Person(PersonId(600)),
        );
        assert!(matches!(out_of_range, Err(OutbreakError::PersonOutOfRange { .. })));

        let wrong_kind = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::Vaccinate,
            Target::Connection(ConnectionId(0)),
        );
        assert!(matches!(wrong_kind, Err(OutbreakError::InvalidTarget { .. })));

        let missing_edge = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::SeverLink,
            Target::Contact(PersonId(0), PersonId(30)),
        );
        assert!(matches!(missing_edge, Err(OutbreakError::NoSuchConnection(_, _))));
        assert!(state.action_log().is_empty());
    }

    #[test]
    fn test_informational_tools() {
        let (config, mut state, mut network) = setup();
        network.person_mut(PersonId(20)).unwrap().health = HealthState::Infected;
        network.person_mut(PersonId(21)).unwrap().removed = true;

        let test = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::Test,
            Target::Person(PersonId(20)),
        )
        .unwrap();
        assert_eq!(
            test.effect(),
            Some(&Effect::Tested {
                person: PersonId(20),
                positive: true
            })
        );

        let trace = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::ContactTrace,
            Target::Person(PersonId(20)),
        )
        .unwrap();
        assert_eq!(
            trace.effect(),
            Some(&Effect::Traced {
                person: PersonId(20),
                contacts: vec![(PersonId(19), HealthState::Susceptible)]
            })
        );
        assert_eq!(network.person(PersonId(20)).unwrap().health, HealthState::Infected);
        assert_eq!(state.stats().tests_run, 1);
        assert_eq!(state.stats().traces_run, 1);

        // Contact trace is once per person
        let again = InterventionEngine::apply(
            &mut network,
            &mut state,
            &config,
            ToolId::ContactTrace,
            Target::Person(PersonId(20)),
        )
        .unwrap();
        assert!(matches!(again, ToolOutcome::Denied(Denial::AlreadyUsedOn { .. })));
    }
}
