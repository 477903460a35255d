//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a person, equal to its index in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub u32);

impl PersonId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a connection, equal to its index in the edge list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Simulated day counter (starts at 1)
pub type Day = u32;

/// Epidemiological state of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Susceptible,
    Exposed,
    Infected,
    Quarantined,
    Vaccinated,
    Recovered,
}

impl HealthState {
    /// Infected or incubating
    pub fn carries_infection(&self) -> bool {
        matches!(self, Self::Exposed | Self::Infected)
    }

    /// Absorbing states only reachable through interventions
    pub fn is_intervention_state(&self) -> bool {
        matches!(self, Self::Quarantined | Self::Vaccinated)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Susceptible => "healthy",
            Self::Exposed => "exposed",
            Self::Infected => "infected",
            Self::Quarantined => "quarantined",
            Self::Vaccinated => "vaccinated",
            Self::Recovered => "recovered",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Graph-generation family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    ScaleFree,
    SmallWorld,
    Random,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScaleFree => f.write_str("scale-free"),
            Self::SmallWorld => f.write_str("small-world"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// Player intervention tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    Vaccinate,
    Quarantine,
    SeverLink,
    Test,
    ContactTrace,
}

impl ToolId {
    pub const ALL: [ToolId; 5] = [
        ToolId::Vaccinate,
        ToolId::Quarantine,
        ToolId::SeverLink,
        ToolId::Test,
        ToolId::ContactTrace,
    ];

    /// Tools whose uses count against the resource budget in scoring
    pub const CONTROL: [ToolId; 3] = [ToolId::Vaccinate, ToolId::Quarantine, ToolId::SeverLink];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Vaccinate => "Vaccinate",
            Self::Quarantine => "Quarantine",
            Self::SeverLink => "Sever Link",
            Self::Test => "Test",
            Self::ContactTrace => "Contact Trace",
        }
    }

    /// Whether the tool targets a connection rather than a person
    pub fn targets_connection(&self) -> bool {
        matches!(self, Self::SeverLink)
    }

    /// Informational tools have no epidemiological effect
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Test | Self::ContactTrace)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_id_index() {
        assert_eq!(PersonId::new(7).index(), 7);
        assert_eq!(PersonId(3).to_string(), "3");
    }

    #[test]
    fn test_health_state_predicates() {
        assert!(HealthState::Infected.carries_infection());
        assert!(HealthState::Exposed.carries_infection());
        assert!(!HealthState::Recovered.carries_infection());
        assert!(HealthState::Vaccinated.is_intervention_state());
        assert!(!HealthState::Susceptible.is_intervention_state());
    }

    #[test]
    fn test_topology_serde_names() {
        let json = serde_json::to_string(&Topology::ScaleFree).unwrap();
        assert_eq!(json, "\"scale-free\"");
        let parsed: Topology = serde_json::from_str("\"small-world\"").unwrap();
        assert_eq!(parsed, Topology::SmallWorld);
        assert!(serde_json::from_str::<Topology>("\"lattice\"").is_err());
    }

    #[test]
    fn test_tool_target_kinds() {
        assert!(ToolId::SeverLink.targets_connection());
        assert!(!ToolId::Vaccinate.targets_connection());
        assert!(ToolId::Test.is_informational());
        assert!(!ToolId::Quarantine.is_informational());
    }
}
