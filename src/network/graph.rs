//! Population graph: people, connections and adjacency lookup
//!
//! Connections are stored as normalized id pairs (`source < target`) from
//! construction onward. Live people are resolved through [`Network::person`]
//! rather than stored on the edge.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::error::{OutbreakError, Result};
use crate::core::types::{ConnectionId, HealthState, PersonId};

/// A node of the contact network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub health: HealthState,
    /// Days spent in the current Exposed/Infected state
    pub days_since_infection: u32,
    /// Permanently excluded from traversal and transmission
    pub removed: bool,
}

impl Person {
    pub fn new(id: PersonId) -> Self {
        Self {
            id,
            health: HealthState::Susceptible,
            days_since_infection: 0,
            removed: false,
        }
    }

    /// Still part of the live population
    pub fn is_active(&self) -> bool {
        !self.removed
    }

    pub fn is_quarantined(&self) -> bool {
        self.health == HealthState::Quarantined
    }

    /// Move into the given infection state with a fresh day counter
    pub fn infect(&mut self, state: HealthState, days: u32) {
        self.health = state;
        self.days_since_infection = days;
    }
}

/// An undirected contact between two people
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub source: PersonId,
    pub target: PersonId,
    /// One-way: once severed, never restored
    pub severed: bool,
}

impl Connection {
    pub fn new(a: PersonId, b: PersonId) -> Self {
        let (source, target) = normalize(a, b);
        Self {
            source,
            target,
            severed: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.severed
    }

    /// The endpoint opposite `id`, if `id` is an endpoint
    pub fn other(&self, id: PersonId) -> Option<PersonId> {
        if self.source == id {
            Some(self.target)
        } else if self.target == id {
            Some(self.source)
        } else {
            None
        }
    }
}

fn normalize(a: PersonId, b: PersonId) -> (PersonId, PersonId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The contact network owned by a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    people: Vec<Person>,
    connections: Vec<Connection>,
    #[serde(skip)]
    adjacency: Vec<Vec<ConnectionId>>,
    #[serde(skip)]
    pair_index: AHashMap<(PersonId, PersonId), ConnectionId>,
}

impl Network {
    /// Build a network of `population` susceptible people from an edge list
    ///
    /// Rejects self-loops, duplicate edges and out-of-range endpoints.
    pub fn from_edges(population: u32, edges: &[(u32, u32)]) -> Result<Self> {
        let people: Vec<Person> = (0..population).map(|i| Person::new(PersonId(i))).collect();
        let mut connections = Vec::with_capacity(edges.len());
        let mut adjacency = vec![Vec::new(); people.len()];
        let mut pair_index = AHashMap::with_capacity(edges.len());

        for &(a, b) in edges {
            if a >= population || b >= population {
                return Err(OutbreakError::InvalidConfig(format!(
                    "edge ({}, {}) outside population {}",
                    a, b, population
                )));
            }
            if a == b {
                return Err(OutbreakError::InvalidConfig(format!("self-loop on person {}", a)));
            }

            let connection = Connection::new(PersonId(a), PersonId(b));
            let id = ConnectionId(connections.len() as u32);
            let key = (connection.source, connection.target);
            if pair_index.insert(key, id).is_some() {
                return Err(OutbreakError::InvalidConfig(format!(
                    "duplicate edge ({}, {})",
                    key.0, key.1
                )));
            }

            adjacency[connection.source.index()].push(id);
            adjacency[connection.target.index()].push(id);
            connections.push(connection);
        }

        Ok(Self {
            people,
            connections,
            adjacency,
            pair_index,
        })
    }

    /// Total number of people, removed or not
    pub fn population(&self) -> usize {
        self.people.len()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.people.get(id.index()).ok_or(OutbreakError::PersonOutOfRange {
            id,
            population: self.people.len(),
        })
    }

    pub fn person_mut(&mut self, id: PersonId) -> Result<&mut Person> {
        let population = self.people.len();
        self.people
            .get_mut(id.index())
            .ok_or(OutbreakError::PersonOutOfRange { id, population })
    }

    pub fn connection(&self, id: ConnectionId) -> Result<&Connection> {
        self.connections
            .get(id.index())
            .ok_or(OutbreakError::ConnectionOutOfRange {
                id,
                count: self.connections.len(),
            })
    }

    /// Look up the connection joining two people
    pub fn connection_between(&self, a: PersonId, b: PersonId) -> Option<ConnectionId> {
        self.pair_index.get(&normalize(a, b)).copied()
    }

    /// Mark a connection severed; returns false if it already was
    pub fn sever(&mut self, id: ConnectionId) -> Result<bool> {
        let count = self.connections.len();
        let connection = self
            .connections
            .get_mut(id.index())
            .ok_or(OutbreakError::ConnectionOutOfRange { id, count })?;
        if connection.severed {
            return Ok(false);
        }
        connection.severed = true;
        Ok(true)
    }

    /// All neighbors of a person with the connecting edge, severed or not
    pub fn neighbors(&self, id: PersonId) -> impl Iterator<Item = (ConnectionId, PersonId)> + '_ {
        self.adjacency
            .get(id.index())
            .into_iter()
            .flatten()
            .filter_map(move |&cid| {
                self.connections[cid.index()]
                    .other(id)
                    .map(|other| (cid, other))
            })
    }

    /// Neighbors reachable through non-severed edges who are still active
    pub fn active_contacts(&self, id: PersonId) -> Vec<PersonId> {
        self.neighbors(id)
            .filter(|(cid, other)| {
                self.connections[cid.index()].is_active() && self.people[other.index()].is_active()
            })
            .map(|(_, other)| other)
            .collect()
    }

    pub fn degree(&self, id: PersonId) -> usize {
        self.adjacency.get(id.index()).map_or(0, Vec::len)
    }

    /// Degree of every person, in id order
    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.iter().map(Vec::len).collect()
    }

    /// Number of non-severed connections
    pub fn active_edge_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_active()).count()
    }

    /// People not removed from the network
    pub fn active_population(&self) -> usize {
        self.people.iter().filter(|p| p.is_active()).count()
    }

    /// Active people currently in `state`
    pub fn count_active(&self, state: HealthState) -> usize {
        self.people
            .iter()
            .filter(|p| p.is_active() && p.health == state)
            .count()
    }

    /// Count of people in `state`, removed or not
    pub fn count(&self, state: HealthState) -> usize {
        self.people.iter().filter(|p| p.health == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_plus_tail() -> Network {
        // 0-1, 1-2, 0-2 triangle with 2-3 tail
        Network::from_edges(4, &[(0, 1), (1, 2), (2, 0), (3, 2)]).unwrap()
    }

    #[test]
    fn test_connections_are_normalized() {
        let network = triangle_plus_tail();
        let c = network.connection(ConnectionId(2)).unwrap();
        assert_eq!((c.source, c.target), (PersonId(0), PersonId(2)));
        assert_eq!(
            network.connection_between(PersonId(3), PersonId(2)),
            Some(ConnectionId(3))
        );
        assert_eq!(
            network.connection_between(PersonId(2), PersonId(3)),
            Some(ConnectionId(3))
        );
        assert_eq!(network.connection_between(PersonId(0), PersonId(3)), None);
    }

    #[test]
    fn test_rejects_invalid_edges() {
        assert!(Network::from_edges(3, &[(0, 0)]).is_err());
        assert!(Network::from_edges(3, &[(0, 1), (1, 0)]).is_err());
        assert!(Network::from_edges(3, &[(0, 3)]).is_err());
    }

    #[test]
    fn test_out_of_range_lookup_fails() {
        let network = triangle_plus_tail();
        assert!(matches!(
            network.person(PersonId(4)),
            Err(OutbreakError::PersonOutOfRange { population: 4, .. })
        ));
        assert!(network.connection(ConnectionId(9)).is_err());
    }

    #[test]
    fn test_sever_is_one_way() {
        let mut network = triangle_plus_tail();
        assert_eq!(network.active_edge_count(), 4);
        assert!(network.sever(ConnectionId(0)).unwrap());
        assert!(!network.sever(ConnectionId(0)).unwrap());
        assert_eq!(network.active_edge_count(), 3);
        assert!(network.connection(ConnectionId(0)).unwrap().severed);
    }

    #[test]
    fn test_active_contacts_skip_severed_and_removed() {
        let mut network = triangle_plus_tail();
        let mut contacts = network.active_contacts(PersonId(2));
        contacts.sort();
        assert_eq!(contacts, vec![PersonId(0), PersonId(1), PersonId(3)]);

        network.sever(ConnectionId(1)).unwrap(); // 1-2
        network.person_mut(PersonId(3)).unwrap().removed = true;
        assert_eq!(network.active_contacts(PersonId(2)), vec![PersonId(0)]);
        assert_eq!(network.active_population(), 3);
    }

    #[test]
    fn test_degrees() {
        let network = triangle_plus_tail();
        assert_eq!(network.degrees(), vec![2, 2, 3, 1]);
        assert_eq!(network.degree(PersonId(2)), 3);
    }
}
