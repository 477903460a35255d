//! Daily disease progression over the live contact graph
//!
//! One call to [`advance_day`] runs, in order:
//! progression (day counters, incubation) -> transmission -> recovery
//!
//! Removed people (vaccinated or quarantined) are skipped by every step, and
//! severed connections never carry transmission.

use rand::Rng;
use serde::Serialize;

use crate::core::config::{DifficultyConfig, EngineConfig, ScenarioConfig};
use crate::core::types::{Day, HealthState, PersonId};
use crate::network::graph::Network;

/// Disease parameters resolved from scenario, difficulty and engine config
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseParams {
    pub base_rate: f64,
    pub difficulty_multiplier: f64,
    pub early_outbreak_days: Day,
    pub early_outbreak_multiplier: f64,
    pub recovery_time: u32,
    /// 0 = no Exposed state
    pub incubation_days: u32,
}

impl DiseaseParams {
    pub fn resolve(
        engine: &EngineConfig,
        scenario: &ScenarioConfig,
        difficulty: &DifficultyConfig,
    ) -> Self {
        Self {
            base_rate: scenario.base_transmission_rate,
            difficulty_multiplier: difficulty.transmission_multiplier,
            early_outbreak_days: engine.early_outbreak_days,
            early_outbreak_multiplier: engine.early_outbreak_multiplier,
            recovery_time: difficulty.recovery_time,
            incubation_days: engine.incubation_days,
        }
    }

    /// Per-contact infection probability on `day`
    pub fn transmission_probability(&self, day: Day) -> f64 {
        let early = if day <= self.early_outbreak_days {
            self.early_outbreak_multiplier
        } else {
            1.0
        };
        self.base_rate * self.difficulty_multiplier * early
    }

    /// State a newly infected person enters
    pub fn infection_state(&self) -> HealthState {
        if self.incubation_days > 0 {
            HealthState::Exposed
        } else {
            HealthState::Infected
        }
    }
}

/// A single successful transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Infection {
    pub person: PersonId,
    pub source: PersonId,
}

/// What changed during one day of disease progression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpreadReport {
    pub infections: Vec<Infection>,
    pub recoveries: Vec<PersonId>,
    /// Exposed people who became infectious
    pub onsets: Vec<PersonId>,
}

/// Advance every person's disease state by one day
///
/// `day` is the day being entered; it selects the early-outbreak multiplier.
pub fn advance_day<R: Rng + ?Sized>(
    network: &mut Network,
    params: &DiseaseParams,
    day: Day,
    rng: &mut R,
) -> SpreadReport {
    let mut report = SpreadReport {
        onsets: progress_infections(network, params),
        ..Default::default()
    };

    report.infections = transmit(network, params, day, rng);
    report.recoveries = recover(network, params);

    tracing::debug!(
        "Day {}: {} new infections, {} recoveries, {} onsets",
        day,
        report.infections.len(),
        report.recoveries.len(),
        report.onsets.len()
    );

    report
}

/// Increment day counters and promote Exposed whose incubation elapsed
fn progress_infections(network: &mut Network, params: &DiseaseParams) -> Vec<PersonId> {
    let mut onsets = Vec::new();
    for i in 0..network.population() {
        let id = PersonId(i as u32);
        let Ok(person) = network.person_mut(id) else {
            continue;
        };
        if !person.is_active() || !person.health.carries_infection() {
            continue;
        }

        person.days_since_infection += 1;
        if person.health == HealthState::Exposed
            && person.days_since_infection >= params.incubation_days
        {
            person.infect(HealthState::Infected, 0);
            onsets.push(id);
        }
    }
    onsets
}

/// One Bernoulli trial per (infectious, susceptible) active contact pair
fn transmit<R: Rng + ?Sized>(
    network: &mut Network,
    params: &DiseaseParams,
    day: Day,
    rng: &mut R,
) -> Vec<Infection> {
    let probability = params.transmission_probability(day);
    let new_state = params.infection_state();

    // Snapshot: people infected today do not transmit until tomorrow
    let infectious: Vec<PersonId> = network
        .people()
        .iter()
        .filter(|p| p.is_active() && p.health == HealthState::Infected)
        .map(|p| p.id)
        .collect();

    let mut infections = Vec::new();
    for source in infectious {
        let contacts: Vec<PersonId> = network
            .neighbors(source)
            .filter(|(cid, _)| {
                network
                    .connection(*cid)
                    .map(|c| c.is_active())
                    .unwrap_or(false)
            })
            .map(|(_, other)| other)
            .collect();

        for contact in contacts {
            let Ok(person) = network.person_mut(contact) else {
                continue;
            };
            // Also skips anyone already infected earlier today
            if !person.is_active() || person.health != HealthState::Susceptible {
                continue;
            }
            if rng.gen::<f64>() < probability {
                person.infect(new_state, 0);
                infections.push(Infection {
                    person: contact,
                    source,
                });
            }
        }
    }
    infections
}

fn recover(network: &mut Network, params: &DiseaseParams) -> Vec<PersonId> {
    let mut recoveries = Vec::new();
    for i in 0..network.population() {
        let id = PersonId(i as u32);
        let Ok(person) = network.person_mut(id) else {
            continue;
        };
        if person.is_active()
            && person.health == HealthState::Infected
            && person.days_since_infection >= params.recovery_time
        {
            person.health = HealthState::Recovered;
            recoveries.push(id);
        }
    }
    recoveries
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(rate: f64) -> DiseaseParams {
        DiseaseParams {
            base_rate: rate,
            difficulty_multiplier: 1.0,
            early_outbreak_days: 3,
            early_outbreak_multiplier: 1.5,
            recovery_time: 7,
            incubation_days: 0,
        }
    }

    fn star() -> Network {
        // Person 0 at the hub of four contacts
        Network::from_edges(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap()
    }

    #[test]
    fn test_transmission_probability_early_boost() {
        let p = params(0.2);
        assert!((p.transmission_probability(1) - 0.3).abs() < 1e-12);
        assert!((p.transmission_probability(3) - 0.3).abs() < 1e-12);
        assert!((p.transmission_probability(4) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_certain_transmission_reaches_all_active_contacts() {
        let mut network = star();
        network.person_mut(PersonId(0)).unwrap().infect(HealthState::Infected, 1);
        network.person_mut(PersonId(4)).unwrap().removed = true;
        let c = network.connection_between(PersonId(0), PersonId(3)).unwrap();
        network.sever(c).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = advance_day(&mut network, &params(1.0), 5, &mut rng);

        let mut infected: Vec<PersonId> = report.infections.iter().map(|i| i.person).collect();
        infected.sort();
        assert_eq!(infected, vec![PersonId(1), PersonId(2)]);
        assert!(report.infections.iter().all(|i| i.source == PersonId(0)));
        assert_eq!(network.person(PersonId(3)).unwrap().health, HealthState::Susceptible);
        assert_eq!(network.person(PersonId(4)).unwrap().health, HealthState::Susceptible);
        // Newly infected start at zero, the source advanced by one
        assert_eq!(network.person(PersonId(1)).unwrap().days_since_infection, 0);
        assert_eq!(network.person(PersonId(0)).unwrap().days_since_infection, 2);
    }

    #[test]
    fn test_infected_at_most_once_per_day() {
        // Person 2 has two infected neighbors
        let mut network = Network::from_edges(3, &[(0, 2), (1, 2)]).unwrap();
        network.person_mut(PersonId(0)).unwrap().infect(HealthState::Infected, 1);
        network.person_mut(PersonId(1)).unwrap().infect(HealthState::Infected, 1);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let report = advance_day(&mut network, &params(1.0), 5, &mut rng);
        assert_eq!(report.infections.len(), 1);
        assert_eq!(report.infections[0].source, PersonId(0));
    }

    #[test]
    fn test_new_infections_do_not_transmit_same_day() {
        // Chain 0-1-2: only 1 can be infected today
        let mut network = Network::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        network.person_mut(PersonId(0)).unwrap().infect(HealthState::Infected, 1);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let report = advance_day(&mut network, &params(1.0), 5, &mut rng);
        assert_eq!(report.infections.len(), 1);
        assert_eq!(network.person(PersonId(2)).unwrap().health, HealthState::Susceptible);
    }

    #[test]
    fn test_recovery_after_recovery_time() {
        let mut network = Network::from_edges(2, &[]).unwrap();
        network.person_mut(PersonId(0)).unwrap().infect(HealthState::Infected, 1);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for day in 2..7 {
            let report = advance_day(&mut network, &params(0.0), day, &mut rng);
            assert!(report.recoveries.is_empty(), "recovered early on day {}", day);
        }
        let report = advance_day(&mut network, &params(0.0), 7, &mut rng);
        assert_eq!(report.recoveries, vec![PersonId(0)]);
        assert_eq!(network.person(PersonId(0)).unwrap().health, HealthState::Recovered);
    }

    #[test]
    fn test_removed_people_are_frozen() {
        let mut network = Network::from_edges(2, &[(0, 1)]).unwrap();
        let person = network.person_mut(PersonId(0)).unwrap();
        person.infect(HealthState::Infected, 3);
        person.removed = true;

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let report = advance_day(&mut network, &params(1.0), 5, &mut rng);
        assert!(report.infections.is_empty());
        assert_eq!(network.person(PersonId(0)).unwrap().days_since_infection, 3);
    }

    #[test]
    fn test_incubation_produces_exposed_then_onset() {
        let mut p = params(1.0);
        p.incubation_days = 2;
        let mut network = Network::from_edges(2, &[(0, 1)]).unwrap();
        network.person_mut(PersonId(0)).unwrap().infect(HealthState::Infected, 1);

        let mut rng = ChaCha8Rng::seed_from_u64(6);
        advance_day(&mut network, &p, 5, &mut rng);
        assert_eq!(network.person(PersonId(1)).unwrap().health, HealthState::Exposed);

        let report = advance_day(&mut network, &p, 6, &mut rng);
        assert!(report.onsets.is_empty());
        let report = advance_day(&mut network, &p, 7, &mut rng);
        assert_eq!(report.onsets, vec![PersonId(1)]);
        assert_eq!(network.person(PersonId(1)).unwrap().health, HealthState::Infected);
    }
}
