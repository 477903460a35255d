//! End-of-game scoring
//!
//! Computed once from the final network and game state. Pure: the same
//! snapshot always yields the same report.

use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{HealthState, ToolId};
use crate::network::graph::Network;
use crate::session::state::GameState;

/// Weights of the normalized score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Multiplier for the share of the population never infected (percent)
    pub prevention_weight: f64,
    /// Multiplier for the share of the population vaccinated (percent)
    pub coverage_weight: f64,
    /// Points deducted when the whole resource budget is spent
    pub resource_penalty_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            prevention_weight: 2.0,
            coverage_weight: 1.0,
            resource_penalty_weight: 50.0,
        }
    }
}

/// Detailed score report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub headline: String,
    pub scenario: String,
    pub difficulty: String,
    pub final_day: u32,
    /// No infectious person left in the active population
    pub containment_success: bool,
    pub total_infected: u32,
    pub people_protected: u32,
    pub links_severed: u32,
    pub initial_population: u32,
    pub active_population: u32,
    pub network_reduction_pct: u32,
    pub prevention_rate: f64,
    pub vaccination_coverage: f64,
    pub resources_used: u32,
    pub total_initial_resources: u32,
    pub resource_usage_penalty: f64,
    pub score: u32,
}

impl ScoreReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({} on {})\nDay {}: {} infected in total, {} protected, {} links severed\nNetwork reduced by {}%, score {}",
            self.headline,
            self.scenario,
            self.difficulty,
            self.final_day,
            self.total_infected,
            self.people_protected,
            self.links_severed,
            self.network_reduction_pct,
            self.score,
        )
    }
}

/// Active people still carrying the infection (infected or incubating)
pub fn active_carriers(network: &Network) -> usize {
    network.count_active(HealthState::Infected) + network.count_active(HealthState::Exposed)
}

/// Calculate the report for a finished (or abandoned) game
pub fn compute(
    network: &Network,
    state: &GameState,
    config: &GameConfig,
    weights: &ScoreWeights,
) -> Result<ScoreReport> {
    let stats = state.stats();
    let population = stats.initial_population.max(1) as f64;
    let active_population = network.active_population() as u32;
    let containment_success = active_carriers(network) == 0;

    let network_reduction_pct = ((stats.initial_population.saturating_sub(active_population)) as f64
        / population
        * 100.0)
        .round() as u32;

    let prevention_rate =
        (stats.initial_population.saturating_sub(stats.total_infected)) as f64 / population * 100.0;
    let vaccination_coverage = stats.total_vaccinated as f64 / population * 100.0;

    let resources_used = stats.total_vaccinated + stats.total_quarantined + stats.links_severed;
    let total_initial_resources = resource_budget(config, state)?;
    let resource_usage_penalty = if total_initial_resources > 0 {
        resources_used as f64 / total_initial_resources as f64 * weights.resource_penalty_weight
    } else {
        0.0
    };

    let raw = prevention_rate * weights.prevention_weight
        + vaccination_coverage * weights.coverage_weight
        - resource_usage_penalty;
    let score = raw.round().max(0.0) as u32;

    let headline = if containment_success {
        "Outbreak Contained!"
    } else {
        "Time's Up!"
    };

    Ok(ScoreReport {
        headline: headline.to_string(),
        scenario: state.scenario.name.clone(),
        difficulty: state.difficulty.name.clone(),
        final_day: state.day(),
        containment_success,
        total_infected: stats.total_infected,
        people_protected: stats.total_protected,
        links_severed: stats.links_severed,
        initial_population: stats.initial_population,
        active_population,
        network_reduction_pct,
        prevention_rate,
        vaccination_coverage,
        resources_used,
        total_initial_resources,
        resource_usage_penalty,
        score,
    })
}

/// Uses the control tools could have had over the whole scenario
///
/// Sum over vaccinate, quarantine and sever link of
/// `daily_limit x days the tool is available`.
pub fn resource_budget(config: &GameConfig, state: &GameState) -> Result<u32> {
    let duration = state.scenario.duration;
    let mut total = 0;
    for tool in ToolId::CONTROL {
        let tool_config = config.tool(tool)?;
        let days = (duration + 1).saturating_sub(tool_config.available_day);
        total += tool_config.daily_limit(&state.difficulty) * days;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PersonId;

    fn setup() -> (GameConfig, GameState, Network) {
        let config = GameConfig::default();
        let state = GameState::new(
            config.scenario("urban").unwrap().clone(),
            config.difficulty("medium").unwrap().clone(),
            100,
        );
        let network = Network::from_edges(100, &[]).unwrap();
        (config, state, network)
    }

    #[test]
    fn test_resource_budget_urban_medium() {
        let (config, state, _) = setup();
        // 14 days: vaccinate 5 x 13, quarantine 3 x 12, sever 3 x 14
        assert_eq!(resource_budget(&config, &state).unwrap(), 65 + 36 + 42);
    }

    #[test]
    fn test_untouched_clean_game_scores_double_prevention() {
        let (config, state, network) = setup();
        let report = compute(&network, &state, &config, &ScoreWeights::default()).unwrap();
        assert!(report.containment_success);
        assert_eq!(report.headline, "Outbreak Contained!");
        assert_eq!(report.network_reduction_pct, 0);
        assert_eq!(report.score, 200);
    }

    #[test]
    fn test_score_formula() {
        let (config, mut state, mut network) = setup();
        state.stats.total_infected = 20;
        state.stats.total_vaccinated = 10;
        state.stats.total_quarantined = 3;
        state.stats.links_severed = 2;
        state.stats.total_protected = 13;
        for i in 0..13 {
            network.person_mut(PersonId(i)).unwrap().removed = true;
        }
        network.person_mut(PersonId(50)).unwrap().health = HealthState::Infected;

        let report = compute(&network, &state, &config, &ScoreWeights::default()).unwrap();
        assert!(!report.containment_success);
        assert_eq!(report.headline, "Time's Up!");
        assert_eq!(report.network_reduction_pct, 13);
        assert_eq!(report.resources_used, 15);
        // 80 x 2 + 10 - 15 / 143 x 50 = 164.755...
        assert_eq!(report.score, 165);
    }

    #[test]
    fn test_score_never_negative() {
        let (config, mut state, network) = setup();
        state.stats.total_infected = 100;
        state.stats.links_severed = 1000;
        let report = compute(&network, &state, &config, &ScoreWeights::default()).unwrap();
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_report_json_and_summary() {
        let (config, state, network) = setup();
        let report = compute(&network, &state, &config, &ScoreWeights::default()).unwrap();
        let json = report.to_json();
        assert!(json.contains("\"containment_success\": true"));
        assert!(report.summary().contains("Urban Neighborhood Outbreak"));
    }
}
