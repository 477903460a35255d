//! Session controller - owns one game and exposes the engine operations
//!
//! A day advances in this order:
//! next day (quotas refill) -> disease progression -> logging -> termination check
//!
//! Interventions happen between days through [`SessionController::apply_tool`].

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::{EngineConfig, GameConfig};
use crate::core::error::{OutbreakError, Result};
use crate::core::types::{Day, HealthState, PersonId, ToolId};
use crate::interventions::{self, InterventionEngine, Target, ToolOutcome, ToolStatus};
use crate::network::{self, Network};
use crate::scoring::{self, ScoreReport, ScoreWeights};
use crate::session::state::GameState;
use crate::simulation::events::Cue;
use crate::simulation::spread::{self, DiseaseParams};

/// Summary of one advanced day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub day: Day,
    pub new_infections: usize,
    pub new_recoveries: usize,
    /// Exposed people who became infectious (0 without incubation)
    pub new_onsets: usize,
    pub active_infected: usize,
    pub game_over: bool,
}

/// One game: network, state and random source, exclusively owned
#[derive(Debug)]
pub struct SessionController<R = ChaCha8Rng> {
    config: GameConfig,
    scenario_id: String,
    difficulty_id: String,
    network: Network,
    state: GameState,
    disease: DiseaseParams,
    rng: R,
    cues: Vec<Cue>,
}

impl SessionController<ChaCha8Rng> {
    /// Start a game driven by a seeded ChaCha8 generator
    pub fn new_seeded(config: GameConfig, scenario_id: &str, difficulty_id: &str, seed: u64) -> Result<Self> {
        Self::start_game(config, scenario_id, difficulty_id, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> SessionController<R> {
    /// Generate the network, seed the initial infections and open day 1
    pub fn start_game(config: GameConfig, scenario_id: &str, difficulty_id: &str, mut rng: R) -> Result<Self> {
        config.validate()?;
        let (network, state, disease) = build_game(&config, scenario_id, difficulty_id, &mut rng)?;

        tracing::info!(
            "Started '{}' on {}: {} people, {} connections, {} infected",
            state.scenario.name,
            state.difficulty.name,
            network.population(),
            network.connections().len(),
            state.stats().total_infected
        );

        Ok(Self {
            config,
            scenario_id: scenario_id.to_string(),
            difficulty_id: difficulty_id.to_string(),
            network,
            state,
            disease,
            rng,
            cues: Vec::new(),
        })
    }

    /// Start over with the same scenario and difficulty
    ///
    /// The random source carries on, so the new game differs from the last.
    pub fn restart(&mut self) -> Result<()> {
        let (network, state, disease) =
            build_game(&self.config, &self.scenario_id, &self.difficulty_id, &mut self.rng)?;
        self.network = network;
        self.state = state;
        self.disease = disease;
        self.cues.clear();
        tracing::info!("Restarted '{}'", self.state.scenario.name);
        Ok(())
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn disease(&self) -> &DiseaseParams {
        &self.disease
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Active people still carrying the infection
    pub fn active_infected(&self) -> usize {
        scoring::active_carriers(&self.network)
    }

    pub fn active_population(&self) -> usize {
        self.network.active_population()
    }

    /// Drain the host cues emitted since the last call
    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn tool_status(&self) -> Result<Vec<ToolStatus>> {
        interventions::tool_status(&self.config, &self.state)
    }

    /// Use a tool on a person or connection
    pub fn apply_tool(&mut self, tool: ToolId, target: Target) -> Result<ToolOutcome> {
        let outcome =
            InterventionEngine::apply(&mut self.network, &mut self.state, &self.config, tool, target)?;
        self.cues.push(outcome.cue());
        Ok(outcome)
    }

    /// Advance the simulation by one day
    pub fn advance_day(&mut self) -> Result<DayReport> {
        if self.state.is_game_over() {
            return Err(OutbreakError::GameOver(self.state.day()));
        }

        self.state.begin_next_day();
        self.cues.push(Cue::DayAdvance);
        let day = self.state.day();

        let report = spread::advance_day(&mut self.network, &self.disease, day, &mut self.rng);

        self.state.stats.total_infected += report.infections.len() as u32;
        for infection in &report.infections {
            self.state.log(
                format!("Person {} infected by person {}", infection.person, infection.source),
                false,
            );
        }
        if !report.infections.is_empty() {
            self.cues.push(Cue::InfectionSpread);
            self.state.log(
                format!("{} new infections reported today", report.infections.len()),
                true,
            );
        }

        for person in &report.onsets {
            self.state.log(format!("Person {} is now infectious", person), false);
        }

        for person in &report.recoveries {
            self.state.log(format!("Person {} recovered from infection", person), false);
        }
        if !report.recoveries.is_empty() {
            self.state.log(
                format!("{} individuals recovered today", report.recoveries.len()),
                true,
            );
        }

        let active_infected = self.active_infected();
        if active_infected == 0 || day >= self.state.scenario.duration {
            self.state.end_game();
            self.cues.push(Cue::GameOver);
            let message = if active_infected == 0 {
                "Outbreak contained - no active infections remain"
            } else {
                "Simulation period has ended"
            };
            self.state.log(message, true);
            tracing::info!("Game over on day {}: {} active infections", day, active_infected);
        } else {
            self.state.log(format!("Day {} begins", day), true);
        }

        tracing::info!(
            "Day {}: +{} infected, +{} recovered, {} active",
            day,
            report.infections.len(),
            report.recoveries.len(),
            active_infected
        );

        Ok(DayReport {
            day,
            new_infections: report.infections.len(),
            new_recoveries: report.recoveries.len(),
            new_onsets: report.onsets.len(),
            active_infected,
            game_over: self.state.is_game_over(),
        })
    }

    /// Score the current snapshot with the default weights
    pub fn compute_results(&self) -> Result<ScoreReport> {
        self.compute_results_with(&ScoreWeights::default())
    }

    pub fn compute_results_with(&self, weights: &ScoreWeights) -> Result<ScoreReport> {
        scoring::compute(&self.network, &self.state, &self.config, weights)
    }
}

fn build_game<R: Rng + ?Sized>(
    config: &GameConfig,
    scenario_id: &str,
    difficulty_id: &str,
    rng: &mut R,
) -> Result<(Network, GameState, DiseaseParams)> {
    let scenario = config.scenario(scenario_id)?.clone();
    let difficulty = config.difficulty(difficulty_id)?.clone();
    let engine = &config.engine;

    let mut network = network::generate(scenario.topology, engine.population_size, &engine.network, rng)?;
    let disease = DiseaseParams::resolve(engine, &scenario, &difficulty);
    let mut state = GameState::new(scenario, difficulty, engine.population_size);

    let seeded = seed_infections(&mut network, &mut state, engine, rng)?;
    state.log(
        format!(
            "{} individuals found infected - containment efforts begin immediately!",
            seeded
        ),
        true,
    );
    state.log("Simulation started - virus detected in population!", true);

    Ok((network, state, disease))
}

/// Number of people infected at game start
pub fn initial_infected_count(engine: &EngineConfig, scenario_count: u32, multiplier: f64) -> usize {
    let base = engine.min_initial_infected.max(scenario_count);
    let wanted = (base as f64 * multiplier).floor() as usize;
    let cap = engine
        .population_size
        .saturating_sub(engine.infection_headroom) as usize;
    wanted.min(cap)
}

fn seed_infections<R: Rng + ?Sized>(
    network: &mut Network,
    state: &mut GameState,
    engine: &EngineConfig,
    rng: &mut R,
) -> Result<usize> {
    let count = initial_infected_count(
        engine,
        state.scenario.initial_infected,
        state.difficulty.initial_infected_multiplier,
    );

    for index in rand::seq::index::sample(rng, network.population(), count).iter() {
        network
            .person_mut(PersonId(index as u32))?
            .infect(HealthState::Infected, 1);
        state.stats.total_infected += 1;
    }
    Ok(count)
}
