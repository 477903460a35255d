//! Per-session game state: day counter, tool usage, stats and action log

use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::config::{DifficultyConfig, ScenarioConfig};
use crate::core::types::{Day, PersonId, ToolId};
use crate::simulation::events::ActionLog;

/// Aggregate counters shown to the player and used for scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Everyone ever infected, initial cases included
    pub total_infected: u32,
    /// Vaccinated plus quarantined
    pub total_protected: u32,
    pub total_vaccinated: u32,
    pub total_quarantined: u32,
    pub links_severed: u32,
    pub tests_run: u32,
    pub traces_run: u32,
    pub initial_population: u32,
}

/// Mutable state of one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    day: Day,
    pub scenario: ScenarioConfig,
    pub difficulty: DifficultyConfig,
    daily_usage: BTreeMap<ToolId, u32>,
    used_on_people: AHashSet<(ToolId, PersonId)>,
    pub(crate) action_log: ActionLog,
    pub(crate) stats: Stats,
    game_over: bool,
}

impl GameState {
    pub fn new(scenario: ScenarioConfig, difficulty: DifficultyConfig, population: u32) -> Self {
        Self {
            day: 1,
            scenario,
            difficulty,
            daily_usage: ToolId::ALL.iter().map(|&t| (t, 0)).collect(),
            used_on_people: AHashSet::new(),
            action_log: ActionLog::new(),
            stats: Stats {
                initial_population: population,
                ..Default::default()
            },
            game_over: false,
        }
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    /// Uses of `tool` so far today
    pub fn usage(&self, tool: ToolId) -> u32 {
        self.daily_usage.get(&tool).copied().unwrap_or(0)
    }

    pub fn has_used_on(&self, tool: ToolId, person: PersonId) -> bool {
        self.used_on_people.contains(&(tool, person))
    }

    /// Number of (tool, person) pairs recorded for once-per-person tools
    pub fn once_per_person_records(&self) -> usize {
        self.used_on_people.len()
    }

    pub fn log(&mut self, message: impl Into<String>, important: bool) {
        self.action_log.push(self.day, message, important);
    }

    /// Count a successful use; `person` is recorded for once-per-person tools
    pub(crate) fn record_use(&mut self, tool: ToolId, person: Option<PersonId>) {
        *self.daily_usage.entry(tool).or_insert(0) += 1;
        if let Some(person) = person {
            self.used_on_people.insert((tool, person));
        }
    }

    /// Move to the next day and refill every daily quota
    pub(crate) fn begin_next_day(&mut self) {
        self.day += 1;
        for used in self.daily_usage.values_mut() {
            *used = 0;
        }
    }

    pub(crate) fn end_game(&mut self) {
        self.game_over = true;
    }
}
