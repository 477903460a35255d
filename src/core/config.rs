//! Game configuration with documented constants
//!
//! Scenario, difficulty and tool tables are static data: the defaults below
//! mirror `data/scenarios.toml`, and any of them may be replaced by loading a
//! TOML file with the same shape.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{OutbreakError, Result};
use crate::core::types::{ToolId, Topology};

/// Engine constants shared by every scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === POPULATION ===
    /// Number of people in the generated network
    pub population_size: u32,

    /// Minimum number of initially infected people, whatever the scenario says
    pub min_initial_infected: u32,

    /// People that are never infected at game start
    ///
    /// Caps the initial infected count at `population_size - infection_headroom`
    /// so tiny test populations still have someone left to protect.
    pub infection_headroom: u32,

    // === TRANSMISSION ===
    /// Days (inclusive, counted from day 1) during which spread is boosted
    pub early_outbreak_days: u32,

    /// Transmission multiplier while `day <= early_outbreak_days`
    pub early_outbreak_multiplier: f64,

    /// Days spent Exposed before becoming Infected
    ///
    /// 0 disables the Exposed state: transmission infects directly.
    pub incubation_days: u32,

    // === INTERVENTIONS ===
    /// Active (non-severed) edge count that Sever Link must stay above
    pub min_connectivity: usize,

    // === NETWORK ===
    pub network: NetworkParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            min_initial_infected: 2,
            infection_headroom: 10,
            early_outbreak_days: 3,
            early_outbreak_multiplier: 1.5,
            incubation_days: 0,
            min_connectivity: 50,
            network: NetworkParams::default(),
        }
    }
}

impl EngineConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(OutbreakError::InvalidConfig(
                "population_size must be positive".into(),
            ));
        }
        if self.early_outbreak_multiplier < 0.0 {
            return Err(OutbreakError::InvalidConfig(format!(
                "early_outbreak_multiplier ({}) must not be negative",
                self.early_outbreak_multiplier
            )));
        }
        self.network.validate()
    }
}

/// Parameters of the three graph generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Edges added per new node in preferential attachment (m)
    ///
    /// The seed clique has m + 1 nodes so every later node finds m targets.
    pub attachment_count: u32,

    /// Ring-lattice neighbors per node in the small-world graph (k, even)
    pub lattice_neighbors: u32,

    /// Probability that a lattice edge is rewired
    pub rewire_probability: f64,

    /// Independent edge probability of the random graph
    pub edge_probability: f64,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            attachment_count: 4,
            lattice_neighbors: 8,
            rewire_probability: 0.15,
            edge_probability: 0.08,
        }
    }
}

impl NetworkParams {
    pub fn validate(&self) -> Result<()> {
        if self.attachment_count == 0 {
            return Err(OutbreakError::InvalidConfig(
                "attachment_count must be positive".into(),
            ));
        }
        if self.lattice_neighbors < 2 || self.lattice_neighbors % 2 != 0 {
            return Err(OutbreakError::InvalidConfig(format!(
                "lattice_neighbors ({}) must be an even number >= 2",
                self.lattice_neighbors
            )));
        }
        for (name, p) in [
            ("rewire_probability", self.rewire_probability),
            ("edge_probability", self.edge_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(OutbreakError::InvalidConfig(format!(
                    "{} ({}) must be within [0, 1]",
                    name, p
                )));
            }
        }
        Ok(())
    }
}

/// A playable outbreak scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Briefing text describing the player's role
    #[serde(default)]
    pub role: String,
    pub topology: Topology,
    /// Last day of the scenario; the game ends when it is reached
    pub duration: u32,
    pub initial_infected: u32,
    /// Per-contact per-day transmission probability before multipliers
    pub base_transmission_rate: f64,
}

/// Difficulty modifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub transmission_multiplier: f64,
    pub tool_limit_multiplier: f64,
    /// Days an infected person stays infectious
    pub recovery_time: u32,
    #[serde(default = "default_initial_infected_multiplier")]
    pub initial_infected_multiplier: f64,
}

fn default_initial_infected_multiplier() -> f64 {
    1.0
}

/// Intervention tool limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub id: ToolId,
    #[serde(default)]
    pub description: String,
    /// First day on which the tool may be used
    pub available_day: u32,
    /// Uses per day before the difficulty multiplier
    pub base_daily_limit: u32,
    /// Whether the tool may target a given person only once per session
    pub once_per_person: bool,
}

impl ToolConfig {
    /// Daily limit after applying the difficulty multiplier (floored)
    pub fn daily_limit(&self, difficulty: &DifficultyConfig) -> u32 {
        (self.base_daily_limit as f64 * difficulty.tool_limit_multiplier).floor() as u32
    }
}

/// Complete configuration: engine constants plus the static tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub scenarios: Vec<ScenarioConfig>,
    pub difficulties: Vec<DifficultyConfig>,
    #[serde(default = "default_tools")]
    pub tools: Vec<ToolConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            scenarios: default_scenarios(),
            difficulties: default_difficulties(),
            tools: default_tools(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn scenario(&self, id: &str) -> Result<&ScenarioConfig> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| OutbreakError::UnknownScenario(id.to_string()))
    }

    pub fn difficulty(&self, id: &str) -> Result<&DifficultyConfig> {
        self.difficulties
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| OutbreakError::UnknownDifficulty(id.to_string()))
    }

    pub fn tool(&self, id: ToolId) -> Result<&ToolConfig> {
        self.tools
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| OutbreakError::InvalidConfig(format!("no entry for tool {}", id)))
    }

    /// Validate every table
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;

        if self.scenarios.is_empty() {
            return Err(OutbreakError::InvalidConfig("no scenarios defined".into()));
        }
        if self.difficulties.is_empty() {
            return Err(OutbreakError::InvalidConfig("no difficulties defined".into()));
        }

        for scenario in &self.scenarios {
            if scenario.duration == 0 {
                return Err(OutbreakError::InvalidConfig(format!(
                    "scenario '{}' has zero duration",
                    scenario.id
                )));
            }
            if !(0.0..=1.0).contains(&scenario.base_transmission_rate) {
                return Err(OutbreakError::InvalidConfig(format!(
                    "scenario '{}' transmission rate {} is not a probability",
                    scenario.id, scenario.base_transmission_rate
                )));
            }
        }

        for difficulty in &self.difficulties {
            if difficulty.recovery_time == 0 {
                return Err(OutbreakError::InvalidConfig(format!(
                    "difficulty '{}' has zero recovery time",
                    difficulty.id
                )));
            }
            if difficulty.transmission_multiplier < 0.0
                || difficulty.tool_limit_multiplier < 0.0
                || difficulty.initial_infected_multiplier < 0.0
            {
                return Err(OutbreakError::InvalidConfig(format!(
                    "difficulty '{}' has a negative multiplier",
                    difficulty.id
                )));
            }
        }

        for tool in ToolId::ALL {
            let count = self.tools.iter().filter(|t| t.id == tool).count();
            if count != 1 {
                return Err(OutbreakError::InvalidConfig(format!(
                    "expected exactly one entry for tool {}, found {}",
                    tool, count
                )));
            }
        }

        Ok(())
    }
}

fn default_scenarios() -> Vec<ScenarioConfig> {
    vec![
        ScenarioConfig {
            id: "urban".into(),
            name: "Urban Neighborhood Outbreak".into(),
            description: "A highly transmissible respiratory virus is spreading through a tight-knit neighborhood with low vaccination rates.".into(),
            role: "Senior Epidemiologist at the Metro Health Department.".into(),
            topology: Topology::ScaleFree,
            duration: 14,
            initial_infected: 2,
            base_transmission_rate: 0.15,
        },
        ScenarioConfig {
            id: "school".into(),
            name: "School Reopening Crisis".into(),
            description: "Students fall ill with flu-like symptoms days after the school reopened from winter break.".into(),
            role: "Chief Health Consultant for the school district.".into(),
            topology: Topology::SmallWorld,
            duration: 21,
            initial_infected: 1,
            base_transmission_rate: 0.12,
        },
        ScenarioConfig {
            id: "festival".into(),
            name: "Music Festival Outbreak".into(),
            description: "Reports of a 'festival flu' surface among attendees of a weekend music festival.".into(),
            role: "County Health Director managing a potential superspreader event.".into(),
            topology: Topology::Random,
            duration: 10,
            initial_infected: 3,
            base_transmission_rate: 0.2,
        },
        ScenarioConfig {
            id: "care".into(),
            name: "Long-term Care Facility".into(),
            description: "Several nursing home residents report respiratory symptoms.".into(),
            role: "Regional Health Coordinator for long-term care facilities.".into(),
            topology: Topology::SmallWorld,
            duration: 18,
            initial_infected: 1,
            base_transmission_rate: 0.18,
        },
        ScenarioConfig {
            id: "global".into(),
            name: "International Airport Hub".into(),
            description: "Airports in the region report cases among international travelers.".into(),
            role: "State Epidemiologist coordinating with national and international partners.".into(),
            topology: Topology::ScaleFree,
            duration: 21,
            initial_infected: 2,
            base_transmission_rate: 0.14,
        },
    ]
}

fn default_difficulties() -> Vec<DifficultyConfig> {
    vec![
        DifficultyConfig {
            id: "easy".into(),
            name: "Easy".into(),
            description: "More resources, slower spread".into(),
            transmission_multiplier: 0.7,
            tool_limit_multiplier: 1.5,
            recovery_time: 5,
            initial_infected_multiplier: 0.8,
        },
        DifficultyConfig {
            id: "medium".into(),
            name: "Medium".into(),
            description: "Balanced gameplay".into(),
            transmission_multiplier: 1.0,
            tool_limit_multiplier: 1.0,
            recovery_time: 7,
            initial_infected_multiplier: 1.0,
        },
        DifficultyConfig {
            id: "hard".into(),
            name: "Hard".into(),
            description: "Limited resources, rapid spread".into(),
            transmission_multiplier: 1.4,
            tool_limit_multiplier: 0.7,
            recovery_time: 9,
            initial_infected_multiplier: 1.5,
        },
    ]
}

fn default_tools() -> Vec<ToolConfig> {
    vec![
        ToolConfig {
            id: ToolId::Vaccinate,
            description: "Protect a susceptible individual (cannot vaccinate the infected)".into(),
            available_day: 2,
            base_daily_limit: 5,
            once_per_person: true,
        },
        ToolConfig {
            id: ToolId::Quarantine,
            description: "Isolate any individual to prevent spread".into(),
            available_day: 3,
            base_daily_limit: 3,
            once_per_person: true,
        },
        ToolConfig {
            id: ToolId::SeverLink,
            description: "Break a connection between two people".into(),
            available_day: 1,
            base_daily_limit: 3,
            once_per_person: false,
        },
        ToolConfig {
            id: ToolId::Test,
            description: "Check whether a person is currently infected".into(),
            available_day: 1,
            base_daily_limit: 5,
            once_per_person: false,
        },
        ToolConfig {
            id: ToolId::ContactTrace,
            description: "List the active contacts of a person".into(),
            available_day: 2,
            base_daily_limit: 2,
            once_per_person: true,
        },
    ]
}
