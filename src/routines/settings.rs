//! Run configuration, loaded from a TOML file with environment-variable
//! overrides.

use config::Config as eConfig;
use serde::Deserialize;

use crate::dynamics::{InteractionMatrix, RateParameters, State, N_POPULATIONS};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub scenario: Scenario,
    pub schedule: ScheduleConfig,
    pub optimizer: OptimizerConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub log_file: Option<String>,
}

/// The biological scenario: baseline rates, interaction matrix and initial
/// populations. These are configuration data, not engineering.
#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    pub growth: [f64; N_POPULATIONS],
    pub decay: [f64; N_POPULATIONS],
    pub matrix_no_drug: [[f64; N_POPULATIONS]; N_POPULATIONS],
    pub initial_state: [f64; N_POPULATIONS],
}

impl Scenario {
    pub fn rate_parameters(&self) -> RateParameters {
        RateParameters::new(self.growth, self.decay)
    }

    pub fn interaction_matrix(&self) -> InteractionMatrix {
        InteractionMatrix::new(self.matrix_no_drug)
    }

    pub fn state(&self) -> State {
        State::from_column_slice(&self.initial_state)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_n_rounds")]
    pub n_rounds: usize,
    #[serde(default = "default_samples")]
    pub samples_per_regime: usize,
    /// Warm-up span run under the baseline treatment before the schedule
    /// begins; omitted means no settling segment.
    pub settling_duration: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OptimizerConfig {
    #[serde(default = "default_max_iters")]
    pub max_iters: u64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Reads settings from a TOML file, with `ATCORE_`-prefixed environment
/// variables layered on top.
pub fn read(path: &str) -> Result<Settings, config::ConfigError> {
    let parsed = eConfig::builder()
        .add_source(config::File::with_name(path).format(config::FileFormat::Toml))
        .add_source(config::Environment::with_prefix("ATCORE").separator("_"))
        .build()?;
    parsed.try_deserialize()
}

// *********************************
// Default values for deserializing
// *********************************
fn default_log_level() -> String {
    "info".to_string()
}

fn default_n_rounds() -> usize {
    10
}

fn default_samples() -> usize {
    100
}

fn default_max_iters() -> u64 {
    500
}

fn default_seed() -> u64 {
    347
}
