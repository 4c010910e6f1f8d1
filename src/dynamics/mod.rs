//! Replicator-style growth law for the four interacting cell populations.
//!
//! The populations are, in order: osteoclast analog, osteoblast analog,
//! drug-sensitive cancer, drug-resistant cancer. Each population grows with a
//! power-law term driven by every population's current size and shrinks with
//! a linear decay term. A scalar inhibitor, when present, acts linearly on
//! the drug-sensitive population only.

use serde::{Deserialize, Serialize};

pub type T = f64;
pub type State = ode_solvers::Vector4<T>;

/// Number of interacting populations.
pub const N_POPULATIONS: usize = 4;
/// Index of the drug-sensitive cancer population.
pub const SENSITIVE: usize = 2;
/// Index of the drug-resistant cancer population.
pub const RESISTANT: usize = 3;

/// Populations are floored to this value before exponentiation, so that a
/// transient numerical excursion below zero never produces a NaN (negative
/// base, fractional exponent) or an infinity (zero base, negative exponent).
pub const POPULATION_FLOOR: f64 = 1e-12;

/// Per-population growth and decay rates for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateParameters {
    pub growth: [f64; N_POPULATIONS],
    pub decay: [f64; N_POPULATIONS],
}

impl RateParameters {
    pub fn new(growth: [f64; N_POPULATIONS], decay: [f64; N_POPULATIONS]) -> Self {
        Self { growth, decay }
    }
}

/// 4x4 exponent matrix: entry (i, j) is the exponent with which population j
/// contributes, as a power-law factor, to population i's growth term.
///
/// Immutable after construction. Per-regime variations are built from a base
/// template with [`InteractionMatrix::with_override`], never by mutating a
/// shared instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionMatrix {
    entries: [[f64; N_POPULATIONS]; N_POPULATIONS],
}

impl InteractionMatrix {
    pub fn new(entries: [[f64; N_POPULATIONS]; N_POPULATIONS]) -> Self {
        Self { entries }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries[row][col]
    }

    /// Returns a fresh matrix with a single entry replaced.
    pub fn with_override(&self, row: usize, col: usize, value: f64) -> Self {
        let mut entries = self.entries;
        entries[row][col] = value;
        Self { entries }
    }

    /// Returns a fresh matrix with every `(row, col, value)` entry replaced.
    pub fn with_overrides(&self, overrides: &[(usize, usize, f64)]) -> Self {
        let mut entries = self.entries;
        for &(row, col, value) in overrides {
            entries[row][col] = value;
        }
        Self { entries }
    }
}

/// Instantaneous rate of change of all four populations.
///
/// For each population `i`:
///
/// `delta_i = growth_i * prod_j n_j^matrix[i][j] - decay_i * n_i`
///
/// with an additional `- n_i * inhibitor` term on the drug-sensitive
/// population. Pure function; called thousands of times per simulation.
pub fn rates(
    state: &State,
    params: &RateParameters,
    matrix: &InteractionMatrix,
    inhibitor: f64,
) -> State {
    let mut delta = State::zeros();
    for i in 0..N_POPULATIONS {
        let mut growth_term = params.growth[i];
        for j in 0..N_POPULATIONS {
            let base = state[j].max(POPULATION_FLOOR);
            growth_term *= base.powf(matrix.entries[i][j]);
        }
        let n_i = state[i].max(0.0);
        delta[i] = growth_term - params.decay[i] * n_i;
        if i == SENSITIVE {
            delta[i] -= n_i * inhibitor;
        }
    }
    delta
}
