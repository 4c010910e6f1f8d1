//! Reduction of a trajectory to a scalar fitness value.
//!
//! The metric is a time-average over the trailing window of the trajectory,
//! normally one full schedule cycle's worth of samples, so it reflects
//! steady-state behavior rather than transients. Both the plain and the
//! weighted metric are plain functions of an immutable trajectory, so a
//! caller can compute both from a single simulation run.

use crate::dynamics::{RESISTANT, SENSITIVE};
use crate::error::{Error, Result};
use crate::structs::trajectory::Trajectory;

/// Which burden metric the optimizer minimizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectiveKind {
    /// Mean of `sensitive + resistant` over the trailing window.
    TotalBurden,
    /// Mean of `sensitive + weight * resistant`, penalizing resistant burden
    /// more (or less) heavily.
    WeightedBurden { weight: f64 },
}

impl ObjectiveKind {
    pub fn evaluate(&self, trajectory: &Trajectory, window: usize) -> Result<f64> {
        match self {
            ObjectiveKind::TotalBurden => mean_cancer_burden(trajectory, window),
            ObjectiveKind::WeightedBurden { weight } => {
                weighted_cancer_burden(trajectory, window, *weight)
            }
        }
    }
}

/// Arithmetic mean of the total cancer population over the trailing `window`
/// samples.
pub fn mean_cancer_burden(trajectory: &Trajectory, window: usize) -> Result<f64> {
    weighted_cancer_burden(trajectory, window, 1.0)
}

/// Mean of `sensitive + weight * resistant` over the trailing `window`
/// samples.
pub fn weighted_cancer_burden(trajectory: &Trajectory, window: usize, weight: f64) -> Result<f64> {
    if window == 0 {
        return Err(Error::InvalidWindow {
            window,
            len: trajectory.len(),
        });
    }
    let samples = trajectory
        .trailing(window)
        .ok_or(Error::InvalidWindow {
            window,
            len: trajectory.len(),
        })?;
    let sum: f64 = samples
        .iter()
        .map(|s| s.state[SENSITIVE] + weight * s.state[RESISTANT])
        .sum();
    Ok(sum / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::State;

    fn constant_trajectory(n: usize, sensitive: f64, resistant: f64) -> Trajectory {
        let mut trajectory = Trajectory::new();
        for k in 0..n {
            trajectory.push(k as f64, State::new(1.0, 1.0, sensitive, resistant));
        }
        trajectory
    }

    #[test]
    fn constant_burden_is_returned_exactly() {
        let trajectory = constant_trajectory(20, 3.0, 4.0);
        assert_eq!(mean_cancer_burden(&trajectory, 10).unwrap(), 7.0);
    }

    #[test]
    fn weighted_split_burden() {
        // With sensitive = resistant = c/2 the weighted mean is c*(1 + w)/2.
        let c = 6.0;
        let w = 3.0;
        let trajectory = constant_trajectory(12, c / 2.0, c / 2.0);
        let value = weighted_cancer_burden(&trajectory, 12, w).unwrap();
        assert_eq!(value, c * (1.0 + w) / 2.0);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let trajectory = constant_trajectory(5, 1.0, 1.0);
        let err = mean_cancer_burden(&trajectory, 6).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { window: 6, len: 5 }));
        let err = mean_cancer_burden(&trajectory, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { window: 0, .. }));
    }
}
