//! Constant-regime segment integration.
//!
//! One segment integrates the growth law with a fixed parameterization over a
//! fixed time span, producing evenly spaced samples. The scheduler stitches
//! segments into a full trajectory.

use ode_solvers::Dopri5;

use crate::dynamics::{rates, InteractionMatrix, RateParameters, State};
use crate::error::{Error, Result};
use crate::structs::trajectory::Trajectory;

const RTOL: f64 = 1e-6;
const ATOL: f64 = 1e-6;

/// States below this are treated as genuinely negative rather than a
/// floating-point excursion, and rejected.
const NEGATIVE_TOLERANCE: f64 = -1e-9;

type Time = f64;

#[derive(Debug, Clone)]
struct Model {
    params: RateParameters,
    matrix: InteractionMatrix,
    inhibitor: f64,
}

impl ode_solvers::System<Time, State> for Model {
    fn system(&self, _t: Time, y: &State, dy: &mut State) {
        *dy = rates(y, &self.params, &self.matrix, self.inhibitor);
    }
}

/// Integrates one regime segment from `state0` at absolute time `t0` over
/// `span`, returning `samples` evenly spaced samples including both endpoints.
///
/// Deterministic for fixed inputs. Solver failure, non-finite states and
/// negative-going states surface as [`Error::NumericalDivergence`]; the
/// solver's internal step limit bounds run time on stiff parameter
/// combinations.
pub fn integrate(
    state0: State,
    t0: f64,
    span: f64,
    samples: usize,
    params: &RateParameters,
    matrix: &InteractionMatrix,
    inhibitor: f64,
) -> Result<Trajectory> {
    if !(span > 0.0) || !span.is_finite() {
        return Err(Error::InvalidSchedule {
            reason: format!("segment span must be positive and finite, got {}", span),
        });
    }
    if samples < 2 {
        return Err(Error::InvalidSchedule {
            reason: format!("a segment needs at least 2 samples, got {}", samples),
        });
    }

    let model = Model {
        params: *params,
        matrix: *matrix,
        inhibitor,
    };

    let dt = span / (samples - 1) as f64;
    let mut trajectory = Trajectory::with_capacity(samples);
    let mut x = validated(state0, t0)?;
    trajectory.push(t0, x);

    // Integrate sample-to-sample and keep only the endpoint state of each
    // sub-interval, so the sample count is exact regardless of the solver's
    // internal adaptive steps.
    for k in 1..samples {
        let ti = t0 + (k - 1) as f64 * dt;
        let tf = if k == samples - 1 { t0 + span } else { t0 + k as f64 * dt };
        let mut stepper = Dopri5::new(model.clone(), ti, tf, tf - ti, x, RTOL, ATOL);
        stepper
            .integrate()
            .map_err(|e| Error::NumericalDivergence {
                time: ti,
                reason: format!("solver failed: {:?}", e),
            })?;
        let end = stepper.y_out().last().copied().ok_or_else(|| {
            Error::NumericalDivergence {
                time: ti,
                reason: "solver produced no output".to_string(),
            }
        })?;
        x = validated(end, tf)?;
        trajectory.push(tf, x);
    }

    Ok(trajectory)
}

/// Rejects non-finite or meaningfully negative states and flushes
/// floating-point noise below zero back to zero.
fn validated(state: State, time: f64) -> Result<State> {
    for i in 0..state.len() {
        let v = state[i];
        if !v.is_finite() {
            return Err(Error::NumericalDivergence {
                time,
                reason: format!("population {} became non-finite ({})", i, v),
            });
        }
        if v < NEGATIVE_TOLERANCE {
            return Err(Error::NumericalDivergence {
                time,
                reason: format!("population {} became negative ({})", i, v),
            });
        }
    }
    Ok(state.map(|v| v.max(0.0)))
}
