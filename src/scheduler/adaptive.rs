//! Feedback-controlled scheduling: regimes switch on population thresholds
//! rather than fixed durations.
//!
//! Because the switching condition depends on the evolving state, segments
//! cannot be integrated ahead of time; the scheduler advances one discrete
//! Euler step at a time with the same growth law used by the continuous
//! integrator.

use crate::dynamics::{rates, State, RESISTANT, SENSITIVE};
use crate::error::{Error, Result};
use crate::scheduler::Treatment;
use crate::structs::trajectory::Trajectory;

/// Which regime the threshold scheduler is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Administering,
    Holiday,
}

/// Switching thresholds and the hysteresis guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    /// Administering ends when the resistant population exceeds this.
    pub upper_limit_resistant: f64,
    /// Holiday ends when the sensitive population exceeds this.
    pub upper_limit_sensitive: f64,
    /// A regime must have been active for more than this many steps before a
    /// threshold crossing may fire, so the scheduler cannot chatter.
    pub min_dwell_steps: usize,
}

impl ThresholdPolicy {
    pub fn new(upper_limit_resistant: f64, upper_limit_sensitive: f64) -> Self {
        Self {
            upper_limit_resistant,
            upper_limit_sensitive,
            min_dwell_steps: 5,
        }
    }

    pub fn with_min_dwell_steps(mut self, steps: usize) -> Self {
        self.min_dwell_steps = steps;
        self
    }
}

/// Realized dwell durations, recorded once per transition.
#[derive(Debug, Clone)]
pub struct DwellLog {
    administration: Vec<f64>,
    holiday: Vec<f64>,
    final_phase: Phase,
}

impl Default for DwellLog {
    fn default() -> Self {
        Self {
            administration: Vec::new(),
            holiday: Vec::new(),
            final_phase: Phase::Administering,
        }
    }
}

impl DwellLog {
    /// The phase the scheduler was in when the horizon was reached.
    pub fn final_phase(&self) -> Phase {
        self.final_phase
    }

    pub fn administration_dwells(&self) -> &[f64] {
        &self.administration
    }

    pub fn holiday_dwells(&self) -> &[f64] {
        &self.holiday
    }

    /// Average realized administration duration. Errors when no
    /// Administering -> Holiday transition ever fired, since the average
    /// would otherwise be a division by zero.
    pub fn average_administration(&self) -> Result<f64> {
        mean_or_error(&self.administration, "administration")
    }

    /// Average realized holiday duration, with the same zero-count guard.
    pub fn average_holiday(&self) -> Result<f64> {
        mean_or_error(&self.holiday, "holiday")
    }
}

fn mean_or_error(dwells: &[f64], kind: &'static str) -> Result<f64> {
    if dwells.is_empty() {
        return Err(Error::NoTransitions { kind });
    }
    Ok(dwells.iter().sum::<f64>() / dwells.len() as f64)
}

/// Two-state threshold scheduler.
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdScheduler {
    administering: Treatment,
    holiday: Treatment,
    policy: ThresholdPolicy,
    dt: f64,
}

impl AdaptiveThresholdScheduler {
    pub fn new(
        administering: Treatment,
        holiday: Treatment,
        policy: ThresholdPolicy,
        dt: f64,
    ) -> Result<Self> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(Error::InvalidSchedule {
                reason: format!("step size must be positive and finite, got {}", dt),
            });
        }
        Ok(Self {
            administering,
            holiday,
            policy,
            dt,
        })
    }

    /// Advances `n_steps` Euler steps from `initial_state`, starting in the
    /// Administering phase, and returns the trajectory together with the
    /// realized dwell log. The horizon is always bounded by `n_steps`.
    pub fn run(&self, initial_state: State, n_steps: usize) -> Result<(Trajectory, DwellLog)> {
        if n_steps == 0 {
            return Err(Error::InvalidSchedule {
                reason: "threshold scheduling needs at least one step".to_string(),
            });
        }

        let mut trajectory = Trajectory::with_capacity(n_steps + 1);
        let mut log = DwellLog::default();
        let mut phase = Phase::Administering;
        let mut dwell_steps = 0usize;
        let mut state = initial_state;
        let mut t = 0.0;
        trajectory.push(t, state);

        for _ in 0..n_steps {
            let treatment = match phase {
                Phase::Administering => &self.administering,
                Phase::Holiday => &self.holiday,
            };
            let delta = rates(&state, treatment.params(), treatment.matrix(), treatment.inhibitor());
            state += delta * self.dt;
            t += self.dt;
            dwell_steps += 1;

            for i in 0..state.len() {
                if !state[i].is_finite() {
                    return Err(Error::NumericalDivergence {
                        time: t,
                        reason: format!("population {} became non-finite ({})", i, state[i]),
                    });
                }
                if state[i] < 0.0 {
                    state[i] = 0.0;
                }
            }
            trajectory.push(t, state);

            let past_min_dwell = dwell_steps > self.policy.min_dwell_steps;
            match phase {
                Phase::Administering
                    if past_min_dwell && state[RESISTANT] > self.policy.upper_limit_resistant =>
                {
                    tracing::debug!(t, dwell = dwell_steps, "administering -> holiday");
                    log.administration.push(dwell_steps as f64 * self.dt);
                    phase = Phase::Holiday;
                    dwell_steps = 0;
                }
                Phase::Holiday
                    if past_min_dwell && state[SENSITIVE] > self.policy.upper_limit_sensitive =>
                {
                    tracing::debug!(t, dwell = dwell_steps, "holiday -> administering");
                    log.holiday.push(dwell_steps as f64 * self.dt);
                    phase = Phase::Administering;
                    dwell_steps = 0;
                }
                _ => {}
            }
        }

        log.final_phase = phase;
        Ok((trajectory, log))
    }
}
