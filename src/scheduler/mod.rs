//! Regime-switching schedule execution.
//!
//! A [`Cycle`] is an ordered, repeating list of [`Regime`]s. The scheduler
//! walks the cycle a bounded number of rounds, integrating each regime from
//! the last state of the trajectory so far and stitching the segments into
//! one continuous trajectory. Regime order is data, not code.

pub mod adaptive;

use crate::dynamics::{InteractionMatrix, RateParameters, State};
use crate::error::{Error, Result};
use crate::simulator;
use crate::structs::trajectory::Trajectory;

/// One drug-administration condition: rate parameters, interaction matrix and
/// optional scalar inhibitor. Shared between the timed and the
/// threshold-switched schedulers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Treatment {
    params: RateParameters,
    matrix: InteractionMatrix,
    inhibitor: f64,
}

impl Treatment {
    pub fn new(params: RateParameters, matrix: InteractionMatrix) -> Self {
        Self {
            params,
            matrix,
            inhibitor: 0.0,
        }
    }

    /// Sets the scalar inhibitor strength acting on the sensitive population.
    pub fn with_inhibitor(mut self, inhibitor: f64) -> Result<Self> {
        if !inhibitor.is_finite() || inhibitor < 0.0 {
            return Err(Error::InvalidSchedule {
                reason: format!("inhibitor strength must be non-negative, got {}", inhibitor),
            });
        }
        self.inhibitor = inhibitor;
        Ok(self)
    }

    /// Replaces the interaction matrix with a fresh copy carrying one
    /// overridden entry.
    pub fn with_matrix_override(mut self, row: usize, col: usize, value: f64) -> Self {
        self.matrix = self.matrix.with_override(row, col, value);
        self
    }

    pub fn params(&self) -> &RateParameters {
        &self.params
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn inhibitor(&self) -> f64 {
        self.inhibitor
    }
}

/// The unit of scheduling: a treatment applied for a fixed duration, sampled
/// a fixed number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Regime {
    name: String,
    treatment: Treatment,
    duration: f64,
    samples: usize,
}

impl Regime {
    /// Fails fast on a non-positive duration or fewer than 2 samples, rather
    /// than letting an empty segment reach the integrator.
    pub fn new(
        name: impl Into<String>,
        treatment: Treatment,
        duration: f64,
        samples: usize,
    ) -> Result<Self> {
        let name = name.into();
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(Error::InvalidSchedule {
                reason: format!(
                    "regime '{}' has invalid duration {}, must be positive and finite",
                    name, duration
                ),
            });
        }
        if samples < 2 {
            return Err(Error::InvalidSchedule {
                reason: format!(
                    "regime '{}' needs at least 2 samples per segment, got {}",
                    name, samples
                ),
            });
        }
        Ok(Self {
            name,
            treatment,
            duration,
            samples,
        })
    }

    pub fn with_duration(self, duration: f64) -> Result<Self> {
        Regime::new(self.name, self.treatment, duration, self.samples)
    }

    pub fn with_treatment(mut self, treatment: Treatment) -> Self {
        self.treatment = treatment;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn treatment(&self) -> &Treatment {
        &self.treatment
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// An ordered, cyclic, non-empty list of regimes defining a therapy schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    regimes: Vec<Regime>,
}

impl Cycle {
    pub fn new(regimes: Vec<Regime>) -> Result<Self> {
        if regimes.is_empty() {
            return Err(Error::InvalidSchedule {
                reason: "a cycle must contain at least one regime".to_string(),
            });
        }
        Ok(Self { regimes })
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    pub fn len(&self) -> usize {
        self.regimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regimes.is_empty()
    }

    /// Samples contributed by one full pass over the cycle.
    pub fn samples_per_round(&self) -> usize {
        self.regimes.iter().map(|r| r.samples).sum()
    }

    /// Simulated time covered by one full pass over the cycle.
    pub fn duration(&self) -> f64 {
        self.regimes.iter().map(|r| r.duration).sum()
    }
}

/// A bounded run of a cycle: `n_rounds` full passes, optionally preceded by a
/// settling segment that lets the populations reach quasi-equilibrium under
/// the baseline treatment before the schedule begins.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    cycle: Cycle,
    n_rounds: usize,
    settling: Option<Regime>,
}

impl Schedule {
    pub fn new(cycle: Cycle, n_rounds: usize) -> Result<Self> {
        if n_rounds == 0 {
            return Err(Error::InvalidSchedule {
                reason: "a schedule must run at least one round".to_string(),
            });
        }
        Ok(Self {
            cycle,
            n_rounds,
            settling: None,
        })
    }

    pub fn with_settling(mut self, settling: Regime) -> Self {
        self.settling = Some(settling);
        self
    }

    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    pub fn n_rounds(&self) -> usize {
        self.n_rounds
    }

    /// Total sample count of the trajectory this schedule will produce.
    pub fn total_samples(&self) -> usize {
        let settling = self.settling.as_ref().map_or(0, |r| r.samples);
        settling + self.n_rounds * self.cycle.samples_per_round()
    }

    /// Runs the schedule to completion, returning the stitched trajectory.
    ///
    /// The trajectory holds every segment's samples in order; the first
    /// sample of each segment equals the last sample of the previous one.
    pub fn run(&self, initial_state: State) -> Result<Trajectory> {
        for i in 0..initial_state.len() {
            let v = initial_state[i];
            if !v.is_finite() || v < 0.0 {
                return Err(Error::InvalidSchedule {
                    reason: format!("initial population {} is invalid ({})", i, v),
                });
            }
        }

        let mut trajectory = Trajectory::with_capacity(self.total_samples());
        let mut state = initial_state;
        let mut t = 0.0;

        if let Some(settling) = &self.settling {
            tracing::debug!(regime = settling.name(), span = settling.duration, "settling");
            let segment = run_segment(settling, state, t)?;
            state = segment.last().expect("segment is never empty").state;
            t += settling.duration;
            trajectory.extend(segment);
        }

        for round in 0..self.n_rounds {
            for regime in self.cycle.regimes() {
                tracing::debug!(
                    round,
                    regime = regime.name(),
                    t,
                    span = regime.duration,
                    "integrating segment"
                );
                let segment = run_segment(regime, state, t)?;
                state = segment.last().expect("segment is never empty").state;
                t += regime.duration;
                trajectory.extend(segment);
            }
        }

        Ok(trajectory)
    }
}

fn run_segment(regime: &Regime, state: State, t: f64) -> Result<Trajectory> {
    simulator::integrate(
        state,
        t,
        regime.duration,
        regime.samples,
        regime.treatment.params(),
        regime.treatment.matrix(),
        regime.treatment.inhibitor(),
    )
}

/// Simulation entry point: runs `cycle` for `n_rounds` full repetitions from
/// `initial_state`, with no settling prefix.
pub fn run_schedule(cycle: Cycle, n_rounds: usize, initial_state: State) -> Result<Trajectory> {
    Schedule::new(cycle, n_rounds)?.run(initial_state)
}
