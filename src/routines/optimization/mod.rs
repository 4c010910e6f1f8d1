//! Derivative-free schedule optimization.
//!
//! A [`ScheduleProblem`] composes the objective extractor with the scheduler
//! behind a parameter decoder, and wraps a Nelder-Mead simplex around the
//! whole thing. The decoder is explicit data: every optimized scalar names
//! the regime field (duration, inhibitor strength or matrix cell) it feeds,
//! so the coupling between the flat vector and the cycle is visible and
//! testable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use argmin::core::{CostFunction, Executor, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dynamics::State;
use crate::error::{Error, Result};
use crate::routines::objective::ObjectiveKind;
use crate::scheduler::{Cycle, Regime, Schedule};

/// Per-parameter closed intervals. Trial points proposed by the simplex are
/// clamped into their intervals before decoding, so every reported parameter
/// lies inside its declared bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    intervals: Vec<(f64, f64)>,
}

impl Bounds {
    pub fn new(intervals: Vec<(f64, f64)>) -> Result<Self> {
        for &(lo, hi) in &intervals {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(Error::InvalidSchedule {
                    reason: format!("invalid bound interval ({}, {})", lo, hi),
                });
            }
        }
        Ok(Self { intervals })
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[(f64, f64)] {
        &self.intervals
    }

    pub fn clamp(&self, point: &[f64]) -> Vec<f64> {
        point
            .iter()
            .zip(&self.intervals)
            .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
            .collect()
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.intervals.len()
            && point
                .iter()
                .zip(&self.intervals)
                .all(|(&v, &(lo, hi))| v >= lo && v <= hi)
    }
}

/// What one component of the optimization vector controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    /// Duration of the cycle's `regime`-th regime.
    Duration { regime: usize },
    /// Scalar inhibitor strength of the `regime`-th regime.
    Inhibitor { regime: usize },
    /// One interaction-matrix entry of the `regime`-th regime, overridden on
    /// a fresh copy of that regime's matrix.
    MatrixCell { regime: usize, row: usize, col: usize },
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Best parameters found, clamped into their bounds.
    pub parameters: Vec<f64>,
    /// Objective value at the best parameters.
    pub objective: f64,
    /// Solver iterations performed.
    pub iterations: u64,
    /// Objective evaluations performed.
    pub evaluations: u64,
    /// False when the solver exhausted its iteration budget without meeting
    /// its tolerance; the best-found point is still returned.
    pub converged: bool,
}

/// A bound-constrained schedule optimization problem.
#[derive(Debug, Clone)]
pub struct ScheduleProblem {
    template: Cycle,
    layout: Vec<ParameterKind>,
    bounds: Bounds,
    n_rounds: usize,
    settling: Option<Regime>,
    initial_state: State,
    objective: ObjectiveKind,
    window: usize,
    evaluations: Arc<AtomicU64>,
}

impl ScheduleProblem {
    pub fn new(
        template: Cycle,
        layout: Vec<ParameterKind>,
        bounds: Bounds,
        n_rounds: usize,
        initial_state: State,
        objective: ObjectiveKind,
        window: usize,
    ) -> Result<Self> {
        if layout.len() != bounds.len() {
            return Err(Error::InvalidSchedule {
                reason: format!(
                    "parameter layout has {} entries but bounds have {}",
                    layout.len(),
                    bounds.len()
                ),
            });
        }
        for kind in &layout {
            let regime = match kind {
                ParameterKind::Duration { regime }
                | ParameterKind::Inhibitor { regime }
                | ParameterKind::MatrixCell { regime, .. } => *regime,
            };
            if regime >= template.len() {
                return Err(Error::InvalidSchedule {
                    reason: format!(
                        "parameter refers to regime {} but the cycle has {}",
                        regime,
                        template.len()
                    ),
                });
            }
        }
        Ok(Self {
            template,
            layout,
            bounds,
            n_rounds,
            settling: None,
            initial_state,
            objective,
            window,
            evaluations: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn with_settling(mut self, settling: Regime) -> Self {
        self.settling = Some(settling);
        self
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Maps a flat parameter vector (clamped into bounds) onto a fresh cycle
    /// built from the template.
    pub fn decode(&self, point: &[f64]) -> Result<Cycle> {
        let point = self.bounds.clamp(point);
        let mut regimes: Vec<Regime> = self.template.regimes().to_vec();
        for (kind, &value) in self.layout.iter().zip(point.iter()) {
            match *kind {
                ParameterKind::Duration { regime } => {
                    regimes[regime] = regimes[regime].clone().with_duration(value)?;
                }
                ParameterKind::Inhibitor { regime } => {
                    let treatment = regimes[regime].treatment().with_inhibitor(value)?;
                    regimes[regime] = regimes[regime].clone().with_treatment(treatment);
                }
                ParameterKind::MatrixCell { regime, row, col } => {
                    let treatment = regimes[regime]
                        .treatment()
                        .with_matrix_override(row, col, value);
                    regimes[regime] = regimes[regime].clone().with_treatment(treatment);
                }
            }
        }
        Cycle::new(regimes)
    }

    fn evaluate(&self, point: &[f64]) -> anyhow::Result<f64> {
        let cycle = self.decode(point)?;
        let mut schedule = Schedule::new(cycle, self.n_rounds)?;
        if let Some(settling) = &self.settling {
            schedule = schedule.with_settling(settling.clone());
        }
        let trajectory = schedule.run(self.initial_state)?;
        let value = self.objective.evaluate(&trajectory, self.window)?;
        Ok(value)
    }

    /// Minimizes the objective from `initial_guess`, which is clamped into
    /// bounds first. The simplex jitter is drawn from a seeded RNG so runs
    /// are reproducible.
    pub fn optimize(
        &self,
        initial_guess: &[f64],
        max_iters: u64,
        seed: u64,
    ) -> anyhow::Result<OptimizationResult> {
        if initial_guess.len() != self.layout.len() {
            return Err(Error::InvalidSchedule {
                reason: format!(
                    "initial guess has {} components but the problem has {}",
                    initial_guess.len(),
                    self.layout.len()
                ),
            }
            .into());
        }
        self.evaluations.store(0, Ordering::Relaxed);

        let start = self.bounds.clamp(initial_guess);
        let mut rng = StdRng::seed_from_u64(seed);
        let simplex = self.initial_simplex(&start, &mut rng);

        let solver: NelderMead<Vec<f64>, f64> =
            NelderMead::new(simplex).with_sd_tolerance(1e-8)?;
        let res = Executor::new(self.clone(), solver)
            .configure(|state| state.max_iters(max_iters))
            .run()?;

        let converged = matches!(
            &res.state.termination_status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        if !converged {
            tracing::warn!(
                status = ?res.state.termination_status,
                iterations = res.state.iter,
                "optimizer stopped without meeting its tolerance"
            );
        }

        let best = res
            .state
            .best_param
            .clone()
            .ok_or_else(|| anyhow::anyhow!("optimizer returned no best parameters"))?;

        Ok(OptimizationResult {
            parameters: self.bounds.clamp(&best),
            objective: res.state.best_cost,
            iterations: res.state.iter,
            evaluations: self.evaluations.load(Ordering::Relaxed),
            converged,
        })
    }

    /// Builds the n+1 simplex vertices: the start point plus one inward or
    /// outward perturbation per dimension, jittered so restarts with
    /// different seeds explore differently, and kept inside bounds.
    fn initial_simplex(&self, start: &[f64], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut vertices = Vec::with_capacity(start.len() + 1);
        vertices.push(start.to_vec());
        for i in 0..start.len() {
            let (lo, hi) = self.bounds.intervals[i];
            let step = 0.05 * (hi - lo) * rng.gen_range(0.5..1.0);
            let mut vertex = start.to_vec();
            vertex[i] = if start[i] + step <= hi {
                start[i] + step
            } else {
                start[i] - step
            };
            vertices.push(vertex);
        }
        vertices
    }
}

impl CostFunction for ScheduleProblem {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let value = self.evaluate(param)?;
        Ok(value)
    }
}
