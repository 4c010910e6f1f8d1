//! The time series of population states produced by running a schedule.

use crate::dynamics::{State, RESISTANT, SENSITIVE};

/// One `(time, state)` sample of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub state: State,
}

impl Sample {
    pub fn new(time: f64, state: State) -> Self {
        Self { time, state }
    }

    /// Sum of the sensitive and resistant cancer populations.
    pub fn total_cancer(&self) -> f64 {
        self.state[SENSITIVE] + self.state[RESISTANT]
    }
}

/// An ordered, append-only sequence of samples.
///
/// Segments produced by the integrator are stitched with [`Trajectory::extend`];
/// once returned to a caller the trajectory is treated as immutable.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, time: f64, state: State) {
        self.samples.push(Sample::new(time, state));
    }

    /// Appends all samples of `segment`, preserving both endpoints. The
    /// boundary state therefore appears once as the previous segment's last
    /// sample and once as the new segment's first sample, and the two must
    /// agree for a well-stitched trajectory.
    pub fn extend(&mut self, segment: Trajectory) {
        self.samples.extend(segment.samples);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The trailing `window` samples, or `None` if the trajectory is shorter.
    pub fn trailing(&self, window: usize) -> Option<&[Sample]> {
        self.samples
            .len()
            .checked_sub(window)
            .map(|start| &self.samples[start..])
    }
}
