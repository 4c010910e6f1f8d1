/// Main error type
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// A schedule was constructed with invalid input, e.g. a regime duration
    /// of zero, an empty cycle, or a strength outside its declared bounds.
    /// Raised before any integration is attempted.
    #[error("invalid schedule: {reason}")]
    InvalidSchedule {
        /// What was wrong with the schedule.
        reason: String,
    },
    /// A state component became non-finite or negative during integration,
    /// or the solver failed to converge.
    #[error("numerical divergence at t = {time}: {reason}")]
    NumericalDivergence {
        /// Simulation time at which the divergence was detected.
        time: f64,
        /// Solver diagnostic or the offending state description.
        reason: String,
    },
    /// The objective window is empty or longer than the trajectory.
    #[error("objective window of {window} samples is invalid for a trajectory of {len} samples")]
    InvalidWindow {
        /// Requested trailing window length.
        window: usize,
        /// Trajectory length.
        len: usize,
    },
    /// An average dwell time was requested but the corresponding transition
    /// never fired, so the average is undefined.
    #[error("no {kind} transitions were recorded; average dwell time is undefined")]
    NoTransitions {
        /// Which transition count was zero.
        kind: &'static str,
    },
}

/// Main result type
pub type Result<T> = std::result::Result<T, Error>;
