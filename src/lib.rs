pub mod dynamics;
pub mod error;
pub mod logger;
pub mod scheduler;
pub mod simulator;

pub mod routines {
    pub mod objective;
    pub mod optimization;
    pub mod output;
    pub mod settings;
    pub mod sweep;
}

pub mod structs {
    pub mod trajectory;
}

pub mod prelude {
    pub use crate::dynamics::{
        rates, InteractionMatrix, RateParameters, State, RESISTANT, SENSITIVE,
    };
    pub use crate::error::{Error, Result};
    pub use crate::routines::objective::{
        mean_cancer_burden, weighted_cancer_burden, ObjectiveKind,
    };
    pub use crate::routines::optimization::{
        Bounds, OptimizationResult, ParameterKind, ScheduleProblem,
    };
    pub use crate::routines::sweep::{sweep, SweepPoint};
    pub use crate::scheduler::adaptive::{
        AdaptiveThresholdScheduler, DwellLog, Phase, ThresholdPolicy,
    };
    pub use crate::scheduler::{run_schedule, Cycle, Regime, Schedule, Treatment};
    pub use crate::structs::trajectory::{Sample, Trajectory};
}
