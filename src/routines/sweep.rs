//! Parameter sweeps over independent simulation or optimization runs.
//!
//! Each sweep point is a pure function of its inputs, so points are
//! dispatched to the rayon pool with no synchronization. A divergent point
//! never aborts the sweep: its failure is logged and reported as a NaN
//! sentinel.

use rayon::prelude::*;

/// One evaluated sweep point. `objective` is NaN when the evaluation failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub value: f64,
    pub objective: f64,
}

/// Evaluates `eval` at every value in parallel, in input order.
pub fn sweep<F>(values: &[f64], eval: F) -> Vec<SweepPoint>
where
    F: Fn(f64) -> anyhow::Result<f64> + Sync,
{
    values
        .par_iter()
        .map(|&value| match eval(value) {
            Ok(objective) => SweepPoint { value, objective },
            Err(e) => {
                tracing::error!(value, error = %e, "sweep point failed");
                SweepPoint {
                    value,
                    objective: f64::NAN,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_points_become_nan_sentinels() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let points = sweep(&values, |v| {
            if v == 3.0 {
                anyhow::bail!("diverged");
            }
            Ok(v * 10.0)
        });
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].objective, 10.0);
        assert_eq!(points[1].objective, 20.0);
        assert!(points[2].objective.is_nan());
        assert_eq!(points[3].objective, 40.0);
    }

    #[test]
    fn order_is_preserved() {
        let values: Vec<f64> = (0..64).map(|k| k as f64).collect();
        let points = sweep(&values, |v| Ok(-v));
        for (k, point) in points.iter().enumerate() {
            assert_eq!(point.value, k as f64);
            assert_eq!(point.objective, -(k as f64));
        }
    }
}
