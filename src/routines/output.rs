//! Tabular export of trajectories and optimization results.

use std::fs::File;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::routines::optimization::OptimizationResult;
use crate::structs::trajectory::Trajectory;

/// One trajectory sample as a flat record, one row per sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryRow {
    pub time: f64,
    pub n1: f64,
    pub n2: f64,
    pub n3: f64,
    pub n4: f64,
    pub total_cancer: f64,
}

/// Flattens a trajectory into export rows.
pub fn trajectory_rows(trajectory: &Trajectory) -> Vec<TrajectoryRow> {
    trajectory
        .samples()
        .iter()
        .map(|sample| TrajectoryRow {
            time: sample.time,
            n1: sample.state[0],
            n2: sample.state[1],
            n3: sample.state[2],
            n4: sample.state[3],
            total_cancer: sample.total_cancer(),
        })
        .collect()
}

/// Writes a trajectory as CSV with columns `time,n1,n2,n3,n4,total_cancer`.
pub fn write_trajectory(trajectory: &Trajectory, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for row in trajectory_rows(trajectory) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes optimization results as CSV, one row per run: the named parameters
/// followed by `objective`, `iterations` and `evaluations`.
pub fn write_optimization_results(
    parameter_names: &[String],
    results: &[OptimizationResult],
    path: &Path,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    let mut header: Vec<String> = parameter_names.to_vec();
    header.push("objective".to_string());
    header.push("iterations".to_string());
    header.push("evaluations".to_string());
    writer.write_record(&header)?;

    for result in results {
        anyhow::ensure!(
            result.parameters.len() == parameter_names.len(),
            "result has {} parameters but {} names were given",
            result.parameters.len(),
            parameter_names.len()
        );
        let mut row: Vec<String> = result.parameters.iter().map(|v| v.to_string()).collect();
        row.push(result.objective.to_string());
        row.push(result.iterations.to_string());
        row.push(result.evaluations.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
