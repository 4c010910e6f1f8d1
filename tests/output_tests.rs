use anyhow::Result;
use atcore::prelude::*;
use atcore::routines::output;

fn small_trajectory() -> Result<Trajectory> {
    let matrix = InteractionMatrix::new([[0.0; 4]; 4]);
    let params = RateParameters::new([0.0; 4], [0.1; 4]);
    let baseline = Treatment::new(params, matrix);
    let cycle = Cycle::new(vec![Regime::new("decay", baseline, 1.0, 5)?])?;
    Ok(run_schedule(cycle, 2, State::new(1.0, 2.0, 3.0, 4.0))?)
}

#[test]
fn trajectory_rows_carry_total_cancer() -> Result<()> {
    let trajectory = small_trajectory()?;
    let rows = output::trajectory_rows(&trajectory);
    assert_eq!(rows.len(), trajectory.len());
    assert_eq!(rows[0].n3, 3.0);
    assert_eq!(rows[0].n4, 4.0);
    assert_eq!(rows[0].total_cancer, 7.0);
    Ok(())
}

#[test]
fn trajectory_csv_has_expected_shape() -> Result<()> {
    let trajectory = small_trajectory()?;
    let path = std::env::temp_dir().join("atcore_trajectory_test.csv");
    output::write_trajectory(&trajectory, &path)?;

    let contents = std::fs::read_to_string(&path)?;
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("time,n1,n2,n3,n4,total_cancer"));
    assert_eq!(lines.count(), trajectory.len());

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn optimization_results_csv_has_expected_shape() -> Result<()> {
    let results = vec![
        OptimizationResult {
            parameters: vec![1.5, 2.5],
            objective: 12.25,
            iterations: 40,
            evaluations: 77,
            converged: true,
        },
        OptimizationResult {
            parameters: vec![0.5, 3.0],
            objective: 13.5,
            iterations: 30,
            evaluations: 61,
            converged: false,
        },
    ];
    let names = vec!["drug_duration".to_string(), "holiday_duration".to_string()];
    let path = std::env::temp_dir().join("atcore_results_test.csv");
    output::write_optimization_results(&names, &results, &path)?;

    let contents = std::fs::read_to_string(&path)?;
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("drug_duration,holiday_duration,objective,iterations,evaluations")
    );
    assert_eq!(lines.next(), Some("1.5,2.5,12.25,40,77"));
    assert_eq!(lines.next(), Some("0.5,3,13.5,30,61"));

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn mismatched_parameter_names_are_rejected() {
    let results = vec![OptimizationResult {
        parameters: vec![1.0],
        objective: 1.0,
        iterations: 1,
        evaluations: 1,
        converged: true,
    }];
    let names = vec!["a".to_string(), "b".to_string()];
    let path = std::env::temp_dir().join("atcore_results_mismatch_test.csv");
    assert!(output::write_optimization_results(&names, &results, &path).is_err());
    std::fs::remove_file(&path).ok();
}
