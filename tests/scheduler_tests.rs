use anyhow::Result;
use atcore::prelude::*;

fn baseline_matrix() -> InteractionMatrix {
    InteractionMatrix::new([
        [0.0, 0.4, 0.65, 0.55],
        [0.3, 0.0, -0.3, -0.3],
        [0.6, 0.0, 0.2, 0.0],
        [0.55, 0.0, -0.6, 0.4],
    ])
}

fn baseline_rates() -> RateParameters {
    RateParameters::new([0.8, 1.2, 0.3, 0.3], [0.9, 0.08, 0.2, 0.1])
}

fn initial_state() -> State {
    State::new(20.0, 30.0, 20.0, 5.0)
}

fn two_regime_cycle(samples: usize) -> Result<Cycle> {
    let baseline = Treatment::new(baseline_rates(), baseline_matrix());
    let drug = baseline.with_inhibitor(0.8)?;
    let cycle = Cycle::new(vec![
        Regime::new("drug", drug, 2.0, samples)?,
        Regime::new("holiday", baseline, 3.0, samples)?,
    ])?;
    Ok(cycle)
}

/// The last sample of each integrated segment equals the first sample of the
/// next segment.
#[test]
fn state_continuity_across_stitch_boundaries() -> Result<()> {
    let samples = 15;
    let cycle = two_regime_cycle(samples)?;
    let trajectory = run_schedule(cycle, 2, initial_state())?;

    // 4 segments of `samples` each; boundaries sit at multiples of `samples`.
    assert_eq!(trajectory.len(), 4 * samples);
    for boundary in (samples..trajectory.len()).step_by(samples) {
        let before = &trajectory.samples()[boundary - 1];
        let after = &trajectory.samples()[boundary];
        assert!((before.time - after.time).abs() < 1e-12);
        for i in 0..4 {
            assert!(
                (before.state[i] - after.state[i]).abs() < 1e-12,
                "discontinuity in population {} at boundary {}: {} vs {}",
                i,
                boundary,
                before.state[i],
                after.state[i]
            );
        }
    }
    Ok(())
}

/// Total trajectory length equals the sum of configured per-segment counts,
/// for all round counts from 1 to 10.
#[test]
fn sample_count_conservation() -> Result<()> {
    for n_rounds in 1..=10 {
        let cycle = two_regime_cycle(10)?;
        let per_round = cycle.samples_per_round();
        let trajectory = run_schedule(cycle, n_rounds, initial_state())?;
        assert_eq!(trajectory.len(), n_rounds * per_round);
    }
    Ok(())
}

#[test]
fn settling_prefix_is_counted_and_continuous() -> Result<()> {
    let cycle = two_regime_cycle(12)?;
    let baseline = Treatment::new(baseline_rates(), baseline_matrix());
    let settling = Regime::new("settling", baseline, 30.0, 40)?;
    let schedule = Schedule::new(cycle, 3)?.with_settling(settling);

    assert_eq!(schedule.total_samples(), 40 + 3 * 24);
    let trajectory = schedule.run(initial_state())?;
    assert_eq!(trajectory.len(), schedule.total_samples());

    let before = &trajectory.samples()[39];
    let after = &trajectory.samples()[40];
    for i in 0..4 {
        assert!((before.state[i] - after.state[i]).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn zero_or_negative_durations_fail_fast() {
    let baseline = Treatment::new(baseline_rates(), baseline_matrix());
    for duration in [0.0, -1.0, f64::NAN] {
        let err = Regime::new("bad", baseline, duration, 10).unwrap_err();
        assert!(matches!(err, Error::InvalidSchedule { .. }));
    }
}

#[test]
fn empty_cycle_is_rejected() {
    let err = Cycle::new(vec![]).unwrap_err();
    assert!(matches!(err, Error::InvalidSchedule { .. }));
}

#[test]
fn zero_rounds_are_rejected() -> Result<()> {
    let cycle = two_regime_cycle(10)?;
    let err = Schedule::new(cycle, 0).unwrap_err();
    assert!(matches!(err, Error::InvalidSchedule { .. }));
    Ok(())
}

#[test]
fn negative_initial_state_is_rejected() -> Result<()> {
    let cycle = two_regime_cycle(10)?;
    let err = run_schedule(cycle, 1, State::new(-1.0, 30.0, 20.0, 5.0)).unwrap_err();
    assert!(matches!(err, Error::InvalidSchedule { .. }));
    Ok(())
}

#[test]
fn negative_inhibitor_is_rejected() {
    let baseline = Treatment::new(baseline_rates(), baseline_matrix());
    let err = baseline.with_inhibitor(-0.5).unwrap_err();
    assert!(matches!(err, Error::InvalidSchedule { .. }));
}

/// Regression guard for the negative-base/fractional-exponent failure mode:
/// a single-regime 10-step integration of the baseline scenario stays finite
/// and non-negative in all four populations.
#[test]
fn baseline_scenario_stays_finite_and_non_negative() -> Result<()> {
    let baseline = Treatment::new(baseline_rates(), baseline_matrix());
    let cycle = Cycle::new(vec![Regime::new("no drug", baseline, 5.0, 10)?])?;
    let trajectory = run_schedule(cycle, 1, initial_state())?;

    assert_eq!(trajectory.len(), 10);
    for sample in trajectory.samples() {
        for i in 0..4 {
            assert!(sample.state[i].is_finite());
            assert!(sample.state[i] >= 0.0);
        }
    }
    Ok(())
}

/// Super-linear self-reinforcing growth blows up in finite time; the run
/// must report the divergence instead of returning a garbage trajectory.
#[test]
fn divergent_dynamics_surface_numerical_divergence() -> Result<()> {
    let mut entries = [[0.0; 4]; 4];
    entries[2][2] = 2.0;
    let explosive = Treatment::new(
        RateParameters::new([0.0, 0.0, 100.0, 0.0], [0.0; 4]),
        InteractionMatrix::new(entries),
    );
    let cycle = Cycle::new(vec![Regime::new("explosive", explosive, 10.0, 10)?])?;

    let err = run_schedule(cycle, 1, State::new(1.0, 1.0, 10.0, 1.0)).unwrap_err();
    assert!(
        matches!(err, Error::NumericalDivergence { .. }),
        "expected a divergence error, got {:?}",
        err
    );
    Ok(())
}

/// Both burden metrics are computable from the same run without
/// re-simulating.
#[test]
fn plain_and_weighted_objective_from_one_run() -> Result<()> {
    let cycle = two_regime_cycle(10)?;
    let window = cycle.samples_per_round();
    let trajectory = run_schedule(cycle, 3, initial_state())?;

    let plain = mean_cancer_burden(&trajectory, window)?;
    let weighted = weighted_cancer_burden(&trajectory, window, 2.0)?;
    assert!(plain.is_finite());
    assert!(weighted > plain);
    Ok(())
}
