use laplace_noise_timeseries::{
    apply_laplace_noise, generate, CountSeries, Experiment, ExperimentConfig, LaplaceError,
    LaplaceMechanism, SeriesParams,
};
use pretty_assertions::assert_eq;

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

#[test]
fn generator_and_mechanism_are_reproducible() {
    let params = SeriesParams::default();
    let (_, counts_a) = generate(&params).unwrap();
    let (_, counts_b) = generate(&params).unwrap();
    assert_eq!(counts_a, counts_b);

    let noisy_a = apply_laplace_noise(&counts_a, 1.0, 1.0, 123).unwrap();
    let noisy_b = apply_laplace_noise(&counts_b, 1.0, 1.0, 123).unwrap();
    assert_eq!(noisy_a, noisy_b);

    let other_seed = apply_laplace_noise(&counts_a, 1.0, 1.0, 124).unwrap();
    assert_ne!(noisy_a, other_seed);
}

#[test]
fn small_bell_curve_scenario() {
    let (time, counts) = generate(&SeriesParams {
        len: 10,
        peak: 10.0,
        noise_std: 0.0,
        seed: 0,
    })
    .unwrap();
    assert_eq!(time.len(), 10);
    let peak_at = counts
        .as_slice()
        .iter()
        .enumerate()
        .max_by_key(|(_, c)| **c)
        .map(|(i, _)| i)
        .unwrap();
    assert!((4..=5).contains(&peak_at));
    assert_eq!(counts.max(), 10);
    assert!(counts.as_slice()[0] <= 1 && counts.as_slice()[9] <= 1);

    let faint = apply_laplace_noise(&counts, 1_000.0, 1.0, 123).unwrap();
    let faint_noise = faint.noise_against(&counts);
    assert!(faint_noise.iter().all(|n| n.abs() < 0.01), "{faint_noise:?}");
}

#[test]
fn deviation_scales_with_sensitivity_over_epsilon() {
    let counts = CountSeries::new(vec![25; 20_000]);
    for (epsilon, sensitivity) in [(0.01, 1.0), (1.0, 1.0), (2.0, 4.0)] {
        let noisy = apply_laplace_noise(&counts, epsilon, sensitivity, 99).unwrap();
        let b = sensitivity / epsilon;
        let observed = std_dev(&noisy.noise_against(&counts));
        let expected = std::f64::consts::SQRT_2 * b;
        assert!(
            (observed / expected - 1.0).abs() < 0.1,
            "eps={epsilon} observed={observed} expected={expected}"
        );
    }
}

#[test]
fn invalid_parameters_fail_fast() {
    let counts = CountSeries::new(vec![1, 2, 3]);
    for (epsilon, sensitivity) in [(0.0, 1.0), (-1.0, 1.0), (1.0, 0.0), (1.0, -3.0)] {
        let err = apply_laplace_noise(&counts, epsilon, sensitivity, 1).unwrap_err();
        assert!(
            matches!(err, LaplaceError::InvalidParameter { .. }),
            "unexpected {err}"
        );
    }
    assert!(LaplaceMechanism::from_raw(f64::NAN, 1.0).is_err());
}

#[test]
fn mean_absolute_noise_follows_budget_ordering() {
    let cfg = ExperimentConfig {
        length: 2_000,
        epsilons: vec![0.2, 1.0, 5.0],
        ..ExperimentConfig::default()
    };
    let outcome = Experiment::run(&cfg).unwrap();
    let observed: Vec<f64> = outcome
        .panels
        .iter()
        .map(|panel| panel.summary.mean_abs)
        .collect();
    assert!(observed[0] > observed[1] && observed[1] > observed[2], "{observed:?}");
    for panel in &outcome.panels {
        let ratio = panel.summary.abs_ratio();
        assert!((0.85..1.15).contains(&ratio), "eps={} ratio={ratio}", panel.epsilon);
    }
}

#[test]
fn strong_privacy_panel_keeps_negative_values() {
    let outcome = Experiment::run(&ExperimentConfig {
        epsilons: vec![0.05],
        ..ExperimentConfig::default()
    })
    .unwrap();
    let panel = &outcome.panels[0];
    assert!(panel.summary.negative_values > 0);
    assert_eq!(
        panel.summary.negative_values,
        panel.noisy.as_slice().iter().filter(|v| **v < 0.0).count()
    );
    assert!(panel.display.iter().all(|v| *v >= 0.0));
    assert_eq!(panel.display, panel.noisy.clipped_for_display());
}
