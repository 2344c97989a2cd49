//! Integration tests for OLS fitting and correlation screening

use approx::assert_relative_eq;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retpred_data::PredictorPanel;
use retpred_ols::{
    CovarianceType, Design, OlsError, OlsModel, Target, add_constant, corr_with, ols_formula,
};

fn monthly_periods(n: usize) -> Vec<i64> {
    (0..n as i64).map(|i| (1950 + i / 12) * 100 + i % 12 + 1).collect()
}

/// Panel with a noisy linear relation `ret = 0.01 + 0.5 ep - 0.2 infl12 + e`.
fn random_panel(n: usize, seed: u64) -> PredictorPanel {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ep = Vec::with_capacity(n);
    let mut infl12 = Vec::with_capacity(n);
    let mut lty = Vec::with_capacity(n);
    let mut ret = Vec::with_capacity(n);

    for _ in 0..n {
        let e = rng.gen_range(0.02..0.10);
        let i = rng.gen_range(-0.01..0.02);
        let noise = rng.gen_range(-0.02..0.02);
        ep.push(Some(e));
        infl12.push(Some(i));
        lty.push(Some(rng.gen_range(0.02..0.12)));
        ret.push(Some(0.01 + 0.5 * e - 0.2 * i + noise));
    }

    PredictorPanel::from_columns(
        monthly_periods(n),
        vec![
            ("ep".to_string(), ep),
            ("infl12".to_string(), infl12),
            ("lty".to_string(), lty),
            ("ret".to_string(), ret),
        ],
    )
    .unwrap()
}

#[test]
fn test_formula_and_matrix_styles_agree() {
    let panel = random_panel(120, 11);

    let formula_fit = ols_formula("ret ~ ep + infl12 + lty", &panel)
        .unwrap()
        .fit()
        .unwrap();

    let design = Design::from_panel(&panel, &["ep", "infl12", "lty"]).unwrap();
    let target = Target::from_panel(&panel, "ret").unwrap();
    let matrix_fit = OlsModel::new(target, add_constant(&design).unwrap())
        .unwrap()
        .fit()
        .unwrap();

    assert_eq!(formula_fit.names()[0], "Intercept");
    assert_eq!(matrix_fit.names()[0], "const");
    for (a, b) in formula_fit.params().iter().zip(matrix_fit.params()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8);
    }
    assert_relative_eq!(formula_fit.rsquared(), matrix_fit.rsquared(), epsilon = 1e-12);

    // the generating slopes are recovered roughly
    assert_relative_eq!(matrix_fit.param("ep").unwrap(), 0.5, epsilon = 0.1);
}

#[test]
fn test_hac_without_lags_matches_hc0() {
    let panel = random_panel(60, 3);
    let design = add_constant(&Design::from_panel(&panel, &["ep", "infl12"]).unwrap()).unwrap();
    let target = Target::from_panel(&panel, "ret").unwrap();
    let model = OlsModel::new(target, design).unwrap();

    let hc0 = model.fit_with(CovarianceType::HC0).unwrap();
    let plain = CovarianceType::Hac {
        lags: Some(0),
        correction: false,
    };
    let corrected = CovarianceType::Hac {
        lags: Some(0),
        correction: true,
    };
    let hac = model.fit_with(plain).unwrap();
    let scaled = model.fit_with(corrected).unwrap();

    let scale = 60.0 / (60.0 - 3.0);
    for ((h, s), w) in hac
        .cov_params()
        .iter()
        .zip(scaled.cov_params())
        .zip(hc0.cov_params())
    {
        assert_relative_eq!(*h, *w, max_relative = 1e-12);
        assert_relative_eq!(*s, w * scale, max_relative = 1e-12);
    }
    assert_eq!(hac.params(), hc0.params());
    assert_eq!(scaled.cov_type(), corrected);
}

#[test]
fn test_robust_fit_keeps_coefficients() {
    let panel = random_panel(90, 5);
    let model = ols_formula("ret ~ ep + infl12", &panel).unwrap();

    let classical = model.fit().unwrap();
    let robust = model
        .fit_with(CovarianceType::Hac {
            lags: None,
            correction: false,
        })
        .unwrap();

    assert_eq!(classical.params(), robust.params());
    assert!(robust.bse().iter().all(|se| se.is_finite() && *se > 0.0));
    assert!(robust.statistics().fvalue.is_finite());
}

#[test]
fn test_threshold_filter_is_exact_and_monotone() {
    let n = 80;
    let k = 12;
    let mut rng = StdRng::seed_from_u64(42);

    let target_values: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut matrix = Array2::<f64>::zeros((n, k));
    for j in 0..k {
        let loading = j as f64 / k as f64;
        for i in 0..n {
            matrix[[i, j]] = loading * target_values[i] + rng.gen_range(-1.0..1.0);
        }
    }
    let names = (0..k).map(|j| format!("x{j}")).collect();
    let design = Design::new(names, matrix).unwrap();
    let target = Target::new("ret", target_values.into());

    let corr = corr_with(&design, &target).unwrap();

    let mut previous = corr.len() + 1;
    for step in 0..=20 {
        let tau = step as f64 * 0.05;
        let retained = corr.above(tau);

        let expected: Vec<&str> = corr
            .iter()
            .filter(|(_, rho)| rho.abs() > tau)
            .map(|(name, _)| name)
            .collect();
        assert_eq!(retained.names(), expected);
        assert!(retained.len() <= previous);
        previous = retained.len();
    }
}

#[test]
fn test_collinear_pruning_on_short_series() {
    // 24 months; `double` is an exact multiple of `signal`
    let n = 24;
    let signal: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin()).collect();
    let ret: Vec<f64> = signal.iter().map(|s| 0.02 * s + 0.001).collect();
    let noise: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 0.3 } else { -0.3 }).collect();

    let mut matrix = Array2::<f64>::zeros((n, 3));
    for i in 0..n {
        matrix[[i, 0]] = signal[i];
        matrix[[i, 1]] = 2.0 * signal[i];
        matrix[[i, 2]] = noise[i];
    }
    let design = Design::new(
        vec!["signal".to_string(), "double".to_string(), "noise".to_string()],
        matrix,
    )
    .unwrap();
    let target = Target::new("ret", ret.into());

    let corr = corr_with(&design, &target).unwrap();
    let tau = 0.9;
    let retained = corr.above(tau);

    let strongest = corr
        .iter()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(name, _)| name)
        .unwrap();
    assert!(retained.names().contains(&strongest));
    for (name, rho) in corr.iter() {
        assert_eq!(retained.names().contains(&name), rho.abs() > tau);
    }
    assert!(!retained.names().contains(&"noise"));

    // both collinear copies survive the filter, so the re-fit is singular
    let subset = design.select(&retained.names()).unwrap();
    let err = OlsModel::new(target, add_constant(&subset).unwrap())
        .unwrap()
        .fit()
        .unwrap_err();
    assert!(matches!(err, OlsError::Singular { column } if column == "double"));
}
