//! End-to-end tests for the baseline and kitchen-sink passes

use approx::assert_abs_diff_eq;
use retpred::data::{PeriodRange, PredictorPanel};
use retpred::features::SPARSE_MONTHLY_COLUMNS;
use retpred::ols::{CONSTANT_NAME, INTERCEPT_NAME};
use retpred::{AnalysisConfig, StudyError, baseline_panel, baseline_study, kitchen_sink_study};

fn monthly_periods(start_year: i64, n: usize) -> Vec<i64> {
    (0..n as i64)
        .map(|i| (start_year + i / 12) * 100 + i % 12 + 1)
        .collect()
}

fn lty(i: f64) -> f64 {
    0.05 + 0.01 * (0.11 * i).sin()
}

/// 1949-01 through 1955-12, with the sparse columns left empty.
fn synthetic_panel() -> PredictorPanel {
    let n = 84;
    let series = |f: &dyn Fn(f64) -> f64| (0..n).map(|i| Some(f(i as f64))).collect::<Vec<_>>();
    let ret = |i: f64| 0.4 * (lty(i - 1.0) - 0.05) + 0.005 * (1.7 * i).sin();

    let mut columns = vec![
        ("e12".to_string(), series(&|i| 5.0 + 0.05 * i + 0.3 * (0.37 * i).cos())),
        ("price".to_string(), series(&|i| 100.0 + i + 5.0 * (0.2 * i).sin())),
        ("infl".to_string(), series(&|i| 0.002 + 0.001 * (0.5 * i).cos() + 0.0005 * (1.3 * i).sin())),
        ("lty".to_string(), series(&lty)),
        ("ntis".to_string(), series(&|i| 0.01 * (0.23 * i).cos() + 0.002 * (2.1 * i).sin())),
        ("tbl".to_string(), series(&|i| 0.04 + 0.01 * (0.07 * i).cos())),
        ("dfy".to_string(), series(&|i| 0.01 + 0.002 * (0.9 * i).sin())),
        ("ret".to_string(), series(&ret)),
        ("retx".to_string(), series(&|i| ret(i) - 0.002)),
    ];
    columns.extend(
        SPARSE_MONTHLY_COLUMNS
            .iter()
            .map(|name| (name.to_string(), vec![None; n])),
    );
    PredictorPanel::from_columns(monthly_periods(1949, n), columns).unwrap()
}

fn small_config() -> AnalysisConfig {
    AnalysisConfig {
        start: 195001,
        baseline_end: 195412,
        extended_end: 195414,
        ..Default::default()
    }
}

#[test]
fn test_baseline_table_leads_the_return() {
    let panel = synthetic_panel();
    let study = baseline_study(&panel, &small_config()).unwrap();

    // 60 sample months, the first 11 lack a full inflation window
    assert_eq!(study.table.height(), 49);
    assert_eq!(study.table.span().unwrap(), Some((195012, 195412)));
    assert_eq!(
        study.table.column_names(),
        vec!["ep", "infl12", "lty", "ntis", "ret"]
    );

    let all_periods = panel.periods().unwrap();
    let raw_ret = panel.values("ret").unwrap();
    let ret = study.table.values("ret").unwrap();
    for (row, period) in study.table.periods().unwrap().iter().enumerate() {
        let t = all_periods.iter().position(|p| p == period).unwrap();
        assert_eq!(ret[row], raw_ret[t + 1]);
    }
}

#[test]
fn test_baseline_panel_keeps_every_column() {
    let panel = synthetic_panel();
    let sample = PeriodRange::between(195001, 195412).unwrap();
    let enriched = baseline_panel(&panel, &small_config(), sample).unwrap();

    // every sample month has a following return
    assert_eq!(enriched.height(), 60);
    assert!(enriched.has_column("ep"));
    assert!(enriched.has_column("infl12"));
    assert!(enriched.has_column("tbl"));
    assert_eq!(enriched.column_names().last().map(String::as_str), Some("ret"));
    assert_eq!(enriched.values("infl12").unwrap()[10], None);
}

#[test]
fn test_baseline_formula_and_matrix_fits_agree() {
    let study = baseline_study(&synthetic_panel(), &small_config()).unwrap();
    assert_eq!(study.formula_fits.len(), 2);

    let formula = &study.formula_fits[1].results;
    let matrix = &study.matrix_fit.results;
    assert_eq!(formula.statistics().nobs, 49);
    assert_eq!(matrix.statistics().nobs, 49);

    for name in ["ep", "infl12", "lty", "ntis"] {
        assert_abs_diff_eq!(
            formula.param(name).unwrap(),
            matrix.param(name).unwrap(),
            epsilon = 1e-8
        );
    }
    assert_abs_diff_eq!(
        formula.param(INTERCEPT_NAME).unwrap(),
        matrix.param(CONSTANT_NAME).unwrap(),
        epsilon = 1e-8
    );
    assert_abs_diff_eq!(formula.rsquared(), matrix.rsquared(), epsilon = 1e-10);
}

#[test]
fn test_baseline_screen_retains_exactly_the_strong_predictors() {
    let study = baseline_study(&synthetic_panel(), &small_config()).unwrap();

    let expected: Vec<String> = study
        .correlations
        .iter()
        .filter(|(_, rho)| rho.abs() > study.threshold)
        .map(|(name, _)| name.to_string())
        .collect();
    assert_eq!(study.retained, expected);
    assert!(study.retained.contains(&"lty".to_string()));

    let mut fitted: Vec<String> = study.retained.clone();
    fitted.push(CONSTANT_NAME.to_string());
    let mut names = study.screened_fit.results.names().to_vec();
    names.sort();
    fitted.sort();
    assert_eq!(names, fitted);
}

#[test]
fn test_empty_screen_leaves_constant_only_fit() {
    let config = AnalysisConfig {
        baseline_threshold: 0.99,
        ..small_config()
    };
    let study = baseline_study(&synthetic_panel(), &config).unwrap();

    assert!(study.retained.is_empty());
    assert_eq!(study.screened_fit.results.names(), [CONSTANT_NAME]);

    let ret: Vec<f64> = study
        .table
        .values("ret")
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    let mean = ret.iter().sum::<f64>() / ret.len() as f64;
    assert_abs_diff_eq!(
        study.screened_fit.results.param(CONSTANT_NAME).unwrap(),
        mean,
        epsilon = 1e-12
    );
}

#[test]
fn test_sample_outside_panel_is_empty() {
    let config = AnalysisConfig {
        start: 196001,
        baseline_end: 196012,
        extended_end: 196012,
        ..Default::default()
    };
    let err = baseline_study(&synthetic_panel(), &config).unwrap_err();
    assert!(matches!(err, StudyError::EmptySample(_)));
}

#[test]
fn test_kitchen_sink_regressors_and_screen() {
    let study = kitchen_sink_study(&synthetic_panel(), &small_config()).unwrap();

    // 195414 is not a real month, so the sample runs through 195412
    assert_eq!(study.table.span().unwrap(), Some((195012, 195412)));
    assert_eq!(
        study.regressors,
        vec!["e12", "infl", "lty", "ntis", "tbl", "dfy", "infl12"]
    );
    for name in SPARSE_MONTHLY_COLUMNS {
        assert!(!study.table.has_column(name));
    }
    assert!(!study.regressors.contains(&"ep".to_string()));

    let full = &study.full_fit.results;
    assert_eq!(full.names().len(), study.regressors.len() + 1);
    assert_eq!(full.statistics().df_resid, 49.0 - 8.0);

    for (name, rho) in study.correlations.iter() {
        assert_eq!(study.retained.iter().any(|r| r == name), rho.abs() > study.threshold);
    }
    let k = study.retained.len();
    assert_eq!(study.retained_correlation.dim(), (k, k));
    for i in 0..k {
        assert_abs_diff_eq!(study.retained_correlation[[i, i]], 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_reports_carry_every_section() {
    let panel = synthetic_panel();
    let config = small_config();

    let baseline = baseline_study(&panel, &config).unwrap().report();
    assert_eq!(baseline.sections.len(), 5);
    assert!(baseline.section("Formula fit: ret ~ ep + infl12").is_some());
    assert!(baseline.section("Correlation screen").is_some());
    assert!(baseline.to_string().contains("[195001:195412]"));

    let study = kitchen_sink_study(&panel, &config).unwrap();
    let extended = study.report();
    assert_eq!(extended.sections.len(), 4);
    let retained = extended
        .section("Correlation among retained predictors")
        .unwrap();
    assert_eq!(
        retained.body.contains("Strongest pair:"),
        study.retained.len() >= 2
    );
}
