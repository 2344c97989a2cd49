//! The two study passes.
//!
//! Both passes build a row-complete feature-target table in which every
//! predictor observed at `t` is paired with the return realized at `t + 1`,
//! fit OLS, screen predictors by their absolute correlation with the target
//! and re-fit on the survivors.
//!
//! Coefficients are estimated once over the whole sample. Nothing here
//! re-estimates month by month, so the reported fit is in-sample.

use crate::config::AnalysisConfig;
use ndarray::Array2;
use retpred_data::{DataError, PeriodRange, PredictorPanel};
use retpred_features::{
    EarningsPriceFeature, FeatureError, TrailingMeanFeature, align_next_period_target,
    apply_features, prune_columns,
};
use retpred_ols::{
    CorrelationVector, Design, OlsError, OlsModel, OlsResults, Target, add_constant, corr_with,
    correlation_matrix, ols_formula,
};
use retpred_output::{
    CorrelationMatrixTable, CorrelationTable, RegressionSummary, Report, ReportBuilder,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by a study pass
#[derive(Debug, Error)]
pub enum StudyError {
    /// Panel error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Feature construction error
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Regression error
    #[error("Regression error: {0}")]
    Ols(#[from] OlsError),

    /// No complete rows survived in the sample
    #[error("No complete observations in {0}")]
    EmptySample(PeriodRange),
}

/// One fitted regression with a human-readable label.
#[derive(Debug, Clone)]
pub struct FittedModel {
    /// What the model is, e.g. the formula or "screened predictors"
    pub label: String,
    /// Formula the model came from, for formula-style fits
    pub formula: Option<String>,
    /// Fitted results
    pub results: OlsResults,
}

impl FittedModel {
    fn summary(&self, sample: PeriodRange) -> RegressionSummary {
        let summary = RegressionSummary::from_results(&self.results)
            .with_title(format!("OLS Regression Results: {}", self.label))
            .with_sample(sample.to_string());
        match &self.formula {
            Some(formula) => summary.with_formula(formula.clone()),
            None => summary,
        }
    }
}

/// Output of [`baseline_study`].
#[derive(Debug, Clone)]
pub struct BaselineStudy {
    /// Requested sample
    pub sample: PeriodRange,
    /// Row-complete feature-target table
    pub table: PredictorPanel,
    /// Formula-style fits, in configuration order
    pub formula_fits: Vec<FittedModel>,
    /// Matrix-style fit on every baseline predictor plus a constant
    pub matrix_fit: FittedModel,
    /// Correlation of each baseline predictor with the target
    pub correlations: CorrelationVector,
    /// Screening threshold on `|rho|`
    pub threshold: f64,
    /// Predictors passing the screen, in column order
    pub retained: Vec<String>,
    /// Fit on the retained predictors plus a constant
    pub screened_fit: FittedModel,
}

/// Output of [`kitchen_sink_study`].
#[derive(Debug, Clone)]
pub struct KitchenSinkStudy {
    /// Requested sample
    pub sample: PeriodRange,
    /// Row-complete feature-target table
    pub table: PredictorPanel,
    /// Every candidate regressor
    pub regressors: Vec<String>,
    /// Fit on every candidate plus a constant
    pub full_fit: FittedModel,
    /// Correlation of each candidate with the target
    pub correlations: CorrelationVector,
    /// Screening threshold on `|rho|`
    pub threshold: f64,
    /// Candidates passing the screen, in column order
    pub retained: Vec<String>,
    /// Fit on the retained candidates plus a constant
    pub screened_fit: FittedModel,
    /// Pairwise correlations of the retained candidates
    pub retained_correlation: Array2<f64>,
}

/// Baseline pass: a handful of classic predictors over `[start:baseline_end]`.
///
/// 1. build the [`baseline_panel`] over the sample
/// 2. keep the baseline predictors and the target, drop incomplete rows
/// 3. fit each configured formula, then the matrix-style model on all
///    baseline predictors
/// 4. screen predictors by `|rho| > baseline_threshold` and re-fit
pub fn baseline_study(
    panel: &PredictorPanel,
    config: &AnalysisConfig,
) -> Result<BaselineStudy, StudyError> {
    let sample = PeriodRange::between(config.start, config.baseline_end)?;
    let mut keep = config.baseline_predictors.clone();
    keep.push(config.target.clone());
    let table = baseline_panel(panel, config, sample)?
        .select(&keep)?
        .drop_incomplete()?;
    ensure_rows(&table, sample)?;
    let span = table.span()?;
    info!(
        sample = %sample,
        rows = table.height(),
        ?span,
        "baseline feature table ready"
    );

    let formula_fits = config
        .baseline_formulas
        .iter()
        .map(|formula| {
            let results = ols_formula(formula, &table)?.fit_with(config.cov_type)?;
            Ok(FittedModel {
                label: formula.clone(),
                formula: Some(formula.clone()),
                results,
            })
        })
        .collect::<Result<Vec<_>, StudyError>>()?;

    let design = Design::from_panel(&table, &config.baseline_predictors)?;
    let target = Target::from_panel(&table, &config.target)?;
    let matrix_fit = fit_with_constant("baseline predictors", &design, &target, config)?;

    let (correlations, retained, screened_fit) =
        screen_and_refit(&design, &target, config.baseline_threshold, config)?;

    Ok(BaselineStudy {
        sample,
        table,
        formula_fits,
        matrix_fit,
        correlations,
        threshold: config.baseline_threshold,
        retained,
        screened_fit,
    })
}

/// Every panel column over `sample` plus `ep` and the trailing inflation
/// mean, with the target led by one period.
///
/// The lead is taken over the panel from the sample start onward, so the last
/// sample row keeps the return that follows it. Incomplete rows are kept;
/// callers select their columns and drop nulls.
pub fn baseline_panel(
    panel: &PredictorPanel,
    config: &AnalysisConfig,
    sample: PeriodRange,
) -> Result<PredictorPanel, StudyError> {
    let source = match sample.start() {
        Some(start) => panel.since(start)?,
        None => panel.clone(),
    };
    let window = source.range(sample)?;

    let ep = EarningsPriceFeature::with_config(config.earnings_price.clone());
    let inflation = TrailingMeanFeature::with_config(config.inflation.clone())?;
    let features = apply_features(&window, &[&ep, &inflation])?;
    Ok(align_next_period_target(&features, &source, &config.target)?)
}

/// Extended pass: every monthly predictor over `[start:extended_end]`.
///
/// 1. restrict the panel to `[start:]` (the return source) and the sample
/// 2. prune the sparse columns, add the trailing inflation mean
/// 3. lead the target from the return source, drop incomplete rows
/// 4. regress on every column except the excluded ones
/// 5. screen by `|rho| > extended_threshold`, re-fit, and report the
///    correlation matrix of the survivors
pub fn kitchen_sink_study(
    panel: &PredictorPanel,
    config: &AnalysisConfig,
) -> Result<KitchenSinkStudy, StudyError> {
    let source = panel.since(config.start)?;
    let sample = PeriodRange::between(config.start, config.extended_end)?;
    let window = source.range(sample)?;

    let pruned = prune_columns(&window, &config.sparse_columns)?;
    let inflation = TrailingMeanFeature::with_config(config.inflation.clone())?;
    let features = apply_features(&pruned, &[&inflation])?;

    let table =
        align_next_period_target(&features, &source, &config.target)?.drop_incomplete()?;
    ensure_rows(&table, sample)?;

    let regressors = table.drop(&config.excluded_regressors)?.column_names();
    info!(
        sample = %sample,
        rows = table.height(),
        regressors = regressors.len(),
        "extended feature table ready"
    );
    debug!(?regressors, "extended regressors");

    let design = Design::from_panel(&table, &regressors)?;
    let target = Target::from_panel(&table, &config.target)?;
    let full_fit = fit_with_constant("all monthly predictors", &design, &target, config)?;

    let (correlations, retained, screened_fit) =
        screen_and_refit(&design, &target, config.extended_threshold, config)?;
    let retained_correlation = correlation_matrix(&design.select(&retained)?);

    Ok(KitchenSinkStudy {
        sample,
        table,
        regressors,
        full_fit,
        correlations,
        threshold: config.extended_threshold,
        retained,
        screened_fit,
        retained_correlation,
    })
}

impl BaselineStudy {
    /// Render every fit and the correlation screen.
    pub fn report(&self) -> Report {
        let mut builder = ReportBuilder::new().title(format!("Baseline study {}", self.sample));
        for fit in &self.formula_fits {
            builder.push_section(format!("Formula fit: {}", fit.label), fit.summary(self.sample));
        }
        builder
            .section(
                "Matrix fit: baseline predictors with constant",
                self.matrix_fit.summary(self.sample),
            )
            .section(
                "Correlation screen",
                CorrelationTable::new(&self.correlations, Some(self.threshold)),
            )
            .section("Screened fit", self.screened_fit.summary(self.sample))
            .build()
    }
}

impl KitchenSinkStudy {
    /// Render the full fit, the screen, the re-fit and the retained correlations.
    pub fn report(&self) -> Report {
        ReportBuilder::new()
            .title(format!("Kitchen-sink study {}", self.sample))
            .section(
                "Full fit: all monthly predictors",
                self.full_fit.summary(self.sample),
            )
            .section(
                "Correlation screen",
                CorrelationTable::new(&self.correlations, Some(self.threshold)),
            )
            .section("Screened fit", self.screened_fit.summary(self.sample))
            .section(
                "Correlation among retained predictors",
                CorrelationMatrixTable::new(
                    self.retained.clone(),
                    self.retained_correlation.clone(),
                ),
            )
            .build()
    }
}

fn ensure_rows(table: &PredictorPanel, sample: PeriodRange) -> Result<(), StudyError> {
    if table.is_empty() {
        return Err(StudyError::EmptySample(sample));
    }
    Ok(())
}

fn fit_with_constant(
    label: &str,
    design: &Design,
    target: &Target,
    config: &AnalysisConfig,
) -> Result<FittedModel, StudyError> {
    let model = OlsModel::new(target.clone(), add_constant(design)?)?;
    let results = model.fit_with(config.cov_type)?;
    Ok(FittedModel {
        label: label.to_string(),
        formula: None,
        results,
    })
}

/// Screen `design` by `|rho| > threshold` and re-fit on the survivors.
///
/// An empty survivor set leaves a constant-only model.
fn screen_and_refit(
    design: &Design,
    target: &Target,
    threshold: f64,
    config: &AnalysisConfig,
) -> Result<(CorrelationVector, Vec<String>, FittedModel), StudyError> {
    let correlations = corr_with(design, target)?;
    let retained: Vec<String> = correlations
        .above(threshold)
        .names()
        .into_iter()
        .map(String::from)
        .collect();
    info!(
        threshold,
        candidates = correlations.len(),
        retained = retained.len(),
        "correlation screen"
    );

    let label = if retained.is_empty() {
        "constant only (no predictor passed the screen)".to_string()
    } else {
        format!("|rho| > {threshold}")
    };
    let screened_fit = fit_with_constant(&label, &design.select(&retained)?, target, config)?;
    Ok((correlations, retained, screened_fit))
}
