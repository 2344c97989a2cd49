//! retpred CLI binary.
//!
//! Runs the two study passes over a predictor workbook, or a single ad hoc
//! regression or correlation screen.

use clap::{Args, Parser, Subcommand, ValueEnum};
use retpred::{AnalysisConfig, baseline_panel, baseline_study, kitchen_sink_study};
use retpred_data::{PeriodRange, PredictorPanel, load_panel};
use retpred_ols::{CovarianceType, Design, Formula, Target, corr_with};
use retpred_output::{CorrelationTable, RegressionSummary};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "retpred")]
#[command(about = "Monthly equity return predictability with OLS", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the baseline and kitchen-sink passes
    Run {
        /// Predictor workbook or CSV export
        path: PathBuf,

        /// Workbook sheet (overrides the configuration)
        #[arg(long)]
        sheet: Option<String>,

        /// JSON analysis configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Which pass to run
        #[arg(long, value_enum, default_value = "both")]
        pass: Pass,

        #[command(flatten)]
        cov: CovArgs,
    },

    /// Fit one formula on the baseline feature table
    Ols {
        /// Predictor workbook or CSV export
        path: PathBuf,

        /// Model formula, e.g. "ret ~ ep + infl12"
        #[arg(long)]
        formula: String,

        #[command(flatten)]
        table: TableArgs,

        #[command(flatten)]
        cov: CovArgs,
    },

    /// Correlate predictors with the next-month return
    Corr {
        /// Predictor workbook or CSV export
        path: PathBuf,

        /// Predictors, comma separated (default: the baseline predictors)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Retain predictors with |rho| above this value, in [0, 1)
        #[arg(long, value_parser = parse_threshold)]
        threshold: Option<f64>,

        #[command(flatten)]
        table: TableArgs,
    },
}

/// Options shared by commands working on the baseline feature table.
#[derive(Debug, Args)]
struct TableArgs {
    /// Workbook sheet (overrides the configuration)
    #[arg(long)]
    sheet: Option<String>,

    /// JSON analysis configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// First period, YYYYMM (default: configured start)
    #[arg(long)]
    start: Option<i64>,

    /// Last period, YYYYMM (default: configured baseline end)
    #[arg(long)]
    end: Option<i64>,
}

impl TableArgs {
    fn load(&self, path: &Path) -> Result<(AnalysisConfig, PredictorPanel), Box<dyn Error>> {
        let config = load_config(self.config.as_deref(), self.sheet.clone())?;
        let sample = PeriodRange::between(
            self.start.unwrap_or(config.start),
            self.end.unwrap_or(config.baseline_end),
        )?;
        let panel = load_panel(path, &config.sheet)?;
        let table = baseline_panel(&panel, &config, sample)?;
        info!(sample = %sample, rows = table.height(), "baseline feature table");
        Ok((config, table))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pass {
    Baseline,
    Extended,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CovArg {
    Nonrobust,
    Hc0,
    Hac,
}

/// Covariance options shared by `run` and `ols`.
#[derive(Debug, Args)]
struct CovArgs {
    /// Covariance estimator (default: the configured one, nonrobust)
    #[arg(long, value_enum)]
    cov_type: Option<CovArg>,

    /// HAC lag truncation (requires --cov-type hac)
    #[arg(long, requires = "cov_type")]
    lags: Option<usize>,

    /// Scale HAC errors by n/(n-k) (requires --cov-type hac)
    #[arg(long, requires = "cov_type")]
    hac_correction: bool,
}

impl CovArgs {
    /// Requested estimator, or `None` when `--cov-type` was not given.
    fn resolve(&self) -> Result<Option<CovarianceType>, String> {
        let hac_options = self.lags.is_some() || self.hac_correction;
        match (self.cov_type, hac_options) {
            (Some(CovArg::Hac), _) => Ok(Some(CovarianceType::Hac {
                lags: self.lags,
                correction: self.hac_correction,
            })),
            (_, true) => Err("--lags and --hac-correction require --cov-type hac".to_string()),
            (Some(CovArg::Nonrobust), false) => Ok(Some(CovarianceType::NonRobust)),
            (Some(CovArg::Hc0), false) => Ok(Some(CovarianceType::HC0)),
            (None, false) => Ok(None),
        }
    }
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|e| format!("invalid threshold '{value}': {e}"))?;
    if (0.0..1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must lie in [0, 1), got {value}"))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Run {
            path,
            sheet,
            config,
            pass,
            cov,
        } => {
            let mut config = load_config(config.as_deref(), sheet)?;
            if let Some(cov_type) = cov.resolve()? {
                config.cov_type = cov_type;
            }
            run_studies(&path, &config, pass)?;
        }
        Commands::Ols {
            path,
            formula,
            table,
            cov,
        } => {
            let cov_type = cov.resolve()?.unwrap_or_default();
            let (_, panel) = table.load(&path)?;
            let formula: Formula = formula.parse()?;
            let results = formula.to_model(&panel)?.fit_with(cov_type)?;

            let mut summary =
                RegressionSummary::from_results(&results).with_formula(formula.to_string());
            let used = panel.select(&formula.columns())?.drop_incomplete()?;
            if let Some((first, last)) = used.span()? {
                summary = summary.with_sample(format!("[{first}:{last}]"));
            }
            print!("{}", summary);
        }
        Commands::Corr {
            path,
            columns,
            threshold,
            table,
        } => {
            let (config, panel) = table.load(&path)?;
            let columns = if columns.is_empty() {
                config.baseline_predictors.clone()
            } else {
                columns
            };
            let mut keep = columns.clone();
            keep.push(config.target.clone());
            let complete = panel.select(&keep)?.drop_incomplete()?;

            let design = Design::from_panel(&complete, &columns)?;
            let target = Target::from_panel(&complete, &config.target)?;
            let correlations = corr_with(&design, &target)?;
            print!("{}", CorrelationTable::new(&correlations, threshold));
        }
    }

    Ok(())
}

fn load_config(
    path: Option<&Path>,
    sheet: Option<String>,
) -> Result<AnalysisConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(file) => AnalysisConfig::from_json_file(file)?,
        None => AnalysisConfig::default(),
    };
    if let Some(sheet) = sheet {
        config.sheet = sheet;
    }
    config.validate()?;
    Ok(config)
}

fn run_studies(path: &Path, config: &AnalysisConfig, pass: Pass) -> Result<(), Box<dyn Error>> {
    let panel = load_panel(path, &config.sheet)?;
    info!(
        path = %path.display(),
        rows = panel.height(),
        columns = panel.column_names().len(),
        cov_type = %config.cov_type,
        "loaded predictor panel"
    );

    if matches!(pass, Pass::Baseline | Pass::Both) {
        let study = baseline_study(&panel, config)?;
        println!("{}", study.report());
    }
    if matches!(pass, Pass::Extended | Pass::Both) {
        let study = kitchen_sink_study(&panel, config)?;
        println!("{}", study.report());
    }
    Ok(())
}
