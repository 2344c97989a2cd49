#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retpred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod study;

// Re-export main types from sub-crates
pub use retpred_data as data;
pub use retpred_features as features;
pub use retpred_ols as ols;
pub use retpred_output as output;

pub use config::{AnalysisConfig, ConfigError};
pub use study::{
    BaselineStudy, FittedModel, KitchenSinkStudy, StudyError, baseline_panel, baseline_study,
    kitchen_sink_study,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
