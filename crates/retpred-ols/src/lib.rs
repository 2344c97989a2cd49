#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retpred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod correlation;
pub mod covariance;
pub mod design;
pub mod error;
pub mod formula;
pub mod linalg;
pub mod model;

pub use correlation::{CorrelationVector, corr_with, correlation_matrix, pearson};
pub use covariance::CovarianceType;
pub use design::{CONSTANT_NAME, Design, Target, add_constant};
pub use error::OlsError;
pub use formula::{Formula, INTERCEPT_NAME, ols_formula};
pub use model::{Coefficient, FitStatistics, OlsModel, OlsResults, ResidualDiagnostics};
