#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retpred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod correlation;
pub mod format;
pub mod report;
pub mod summary;

pub use correlation::{CorrelationMatrixTable, CorrelationTable};
pub use report::{Report, ReportBuilder, Section};
pub use summary::RegressionSummary;

/// Width of rendered tables, in characters.
pub const TABLE_WIDTH: usize = 80;
