#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retpred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod panel;
pub mod range;

pub use error::{DataError, Result};
pub use loader::{DEFAULT_SHEET, PanelFormat, load_panel};
pub use panel::{PERIOD_COLUMN, PredictorPanel};
pub use range::PeriodRange;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
