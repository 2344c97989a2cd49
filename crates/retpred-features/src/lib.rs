#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/retpred/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod earnings_price;
pub mod error;
pub mod pruning;
pub mod target;
pub mod trailing_mean;
pub mod traits;

pub use earnings_price::{EarningsPriceConfig, EarningsPriceFeature};
pub use error::FeatureError;
pub use pruning::{SPARSE_MONTHLY_COLUMNS, prune_columns};
pub use target::align_next_period_target;
pub use trailing_mean::{TrailingMeanConfig, TrailingMeanFeature};
pub use traits::{Feature, apply_features};
