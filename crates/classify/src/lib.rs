//! # landtrend-classify
//!
//! Per-pixel land-change probability from explanatory raster layers
//! ("drivers") and a binary change map.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["drivers + labels"] -->|"FeatureMatrix::stack"| B["pixels x drivers"]
//!     B -->|"sample_rows (cap 10 000)"| C["TrainingSet"]
//!     C -->|"LogisticRegression::fit"| D["LogisticChange"]
//!     C -->|"RandomForest::fit"| E["ForestChange"]
//! ```
//!
//! Labels are binarised (`> 0` is change). Probabilities are reported for
//! the sampled pixels the model was fitted on, in sample order.
//!
//! ## Example
//!
//! ```
//! use landtrend_classify::{ClassifyConfig, Driver, forest_change};
//! use ndarray::Array2;
//!
//! let labels = Array2::from_shape_fn((20, 20), |(r, _)| if r < 10 { 0.0 } else { 1.0 });
//! let drivers = vec![Driver::new("row", Array2::from_shape_fn((20, 20), |(r, _)| r as f64))];
//! let config = ClassifyConfig::default().with_n_trees(10).with_seed(Some(7));
//! let out = forest_change(&drivers, &labels, &config).unwrap();
//! assert_eq!(out.probabilities.len(), 400);
//! assert_eq!(out.feature_importances, vec![1.0]);
//! ```

mod config;
mod error;
mod features;
mod forest;
mod logistic;
mod spatial;
mod tree;

pub use config::ClassifyConfig;
pub use error::ClassifyError;
pub use features::{Driver, FeatureMatrix, TrainingSet, binarize_labels, sample_rows};
pub use forest::{ForestModel, RandomForest};
pub use logistic::{LogisticModel, LogisticRegression};
pub use spatial::{ForestChange, LogisticChange, forest_change, logistic_change};
