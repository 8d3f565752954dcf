//! Raster-in, probabilities-out entry points.

use ndarray::Array2;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::config::ClassifyConfig;
use crate::error::ClassifyError;
use crate::features::{Driver, FeatureMatrix, TrainingSet, binarize_labels, sample_rows};
use crate::forest::RandomForest;
use crate::logistic::LogisticRegression;

/// Logistic fit on sampled pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticChange {
    /// One row of weights, in driver order.
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    /// Class-1 probability of each sampled pixel.
    pub probabilities: Vec<f64>,
}

/// Random-forest fit on sampled pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestChange {
    /// Mean decrease in impurity per driver, summing to 1.
    pub feature_importances: Vec<f64>,
    /// Class-1 probability of each sampled pixel.
    pub probabilities: Vec<f64>,
}

fn prepare(
    drivers: &[Driver],
    labels: &Array2<f64>,
    config: &ClassifyConfig,
) -> Result<(TrainingSet, StdRng), ClassifyError> {
    config.validate()?;
    let features = FeatureMatrix::stack(drivers, labels)?;
    let binary = binarize_labels(labels);
    let mut rng = config.rng();
    let rows = sample_rows(features.n_pixels(), config.sample_cap(), &mut rng);
    info!(
        pixels = features.n_pixels(),
        sampled = rows.len(),
        drivers = features.n_drivers(),
        "prepared training pixels"
    );
    Ok((TrainingSet::select(&features, &binary, rows)?, rng))
}

/// Fits a logistic change model from driver rasters and a change map.
///
/// # Errors
///
/// Any [`ClassifyError`] from stacking, sampling or fitting.
pub fn logistic_change(
    drivers: &[Driver],
    change_map: &Array2<f64>,
    config: &ClassifyConfig,
) -> Result<LogisticChange, ClassifyError> {
    let (set, _) = prepare(drivers, change_map, config)?;
    let model = LogisticRegression::default().fit(&set.x, &set.y)?;
    let probabilities = model.predict_proba(&set.x);
    Ok(LogisticChange {
        coefficients: vec![model.coefficients],
        intercept: vec![model.intercept],
        probabilities,
    })
}

/// Fits a random-forest change model from driver rasters and labels.
///
/// # Errors
///
/// Any [`ClassifyError`] from stacking or sampling.
pub fn forest_change(
    drivers: &[Driver],
    labels: &Array2<f64>,
    config: &ClassifyConfig,
) -> Result<ForestChange, ClassifyError> {
    let (set, mut rng) = prepare(drivers, labels, config)?;
    let model = RandomForest::new(config.n_trees()).fit(&set.x, &set.y, &mut rng);
    Ok(ForestChange {
        feature_importances: model.feature_importances(),
        probabilities: model.predict_proba(&set.x),
    })
}
