//! Driver stacking and pixel sampling.

use ndarray::{Array2, Axis};
use rand::Rng;
use tracing::debug;

use crate::error::ClassifyError;

/// A named explanatory raster layer.
#[derive(Debug, Clone)]
pub struct Driver {
    pub name: String,
    pub grid: Array2<f64>,
}

impl Driver {
    pub fn new(name: impl Into<String>, grid: Array2<f64>) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// Pixels × drivers matrix. Row `i` is pixel `i` of the row-major flattened
/// grid; column `j` is driver `j`.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    values: Array2<f64>,
    names: Vec<String>,
}

impl FeatureMatrix {
    /// Flattens each driver into a column.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ClassifyError::NoDrivers`] | `drivers` is empty |
    /// | [`ClassifyError::EmptyRaster`] | `label` has no pixels |
    /// | [`ClassifyError::DriverShapeMismatch`] | a driver's shape differs from `label` |
    pub fn stack(drivers: &[Driver], label: &Array2<f64>) -> Result<Self, ClassifyError> {
        if drivers.is_empty() {
            return Err(ClassifyError::NoDrivers);
        }
        if label.is_empty() {
            return Err(ClassifyError::EmptyRaster);
        }
        let (rows, cols) = label.dim();
        for driver in drivers {
            let (r, c) = driver.grid.dim();
            if (r, c) != (rows, cols) {
                return Err(ClassifyError::DriverShapeMismatch {
                    name: driver.name.clone(),
                    rows: r,
                    cols: c,
                    expected_rows: rows,
                    expected_cols: cols,
                });
            }
        }

        let values = Array2::from_shape_fn((rows * cols, drivers.len()), |(i, j)| {
            drivers[j].grid[[i / cols, i % cols]]
        });
        debug!(
            pixels = rows * cols,
            drivers = drivers.len(),
            "stacked driver rasters"
        );
        Ok(Self {
            values,
            names: drivers.iter().map(|d| d.name.clone()).collect(),
        })
    }

    pub fn n_pixels(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_drivers(&self) -> usize {
        self.values.ncols()
    }

    /// Driver names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

/// Flattens a label raster row-major, mapping values `> 0` to 1 and
/// everything else (including NaN) to 0.
pub fn binarize_labels(label: &Array2<f64>) -> Vec<u8> {
    label.iter().map(|&v| u8::from(v > 0.0)).collect()
}

/// Row indices to fit on: all of `0..n` when `n <= cap`, otherwise `cap`
/// distinct indices drawn uniformly without replacement.
pub fn sample_rows<R: Rng + ?Sized>(n: usize, cap: usize, rng: &mut R) -> Vec<usize> {
    if n > cap {
        rand::seq::index::sample(rng, n, cap).into_vec()
    } else {
        (0..n).collect()
    }
}

/// Sampled rows with their paired labels.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    /// `rows.len() × n_drivers`.
    pub x: Array2<f64>,
    pub y: Vec<u8>,
    /// Pixel index of each training row.
    pub rows: Vec<usize>,
}

impl TrainingSet {
    /// Selects `rows` from `features` and `labels`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ClassifyError::NonFiniteFeature`] | a selected driver value is NaN or infinite |
    /// | [`ClassifyError::SingleClass`] | the selected labels are all 0 or all 1 |
    pub fn select(
        features: &FeatureMatrix,
        labels: &[u8],
        rows: Vec<usize>,
    ) -> Result<Self, ClassifyError> {
        let x = features.values().select(Axis(0), &rows);
        for (r, row) in x.outer_iter().enumerate() {
            if let Some(driver) = row.iter().position(|v| !v.is_finite()) {
                return Err(ClassifyError::NonFiniteFeature {
                    driver,
                    pixel: rows[r],
                });
            }
        }

        let y: Vec<u8> = rows.iter().map(|&i| labels[i]).collect();
        let positives = y.iter().filter(|&&v| v == 1).count();
        if positives == 0 || positives == y.len() {
            return Err(ClassifyError::SingleClass {
                class: u8::from(positives > 0),
            });
        }
        Ok(Self { x, y, rows })
    }
}
