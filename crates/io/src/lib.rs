//! # landtrend-io
//!
//! Decode uploaded files into in-memory data: single-band GeoTIFF rasters
//! into `ndarray::Array2<f64>` grids (downsampled to a pixel budget) and CSV
//! tables into typed columns. Works on byte slices only; nothing touches the
//! filesystem.

mod error;
mod raster;
mod series;
mod table;

pub use error::IoError;
pub use raster::{
    GeoTransform, Raster, RasterConfig, RasterProfile, check_same_shape, decimate, read_raster,
};
pub use series::{SeriesColumns, extract_series};
pub use table::{Cell, Column, Table, read_table};
