//! Single-band GeoTIFF decoding with nearest-neighbour downsampling.

use std::io::{Cursor, Read, Seek};

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::IoError;

const GDAL_NODATA: Tag = Tag::GdalNodata;
const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;

// ---------------------------------------------------------------------------
// RasterConfig
// ---------------------------------------------------------------------------

/// Configuration for raster ingestion.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    max_pixels: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_pixels: 1_000_000,
        }
    }
}

impl RasterConfig {
    /// Set the pixel budget above which rasters are downsampled.
    pub fn with_max_pixels(mut self, max_pixels: usize) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// Pixel budget.
    pub fn max_pixels(&self) -> usize {
        self.max_pixels
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.max_pixels == 0 {
            return Err(IoError::InvalidConfig {
                reason: "max_pixels must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Raster
// ---------------------------------------------------------------------------

/// Affine georeferencing of a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Negative for north-up rasters.
    pub pixel_height: f64,
}

/// Metadata describing a decoded raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterProfile {
    /// Columns after downsampling.
    pub width: usize,
    /// Rows after downsampling.
    pub height: usize,
    /// Columns in the file.
    pub source_width: usize,
    /// Rows in the file.
    pub source_height: usize,
    /// Sample type name as stored in the file (`u8`, `f32`, ...).
    pub dtype: &'static str,
    /// Value of the GDAL nodata tag, if present and numeric.
    pub nodata: Option<f64>,
    /// Georeferencing, rescaled to the downsampled grid.
    pub transform: Option<GeoTransform>,
}

impl RasterProfile {
    /// True when the grid was resampled to fit the pixel budget.
    pub fn is_downsampled(&self) -> bool {
        self.width != self.source_width || self.height != self.source_height
    }
}

/// First band of a raster file as a `rows x cols` grid.
#[derive(Debug, Clone)]
pub struct Raster {
    data: Array2<f64>,
    profile: RasterProfile,
}

impl Raster {
    /// Pixel values, row-major.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Raster metadata.
    pub fn profile(&self) -> &RasterProfile {
        &self.profile
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Consumes the raster, returning its grid.
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes the first band of a TIFF/GeoTIFF held in memory.
///
/// Rasters with more than [`RasterConfig::max_pixels`] pixels are shrunk by a
/// uniform factor `sqrt(max_pixels / pixels)` on both axes with
/// nearest-neighbour sampling (same grid as [`decimate`]). Sampling happens
/// while decoding: only strips or tiles holding a selected row are read, and
/// the full-resolution grid is never materialised.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`IoError::Tiff`] | bytes are not a readable TIFF |
/// | [`IoError::UnsupportedFormat`] | sample type has no numeric mapping |
/// | [`IoError::EmptyRaster`] | zero width or height |
/// | [`IoError::SampleCount`] | decoded samples do not tile the grid |
/// | [`IoError::InvalidConfig`] | `config` fails validation |
pub fn read_raster(bytes: &[u8], config: &RasterConfig) -> Result<Raster, IoError> {
    config.validate()?;

    let mut decoder = Decoder::new(Cursor::new(bytes))?.with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;
    if rows == 0 || cols == 0 {
        return Err(IoError::EmptyRaster { rows, cols });
    }

    let nodata = decoder
        .get_tag_ascii_string(GDAL_NODATA)
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse::<f64>().ok());
    let transform = read_geotransform(&mut decoder);

    let (out_rows, out_cols) = target_shape(rows, cols, config.max_pixels);
    if (out_rows, out_cols) != (rows, cols) {
        debug!(rows, cols, out_rows, out_cols, "downsampling raster to pixel budget");
    }
    let row_map: Vec<usize> = (0..out_rows)
        .map(|i| nearest_index(i, out_rows, rows))
        .collect();
    let col_map: Vec<usize> = (0..out_cols)
        .map(|j| nearest_index(j, out_cols, cols))
        .collect();

    let (values, dtype) = sample_chunks(&mut decoder, (rows, cols), &row_map, &col_map)?;
    let data =
        Array2::from_shape_vec((out_rows, out_cols), values).map_err(|_| IoError::SampleCount {
            rows,
            cols,
            got: out_rows * out_cols,
        })?;
    let transform = transform.map(|t| GeoTransform {
        pixel_width: t.pixel_width * cols as f64 / out_cols as f64,
        pixel_height: t.pixel_height * rows as f64 / out_rows as f64,
        ..t
    });

    let (height, width) = data.dim();
    debug!(width, height, dtype, "decoded raster");
    Ok(Raster {
        data,
        profile: RasterProfile {
            width,
            height,
            source_width: cols,
            source_height: rows,
            dtype,
            nodata,
            transform,
        },
    })
}

/// Checks that `got` has the same `(rows, cols)` as `expected`.
///
/// `name` identifies `got` in the error message.
pub fn check_same_shape(
    name: &str,
    expected: &Array2<f64>,
    got: &Array2<f64>,
) -> Result<(), IoError> {
    let (rows, cols) = expected.dim();
    let (got_rows, got_cols) = got.dim();
    if (rows, cols) != (got_rows, got_cols) {
        return Err(IoError::ShapeMismatch {
            name: name.to_string(),
            rows,
            cols,
            got_rows,
            got_cols,
        });
    }
    Ok(())
}

/// Nearest-neighbour resampling of `src` onto a `rows x cols` grid.
///
/// Output cell `(i, j)` takes the source cell containing its centre:
/// `floor((i + 0.5) * src_rows / rows)`.
pub fn decimate(src: &Array2<f64>, rows: usize, cols: usize) -> Array2<f64> {
    let (src_rows, src_cols) = src.dim();
    let row_map: Vec<usize> = (0..rows)
        .map(|i| nearest_index(i, rows, src_rows))
        .collect();
    let col_map: Vec<usize> = (0..cols)
        .map(|j| nearest_index(j, cols, src_cols))
        .collect();
    Array2::from_shape_fn((rows, cols), |(i, j)| src[[row_map[i], col_map[j]]])
}

fn nearest_index(dst: usize, dst_len: usize, src_len: usize) -> usize {
    let pos = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64;
    (pos as usize).min(src_len - 1)
}

/// Output shape for a `rows x cols` raster under a pixel budget.
fn target_shape(rows: usize, cols: usize, max_pixels: usize) -> (usize, usize) {
    let n_pixels = rows * cols;
    if n_pixels <= max_pixels {
        return (rows, cols);
    }
    let scale = (max_pixels as f64 / n_pixels as f64).sqrt();
    (
        ((rows as f64 * scale) as usize).max(1),
        ((cols as f64 * scale) as usize).max(1),
    )
}

/// Reads the first-band pixels at `row_map x col_map` into a row-major grid.
///
/// Both maps must be non-decreasing. Chunks (strips or tiles) with no
/// selected row or column are skipped.
fn sample_chunks<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    (rows, cols): (usize, usize),
    row_map: &[usize],
    col_map: &[usize],
) -> Result<(Vec<f64>, &'static str), IoError> {
    let (chunk_w, chunk_h) = decoder.chunk_dimensions();
    let (chunk_w, chunk_h) = (chunk_w as usize, chunk_h as usize);
    if chunk_w == 0 || chunk_h == 0 {
        return Err(IoError::SampleCount { rows, cols, got: 0 });
    }
    let across = cols.div_ceil(chunk_w);
    let down = rows.div_ceil(chunk_h);

    let out_cols = col_map.len();
    let mut out = vec![0.0; row_map.len() * out_cols];
    let mut dtype = None;
    let mut picks: Vec<(usize, usize)> = Vec::new();

    for cy in 0..down {
        let y0 = cy * chunk_h;
        let y1 = (y0 + chunk_h).min(rows);
        let (r_first, r_last) = (
            row_map.partition_point(|&r| r < y0),
            row_map.partition_point(|&r| r < y1),
        );
        if r_first == r_last {
            continue;
        }
        for cx in 0..across {
            let x0 = cx * chunk_w;
            let x1 = (x0 + chunk_w).min(cols);
            let (c_first, c_last) = (
                col_map.partition_point(|&c| c < x0),
                col_map.partition_point(|&c| c < x1),
            );
            if c_first == c_last {
                continue;
            }

            let index = u32::try_from(cy * across + cx)
                .map_err(|_| IoError::SampleCount { rows, cols, got: 0 })?;
            let chunk = decoder.read_chunk(index)?;
            let len = sample_len(&chunk);
            let (data_w, data_h) = decoder.chunk_data_dimensions(index);
            let data_pixels = data_w as usize * data_h as usize;
            // Edge tiles may come back padded to the full tile size.
            let (row_len, pixels) = if data_pixels > 0 && len % data_pixels == 0 {
                (data_w as usize, data_pixels)
            } else {
                (chunk_w, chunk_w * chunk_h)
            };
            if len == 0 || len % pixels != 0 {
                return Err(IoError::SampleCount {
                    rows,
                    cols,
                    got: len,
                });
            }
            // Interleaved multi-sample pixels: keep the first band.
            let stride = len / pixels;

            picks.clear();
            for i in r_first..r_last {
                for j in c_first..c_last {
                    let src = ((row_map[i] - y0) * row_len + (col_map[j] - x0)) * stride;
                    picks.push((i * out_cols + j, src));
                }
            }
            if picks.last().is_some_and(|&(_, src)| src >= len) {
                return Err(IoError::SampleCount {
                    rows,
                    cols,
                    got: len,
                });
            }
            dtype = Some(scatter(&chunk, &picks, &mut out)?);
        }
    }

    let dtype = dtype.ok_or(IoError::SampleCount { rows, cols, got: 0 })?;
    Ok((out, dtype))
}

fn sample_len(chunk: &DecodingResult) -> usize {
    match chunk {
        DecodingResult::U8(buf) => buf.len(),
        DecodingResult::U16(buf) => buf.len(),
        DecodingResult::U32(buf) => buf.len(),
        DecodingResult::U64(buf) => buf.len(),
        DecodingResult::I8(buf) => buf.len(),
        DecodingResult::I16(buf) => buf.len(),
        DecodingResult::I32(buf) => buf.len(),
        DecodingResult::I64(buf) => buf.len(),
        DecodingResult::F32(buf) => buf.len(),
        DecodingResult::F64(buf) => buf.len(),
        #[allow(unreachable_patterns)]
        _ => 0,
    }
}

/// Copies `chunk[src]` to `out[dst]` for every pick, returning the sample type name.
fn scatter(
    chunk: &DecodingResult,
    picks: &[(usize, usize)],
    out: &mut [f64],
) -> Result<&'static str, IoError> {
    fn copy<T: Copy>(buf: &[T], picks: &[(usize, usize)], out: &mut [f64], widen: fn(T) -> f64) {
        for &(dst, src) in picks {
            out[dst] = widen(buf[src]);
        }
    }

    let dtype = match chunk {
        DecodingResult::U8(buf) => {
            copy(buf, picks, out, f64::from);
            "u8"
        }
        DecodingResult::U16(buf) => {
            copy(buf, picks, out, f64::from);
            "u16"
        }
        DecodingResult::U32(buf) => {
            copy(buf, picks, out, f64::from);
            "u32"
        }
        DecodingResult::U64(buf) => {
            copy(buf, picks, out, |v| v as f64);
            "u64"
        }
        DecodingResult::I8(buf) => {
            copy(buf, picks, out, f64::from);
            "i8"
        }
        DecodingResult::I16(buf) => {
            copy(buf, picks, out, f64::from);
            "i16"
        }
        DecodingResult::I32(buf) => {
            copy(buf, picks, out, f64::from);
            "i32"
        }
        DecodingResult::I64(buf) => {
            copy(buf, picks, out, |v| v as f64);
            "i64"
        }
        DecodingResult::F32(buf) => {
            copy(buf, picks, out, f64::from);
            "f32"
        }
        DecodingResult::F64(buf) => {
            copy(buf, picks, out, |v| v);
            "f64"
        }
        #[allow(unreachable_patterns)]
        _ => {
            return Err(IoError::UnsupportedFormat(
                "unrecognised TIFF sample type".to_string(),
            ));
        }
    };
    Ok(dtype)
}

/// Reads ModelPixelScale + ModelTiepoint into a transform, if both exist.
fn read_geotransform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(MODEL_PIXEL_SCALE).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(MODEL_TIEPOINT).ok()?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    // tiepoint: [I, J, K, X, Y, Z]
    Some(GeoTransform {
        origin_x: tiepoint[3] - tiepoint[0] * scale[0],
        origin_y: tiepoint[4] + tiepoint[1] * scale[1],
        pixel_width: scale[0],
        pixel_height: -scale[1],
    })
}
