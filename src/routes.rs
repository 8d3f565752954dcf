//! Route handlers.
//!
//! Uploads are parsed on the async side; decoding and model fitting run on
//! the blocking pool. Every outcome is an [`Envelope`].

use std::sync::Arc;

use anyhow::{Context, bail};
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use landtrend_arima::{ArimaForecast, auto_arima};
use landtrend_classify::{Driver, forest_change, logistic_change};
use landtrend_io::{Raster, RasterConfig, SeriesColumns, extract_series, read_raster, read_table};
use landtrend_markov::{build_transition_matrix, project};
use landtrend_regression::{TrendForecast, TrendModel, forecast_trend};

use crate::envelope::{ApiError, Envelope};
use crate::server::AppState;

type ApiResult = Result<Envelope, ApiError>;

const DEFAULT_PERIODS: usize = 5;

/// One uploaded multipart file.
struct Upload {
    field: String,
    file_name: Option<String>,
    bytes: Bytes,
}

impl Upload {
    /// Client file name, or the form field when none was sent.
    fn label(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.field)
    }

    fn raster(&self, config: &RasterConfig) -> anyhow::Result<Raster> {
        let raster = read_raster(&self.bytes, config)
            .with_context(|| format!("failed to read raster {}", self.label()))?;
        let profile = raster.profile();
        if profile.is_downsampled() {
            info!(
                file = self.label(),
                from = %format!("{}x{}", profile.source_height, profile.source_width),
                to = %format!("{}x{}", profile.height, profile.width),
                "downsampled raster"
            );
        }
        Ok(raster)
    }
}

/// All files of a multipart body, in arrival order.
struct Uploads(Vec<Upload>);

impl Uploads {
    async fn collect(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut multipart = multipart?;
        let mut files = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            files.push(Upload {
                field: name,
                file_name,
                bytes,
            });
        }
        Ok(Self(files))
    }

    /// Removes the first file sent under any of `names`.
    fn take(&mut self, names: &[&str]) -> anyhow::Result<Upload> {
        match self.0.iter().position(|u| names.contains(&u.field.as_str())) {
            Some(i) => Ok(self.0.remove(i)),
            None => bail!("missing multipart field {:?}", names[0]),
        }
    }

    /// Removes every file sent under `name`.
    fn take_all(&mut self, name: &str) -> Vec<Upload> {
        let (hit, rest) = std::mem::take(&mut self.0)
            .into_iter()
            .partition(|u| u.field == name);
        self.0 = rest;
        hit
    }
}

async fn blocking<T, F>(job: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(job)
        .await
        .context("worker task failed")??)
}

fn read_drivers(uploads: &[Upload], config: &RasterConfig) -> anyhow::Result<Vec<Driver>> {
    uploads
        .iter()
        .map(|u| Ok(Driver::new(u.label(), u.raster(config)?.into_data())))
        .collect()
}

pub async fn index() -> Json<Value> {
    Json(json!({"message": "Land Use Trend & Target Analyzer API v2 is running"}))
}

#[derive(Serialize)]
struct MarkovInputs {
    matrix: Vec<Vec<f64>>,
    classes: Vec<i64>,
    counts: Vec<Vec<u64>>,
}

/// Transition matrix between two classified rasters (`file_t1`, `file_t2`).
pub async fn markov_inputs(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let mut uploads = Uploads::collect(multipart).await?;
    let t1 = uploads.take(&["file_t1"])?;
    let t2 = uploads.take(&["file_t2"])?;

    let matrix = blocking(move || {
        let a = t1.raster(&state.raster)?;
        let b = t2.raster(&state.raster)?;
        Ok(build_transition_matrix(a.data(), b.data())?)
    })
    .await?;
    info!(
        classes = matrix.n_classes(),
        pixels = matrix.n_pixels(),
        "built transition matrix"
    );

    Ok(Envelope::data(&MarkovInputs {
        matrix: matrix.probs().outer_iter().map(|r| r.to_vec()).collect(),
        classes: matrix.classes().to_vec(),
        counts: matrix.counts().outer_iter().map(|r| r.to_vec()).collect(),
    }))
}

/// Year and value columns of an uploaded CSV (`file`).
pub async fn csv_data(multipart: Result<Multipart, MultipartRejection>) -> ApiResult {
    let mut uploads = Uploads::collect(multipart).await?;
    let file = uploads.take(&["file"])?;

    let series: SeriesColumns = blocking(move || {
        let table = read_table(&file.bytes)
            .with_context(|| format!("failed to read table {}", file.label()))?;
        Ok(extract_series(&table)?)
    })
    .await?;
    info!(
        year_column = %series.year_column,
        value_column = %series.value_column,
        rows = series.years.len(),
        "extracted series"
    );
    Ok(Envelope::data(&series))
}

#[derive(Deserialize)]
pub struct MarkovRequest {
    matrix: Vec<Vec<f64>>,
    years_diff: i64,
    /// Class shares or areas at the start, propagated when present.
    #[serde(default)]
    initial_distribution: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct MarkovResponse {
    transition_matrix: Vec<Vec<f64>>,
    future_probability_matrix: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    future_distribution: Option<Vec<f64>>,
}

/// Normalises a matrix and raises it to `years_diff`.
pub async fn markov(payload: Result<Json<MarkovRequest>, JsonRejection>) -> ApiResult {
    let Json(req) = payload?;
    let projection = project(&req.matrix, req.years_diff)?;
    let future_distribution = req
        .initial_distribution
        .as_deref()
        .map(|initial| projection.distribute(initial))
        .transpose()?;
    info!(
        classes = projection.transition().nrows(),
        steps = projection.steps(),
        mode = ?projection.mode(),
        "projected transition matrix"
    );

    Ok(Envelope::success(&MarkovResponse {
        transition_matrix: projection
            .transition()
            .outer_iter()
            .map(|r| r.to_vec())
            .collect(),
        future_probability_matrix: projection
            .future()
            .outer_iter()
            .map(|r| r.to_vec())
            .collect(),
        future_distribution,
    }))
}

#[derive(Deserialize)]
pub struct RegressionRequest {
    years: Vec<i64>,
    values: Vec<f64>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    periods: Option<usize>,
}

/// Linear or exponential trend with 95% bands.
pub async fn regression(payload: Result<Json<RegressionRequest>, JsonRejection>) -> ApiResult {
    let Json(req) = payload?;
    let model = match req.kind.as_deref() {
        Some(name) => name.parse::<TrendModel>()?,
        None => TrendModel::default(),
    };
    let periods = req.periods.unwrap_or(DEFAULT_PERIODS);
    let fit: TrendForecast = forecast_trend(&req.years, &req.values, model, periods)?;
    info!(%model, n = req.years.len(), periods, "fitted trend");
    Ok(Envelope::success(&fit))
}

#[derive(Deserialize)]
pub struct ArimaRequest {
    data: Vec<f64>,
    periods: usize,
}

#[derive(Serialize)]
struct ArimaResponse {
    historical_data: Vec<f64>,
    #[serde(flatten)]
    forecast: ArimaForecast,
    order: [usize; 3],
    aic: Option<f64>,
}

/// Auto-ARIMA forecast of a univariate series.
pub async fn arima(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ArimaRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    let response = blocking(move || {
        let model = auto_arima(&req.data, &state.arima)?;
        let forecast = model.forecast(req.periods)?;
        let (p, d, q) = model.order();
        Ok(ArimaResponse {
            historical_data: req.data,
            forecast,
            order: [p, d, q],
            aic: model.aic(),
        })
    })
    .await?;
    info!(
        order = ?response.order,
        periods = response.forecast.forecast.len(),
        "fitted ARIMA"
    );
    Ok(Envelope::success(&response))
}

/// Logistic change model from `drivers` rasters and a `change_map`.
pub async fn logistic_spatial(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let mut uploads = Uploads::collect(multipart).await?;
    let change_map = uploads.take(&["change_map"])?;
    let drivers = uploads.take_all("drivers");

    let fit = blocking(move || {
        let labels = change_map.raster(&state.raster)?;
        let drivers = read_drivers(&drivers, &state.raster)?;
        Ok(logistic_change(&drivers, labels.data(), &state.classify)?)
    })
    .await?;
    info!(sampled = fit.probabilities.len(), "fitted logistic change model");
    Ok(Envelope::success(&fit))
}

/// Random-forest change model from `drivers` rasters and `labels`.
pub async fn randomforest_spatial(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let mut uploads = Uploads::collect(multipart).await?;
    let labels = uploads.take(&["labels", "change_map"])?;
    let drivers = uploads.take_all("drivers");

    let fit = blocking(move || {
        let labels = labels.raster(&state.raster)?;
        let drivers = read_drivers(&drivers, &state.raster)?;
        Ok(forest_change(&drivers, labels.data(), &state.classify)?)
    })
    .await?;
    info!(
        sampled = fit.probabilities.len(),
        drivers = fit.feature_importances.len(),
        "fitted random forest change model"
    );
    Ok(Envelope::success(&fit))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use landtrend_classify::ClassifyConfig;
    use tiff::encoder::{TiffEncoder, colortype::Gray32Float};
    use tower::ServiceExt;

    use super::*;
    use crate::server::router;

    const BOUNDARY: &str = "landtrend-test-boundary";

    fn app() -> Router {
        let state = AppState {
            raster: RasterConfig::default(),
            arima: Default::default(),
            classify: ClassifyConfig::default().with_n_trees(10).with_seed(Some(3)),
        };
        router(Arc::new(state), 16 * 1024 * 1024)
    }

    fn tiff(rows: usize, cols: usize, pixel: impl Fn(usize, usize) -> f32) -> Vec<u8> {
        let data: Vec<f32> = (0..rows * cols).map(|i| pixel(i / cols, i % cols)).collect();
        let mut buf = Vec::new();
        TiffEncoder::new(Cursor::new(&mut buf))
            .unwrap()
            .write_image::<Gray32Float>(cols as u32, rows as u32, &data)
            .unwrap();
        buf
    }

    fn multipart(uri: &str, parts: &[(&str, &str, Vec<u8>)]) -> Request<Body> {
        let mut body = Vec::new();
        for (field, file, bytes) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                     filename=\"{file}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(request: Request<Body>) -> Value {
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn floats(v: &Value) -> Vec<f64> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_f64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn index_reports_running() {
        let v = call(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(
            v["message"],
            "Land Use Trend & Target Analyzer API v2 is running"
        );
    }

    #[tokio::test]
    async fn linear_regression_succeeds() {
        let v = call(post_json(
            "/trend/regression",
            json!({
                "years": [2000, 2001, 2002, 2003, 2004],
                "values": [0.0, 10.0, 20.0, 30.0, 40.0],
                "type": "linear"
            }),
        ))
        .await;
        assert_eq!(v["status"], "success");
        assert!((v["slope"].as_f64().unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(v["future_years"], json!([2005, 2006, 2007, 2008, 2009]));
        assert_eq!(v["forecast"].as_array().unwrap().len(), DEFAULT_PERIODS);
        assert_eq!(v["conf_int"][0].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn two_point_regression_is_an_error_envelope() {
        let v = call(post_json(
            "/trend/regression",
            json!({"years": [2000, 2001], "values": [1.0, 2.0], "type": "linear"}),
        ))
        .await;
        assert_eq!(v["status"], "error");
        assert!(!v["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn huge_regression_horizon_is_an_error_envelope() {
        let v = call(post_json(
            "/trend/regression",
            json!({"years": [2000, 2001, 2002], "values": [1.0, 2.0, 3.0], "periods": u64::MAX}),
        ))
        .await;
        assert_eq!(v["status"], "error");
        let message = v["message"].as_str().unwrap();
        assert!(message.contains("periods must be at most 1000"), "{message}");
    }

    #[tokio::test]
    async fn malformed_json_is_an_error_envelope() {
        let request = Request::post("/trend/markov")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"matrix\": [[1, 0], "))
            .unwrap();
        let v = call(request).await;
        assert_eq!(v["status"], "error");
    }

    #[tokio::test]
    async fn markov_normalises_counts_and_projects() {
        let v = call(post_json(
            "/trend/markov",
            json!({
                "matrix": [[8.0, 2.0], [1.0, 9.0]],
                "years_diff": 2,
                "initial_distribution": [100.0, 0.0]
            }),
        ))
        .await;
        assert_eq!(v["status"], "success");
        let p = floats(&v["transition_matrix"][0]);
        assert!((p[0] - 0.8).abs() < 1e-12 && (p[1] - 0.2).abs() < 1e-12);
        // [0.8, 0.2] . [[0.8, 0.2], [0.1, 0.9]]
        let f = floats(&v["future_probability_matrix"][0]);
        assert!((f[0] - 0.66).abs() < 1e-12 && (f[1] - 0.34).abs() < 1e-12);
        let d = floats(&v["future_distribution"]);
        assert!((d[0] - 66.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn markov_rejects_negative_steps() {
        let v = call(post_json(
            "/trend/markov",
            json!({"matrix": [[1.0]], "years_diff": -1}),
        ))
        .await;
        assert_eq!(v["status"], "error");
        assert!(v.get("future_distribution").is_none());
    }

    #[tokio::test]
    async fn markov_rejects_steps_beyond_u32() {
        let v = call(post_json(
            "/trend/markov",
            json!({"matrix": [[1.0]], "years_diff": 5_000_000_000_i64}),
        ))
        .await;
        assert_eq!(v["status"], "error");
        let message = v["message"].as_str().unwrap();
        assert!(message.contains("too large"), "{message}");
    }

    #[tokio::test]
    async fn arima_extrapolates_linear_series() {
        let data: Vec<f64> = (0..20).map(|t| 5.0 + 2.0 * t as f64).collect();
        let v = call(post_json("/trend/arima", json!({"data": data, "periods": 3}))).await;
        assert_eq!(v["status"], "success");
        assert_eq!(v["order"], json!([0, 1, 0]));
        assert!(v["aic"].is_null());
        let forecast = floats(&v["forecast"]);
        assert_eq!(forecast.len(), 3);
        assert!((forecast[0] - 45.0).abs() < 1e-6);
        assert_eq!(floats(&v["historical_data"]), data);
    }

    #[tokio::test]
    async fn arima_too_short_is_an_error_envelope() {
        let v = call(post_json("/trend/arima", json!({"data": [1.0, 2.0], "periods": 3}))).await;
        assert_eq!(v["status"], "error");
    }

    #[tokio::test]
    async fn huge_arima_horizon_is_an_error_envelope() {
        let data: Vec<f64> = (0..20).map(|t| 5.0 + 2.0 * t as f64).collect();
        let v = call(post_json(
            "/trend/arima",
            json!({"data": data, "periods": u64::MAX}),
        ))
        .await;
        assert_eq!(v["status"], "error");
        let message = v["message"].as_str().unwrap();
        assert!(message.contains("periods must be at most 1000"), "{message}");
    }

    #[tokio::test]
    async fn markov_inputs_from_identical_rasters_is_identity() {
        let classes = tiff(4, 4, |r, _| (r % 2) as f32);
        let v = call(multipart(
            "/process/markov-inputs",
            &[
                ("file_t1", "t1.tif", classes.clone()),
                ("file_t2", "t2.tif", classes),
            ],
        ))
        .await;
        assert_eq!(v["status"], "success");
        assert_eq!(v["data"]["classes"], json!([0, 1]));
        assert_eq!(v["data"]["counts"], json!([[8, 0], [0, 8]]));
        assert_eq!(v["data"]["matrix"], json!([[1.0, 0.0], [0.0, 1.0]]));
    }

    #[tokio::test]
    async fn markov_inputs_shape_mismatch() {
        let v = call(multipart(
            "/process/markov-inputs",
            &[
                ("file_t1", "t1.tif", tiff(4, 4, |_, _| 1.0)),
                ("file_t2", "t2.tif", tiff(3, 4, |_, _| 1.0)),
            ],
        ))
        .await;
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().contains("do not match"));
    }

    #[tokio::test]
    async fn missing_field_is_reported() {
        let v = call(multipart(
            "/process/markov-inputs",
            &[("file_t1", "t1.tif", tiff(2, 2, |_, _| 0.0))],
        ))
        .await;
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().contains("file_t2"));
    }

    #[tokio::test]
    async fn csv_data_picks_year_and_area() {
        let csv = b"Region,Year,Area\nnorth,2000,1.5\nnorth,2001,2\n".to_vec();
        let v = call(multipart("/process/csv-data", &[("file", "areas.csv", csv)])).await;
        assert_eq!(v["status"], "success");
        assert_eq!(v["data"]["years"], json!([2000, 2001]));
        assert_eq!(v["data"]["values"], json!([1.5, 2]));
    }

    #[tokio::test]
    async fn driver_mismatch_names_the_driver() {
        let v = call(multipart(
            "/trend/logistic-spatial",
            &[
                ("drivers", "slope.tif", tiff(10, 10, |r, _| r as f32)),
                ("change_map", "change.tif", tiff(5, 5, |r, _| (r > 2) as u8 as f32)),
            ],
        ))
        .await;
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().contains("slope.tif"));
    }

    #[tokio::test]
    async fn logistic_spatial_returns_one_probability_per_pixel() {
        let v = call(multipart(
            "/trend/logistic-spatial",
            &[
                ("drivers", "dist.tif", tiff(8, 8, |r, c| (r + c) as f32)),
                ("drivers", "elev.tif", tiff(8, 8, |_, c| c as f32)),
                ("change_map", "change.tif", tiff(8, 8, |r, _| (r >= 4) as u8 as f32)),
            ],
        ))
        .await;
        assert_eq!(v["status"], "success");
        assert_eq!(v["coefficients"][0].as_array().unwrap().len(), 2);
        assert_eq!(v["intercept"].as_array().unwrap().len(), 1);
        let probs = floats(&v["probabilities"]);
        assert_eq!(probs.len(), 64);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[tokio::test]
    async fn randomforest_accepts_change_map_alias() {
        let v = call(multipart(
            "/trend/randomforest-spatial",
            &[
                ("drivers", "dist.tif", tiff(8, 8, |r, _| r as f32)),
                ("drivers", "noise.tif", tiff(8, 8, |r, c| ((r * 7 + c * 3) % 5) as f32)),
                ("change_map", "labels.tif", tiff(8, 8, |r, _| (r >= 4) as u8 as f32)),
            ],
        ))
        .await;
        assert_eq!(v["status"], "success");
        let importances = floats(&v["feature_importances"]);
        assert_eq!(importances.len(), 2);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(floats(&v["probabilities"]).len(), 64);
    }

    #[tokio::test]
    async fn spatial_without_drivers_is_an_error() {
        let v = call(multipart(
            "/trend/randomforest-spatial",
            &[("labels", "labels.tif", tiff(4, 4, |r, _| (r > 1) as u8 as f32))],
        ))
        .await;
        assert_eq!(v["status"], "error");
    }
}
