//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use crate::config::*;
use crate::server::AppState;

use landtrend_arima::ArimaConfig;
use landtrend_classify::ClassifyConfig;
use landtrend_io::RasterConfig;

/// Builds a validated [`RasterConfig`] from the `[raster]` section.
pub fn build_raster_config(raster: &RasterToml) -> Result<RasterConfig> {
    let cfg = RasterConfig::default().with_max_pixels(raster.max_pixels);
    cfg.validate().context("invalid [raster] section")?;
    Ok(cfg)
}

/// Builds a validated [`ArimaConfig`] from the `[arima]` section.
pub fn build_arima_config(arima: &ArimaToml) -> Result<ArimaConfig> {
    let cfg = ArimaConfig::default()
        .with_max_p(arima.max_p)
        .with_max_q(arima.max_q)
        .with_max_d(arima.max_d);
    cfg.validate().context("invalid [arima] section")?;
    Ok(cfg)
}

/// Builds a validated [`ClassifyConfig`] from the `[classify]` section.
pub fn build_classify_config(classify: &ClassifyToml) -> Result<ClassifyConfig> {
    let cfg = ClassifyConfig::default()
        .with_sample_cap(classify.sample_cap)
        .with_n_trees(classify.n_trees)
        .with_seed(classify.seed);
    cfg.validate().context("invalid [classify] section")?;
    Ok(cfg)
}

/// Collects every per-request model setting into the shared handler state.
pub fn build_app_state(config: &LandtrendConfig) -> Result<AppState> {
    Ok(AppState {
        raster: build_raster_config(&config.raster)?,
        arima: build_arima_config(&config.arima)?,
        classify: build_classify_config(&config.classify)?,
    })
}

/// Converts `body_limit_mb` to bytes.
pub fn body_limit_bytes(server: &ServerToml) -> Result<usize> {
    if server.body_limit_mb == 0 {
        bail!("[server] body_limit_mb must be > 0");
    }
    server
        .body_limit_mb
        .checked_mul(1024 * 1024)
        .with_context(|| format!("[server] body_limit_mb too large: {}", server.body_limit_mb))
}

/// Resolves the listen address, letting CLI flags win over the config file.
pub fn listen_addr(server: &ServerToml, host: Option<&str>, port: Option<u16>) -> (String, u16) {
    let host = host.map_or_else(|| server.host.clone(), str::to_string);
    (host, port.unwrap_or(server.port))
}
