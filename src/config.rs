use serde::Deserialize;

/// Top-level landtrend configuration.
///
/// Every section is optional; a missing file or section means defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandtrendConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerToml,

    /// Raster ingestion settings.
    #[serde(default)]
    pub raster: RasterToml,

    /// ARIMA order search settings.
    #[serde(default)]
    pub arima: ArimaToml,

    /// Spatial classifier settings.
    #[serde(default)]
    pub classify: ClassifyToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerToml {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl Default for ServerToml {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_body_limit_mb() -> usize {
    256
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RasterToml {
    #[serde(default = "default_max_pixels")]
    pub max_pixels: usize,
}

impl Default for RasterToml {
    fn default() -> Self {
        Self {
            max_pixels: default_max_pixels(),
        }
    }
}

fn default_max_pixels() -> usize {
    1_000_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArimaToml {
    #[serde(default = "default_max_order")]
    pub max_p: usize,
    #[serde(default = "default_max_order")]
    pub max_q: usize,
    #[serde(default = "default_max_d")]
    pub max_d: usize,
}

impl Default for ArimaToml {
    fn default() -> Self {
        Self {
            max_p: default_max_order(),
            max_q: default_max_order(),
            max_d: default_max_d(),
        }
    }
}

fn default_max_order() -> usize {
    3
}
fn default_max_d() -> usize {
    2
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifyToml {
    #[serde(default = "default_sample_cap")]
    pub sample_cap: usize,
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    /// Fixed RNG seed; fresh entropy per request when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ClassifyToml {
    fn default() -> Self {
        Self {
            sample_cap: default_sample_cap(),
            n_trees: default_n_trees(),
            seed: None,
        }
    }
}

fn default_sample_cap() -> usize {
    10_000
}
fn default_n_trees() -> usize {
    100
}
