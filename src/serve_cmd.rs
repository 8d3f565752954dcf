use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ServeArgs;
use crate::config::LandtrendConfig;
use crate::convert::{body_limit_bytes, build_app_state, listen_addr};
use crate::server;

pub fn run(args: ServeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LandtrendConfig::default(),
    };

    let state = build_app_state(&config)?;
    let body_limit = body_limit_bytes(&config.server)?;
    let (host, port) = listen_addr(&config.server, args.host.as_deref(), args.port);
    info!(
        max_pixels = state.raster.max_pixels(),
        sample_cap = state.classify.sample_cap(),
        n_trees = state.classify.n_trees(),
        body_limit,
        "configuration loaded"
    );

    let app = server::router(Arc::new(state), body_limit);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(server::serve(app, &host, port))
}

fn load_config(path: &Path) -> Result<LandtrendConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}
