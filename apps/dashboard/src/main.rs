#![deny(warnings)]

//! Dashboard host: serves the map, country and options endpoints over HTTP.
//!
//! ```text
//! dashboard [--config FILE] [--data FILE] [--bind ADDR]
//! ```

mod routes;

use anyhow::{bail, Context, Result};
use atlas_core::DashboardConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    bind: Option<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--config" => out.config = Some(value("--config")?.into()),
            "--data" => out.data = Some(value("--data")?.into()),
            "--bind" => out.bind = Some(value("--bind")?),
            other => bail!("unexpected argument: {other}"),
        }
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args(std::env::args().skip(1))?;
    let mut cfg = DashboardConfig::discover(args.config.as_deref())?;
    if let Some(data) = args.data {
        cfg.data_path = data;
    }
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }

    // No table, no dashboard
    let table = data_pipeline::load(&cfg.data_path)
        .with_context(|| format!("loading {}", cfg.data_path.display()))?;
    let listener = tokio::net::TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    info!(bind = %cfg.bind, resorts = table.len(), policy = ?cfg.feature_policy, "dashboard listening");

    let state = routes::AppState::new(table, cfg);
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
