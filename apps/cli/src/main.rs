#![deny(warnings)]

//! Headless CLI: runs the dashboard handlers against the resort table and
//! prints their outputs as JSON.
//!
//! ```text
//! ski-atlas [--config FILE] [--data FILE] summary
//! ski-atlas map [--max-price N] [--summer] [--night] [--snowparks] [--continent NAME]
//! ski-atlas country [--continent NAME] [--country NAME] [--metric NAME] [--hovered RESORT]
//! ```

use anyhow::{bail, Context, Result};
use atlas_core::{DashboardConfig, Metric, ResortTable};
use atlas_query::MapFilter;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    command: Option<String>,
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    max_price: Option<f64>,
    summer: bool,
    night: bool,
    snowparks: bool,
    continent: Option<String>,
    country: Option<String>,
    metric: Option<String>,
    hovered: Option<String>,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--config" => out.config = Some(value("--config")?.into()),
            "--data" => out.data = Some(value("--data")?.into()),
            "--max-price" => {
                let raw = value("--max-price")?;
                out.max_price = Some(raw.parse().with_context(|| format!("bad price: {raw}"))?);
            }
            "--summer" => out.summer = true,
            "--night" => out.night = true,
            "--snowparks" => out.snowparks = true,
            "--continent" => out.continent = Some(value("--continent")?),
            "--country" => out.country = Some(value("--country")?),
            "--metric" => out.metric = Some(value("--metric")?),
            "--hovered" => out.hovered = Some(value("--hovered")?),
            "--version" | "-V" => out.version = true,
            cmd @ ("summary" | "map" | "country") if out.command.is_none() => {
                out.command = Some(cmd.to_string())
            }
            other => bail!("unexpected argument: {other}"),
        }
    }
    Ok(out)
}

#[derive(Serialize)]
struct ContinentSummary {
    continent: String,
    countries: Vec<String>,
}

#[derive(Serialize)]
struct Summary {
    resorts: usize,
    continents: Vec<ContinentSummary>,
    metrics: Vec<Metric>,
}

fn summary(table: &ResortTable) -> Summary {
    let continents = atlas_query::continent_options(table)
        .into_iter()
        .map(|continent| ContinentSummary {
            countries: atlas_query::country_options(table, &continent),
            continent,
        })
        .collect();
    Summary {
        resorts: table.len(),
        continents,
        metrics: atlas_query::metric_options(table),
    }
}

fn run(args: Args, cfg: &DashboardConfig, table: &ResortTable) -> Result<String> {
    let defaults = &cfg.defaults;
    let json = match args.command.as_deref().unwrap_or("summary") {
        "map" => {
            let filter = MapFilter {
                max_price: args.max_price.unwrap_or(defaults.max_price),
                summer_only: args.summer,
                night_only: args.night,
                snowpark_only: args.snowparks,
            };
            let continent = args.continent.as_deref().unwrap_or(&defaults.continent);
            let view = atlas_view::map_view(table, &filter, cfg.feature_policy, continent);
            serde_json::to_string_pretty(&view)?
        }
        "country" => {
            let metric = match args.metric.as_deref() {
                Some(name) => atlas_query::parse_metric(table, name)?,
                None => defaults.metric,
            };
            let panel = atlas_view::country_panel(
                table,
                args.continent.as_deref().unwrap_or(&defaults.continent),
                args.country.as_deref().unwrap_or(&defaults.country),
                metric,
                args.hovered.as_deref().unwrap_or(&defaults.hovered_resort),
            );
            serde_json::to_string_pretty(&panel)?
        }
        _ => serde_json::to_string_pretty(&summary(table))?,
    };
    Ok(json)
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "ski-atlas {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(command = ?args.command, "starting CLI");

    let mut cfg = DashboardConfig::discover(args.config.as_deref())?;
    if let Some(data) = &args.data {
        cfg.data_path = data.clone();
    }
    let table = data_pipeline::load(&cfg.data_path)
        .with_context(|| format!("loading {}", cfg.data_path.display()))?;

    println!("{}", run(args, &cfg, &table)?);
    Ok(())
}
