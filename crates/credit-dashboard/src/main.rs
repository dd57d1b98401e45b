//! credit-dashboard: render one firm's credit analysis pages from CSV exports.
//!
//! Usage:
//!   cargo run -p credit-dashboard
//!   cargo run -p credit-dashboard -- --page ratios --data ./exports/
//!   cargo run -p credit-dashboard -- --page summary --expand liquidity --full-reasoning
//!   cargo run -p credit-dashboard -- --page insights --search margin --json

mod config;
mod format;
mod pages;
mod state;

use anyhow::{Context, Result};
use credit_data::DataLoader;
use serde::Serialize;
use std::fmt::Display;

use crate::config::{CliArgs, DashboardConfig, Page};
use crate::pages::Dashboard;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the page, logs go to stderr
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("credit_dashboard=info,credit_data=info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("credit_dashboard=info,credit_data=info")),
            )
            .init();
    }

    let args: Vec<String> = std::env::args().collect();
    let cli = CliArgs::parse(args.get(1..).unwrap_or(&[]))?;

    let mut config = DashboardConfig::from_env().context("Failed to load dashboard configuration")?;
    if let Some(path) = &cli.data {
        config.data_path = path.clone();
    }
    tracing::info!(
        "Rendering {:?} page from {} (reasoning preview {} chars)",
        cli.page,
        config.data_path.display(),
        config.reasoning_preview
    );

    let store = DataLoader::new(&config.data_path).load();
    let dashboard = Dashboard::new(&store, &config);
    let state = cli.view_state();

    match cli.page {
        Page::Summary => emit(&dashboard.summary(&state)?, cli.json),
        Page::Ratios => emit(&dashboard.ratios()?, cli.json),
        Page::Financials => emit(&dashboard.financials(), cli.json),
        Page::Insights => emit(&dashboard.insights(cli.search.as_deref()), cli.json),
    }
}

fn emit<V: Serialize + Display>(view: &V, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        print!("{}", view);
    }
    Ok(())
}
