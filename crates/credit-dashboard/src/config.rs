use anyhow::{bail, Context, Result};
use credit_analysis::AspectWeights;
use credit_core::Aspect;
use credit_data::DEFAULT_DATA_PATH;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::state::ViewState;

pub const DEFAULT_REASONING_PREVIEW: usize = 200;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    // Aspect weights (must sum to 1.0)
    pub weights: AspectWeights,
    pub reasoning_preview: usize, // characters before "..."
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Weights are validated here so a bad
    /// setting stops the process before anything is rendered.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let weights = match lookup("CREDIT_ASPECT_WEIGHTS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .parse::<AspectWeights>()
                .context("CREDIT_ASPECT_WEIGHTS is invalid")?,
            None => AspectWeights::standard(),
        };

        Ok(Self {
            data_path: PathBuf::from(
                lookup("CREDIT_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
            ),
            weights,
            reasoning_preview: lookup("CREDIT_REASONING_PREVIEW")
                .unwrap_or_else(|| DEFAULT_REASONING_PREVIEW.to_string())
                .trim()
                .parse()
                .context("CREDIT_REASONING_PREVIEW must be a non-negative integer")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Summary,
    Ratios,
    Financials,
    Insights,
}

impl FromStr for Page {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "summary" | "analysis-summary" => Ok(Page::Summary),
            "ratios" | "ratio-explorer" => Ok(Page::Ratios),
            "financials" | "financials-explorer" => Ok(Page::Financials),
            "insights" | "performance-insight" => Ok(Page::Insights),
            other => bail!("Unknown page '{}' (expected summary, ratios, financials or insights)", other),
        }
    }
}

/// Command-line flags. Anything not recognised is ignored.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub page: Page,
    pub data: Option<PathBuf>,
    pub json: bool,
    pub full_reasoning: bool,
    pub expand: Vec<Aspect>,
    pub expand_all: bool,
    pub search: Option<String>,
}

impl CliArgs {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut cli = Self {
            page: value_of(args, "--page")?.map(|v| v.parse()).transpose()?.unwrap_or_default(),
            data: value_of(args, "--data")?.map(PathBuf::from),
            json: args.iter().any(|a| a == "--json"),
            full_reasoning: args.iter().any(|a| a == "--full-reasoning"),
            search: value_of(args, "--search")?.cloned(),
            ..Self::default()
        };

        // --expand may repeat
        for (i, _) in args.iter().enumerate().filter(|(_, a)| *a == "--expand") {
            let value = match args.get(i + 1) {
                Some(v) => v,
                None => bail!("--expand requires an aspect name or 'all'"),
            };
            if value.eq_ignore_ascii_case("all") {
                cli.expand_all = true;
            } else {
                cli.expand.push(value.parse::<Aspect>()?);
            }
        }

        Ok(cli)
    }

    pub fn view_state(&self) -> ViewState {
        let mut state = ViewState::with_full_reasoning(self.full_reasoning);
        let aspects: &[Aspect] = if self.expand_all { &Aspect::ALL } else { &self.expand };
        for aspect in aspects {
            state.expand_aspect(*aspect);
        }
        state
    }
}

fn value_of<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a String>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => match args.get(i + 1) {
            Some(v) => Ok(Some(v)),
            None => bail!("{} requires a value", flag),
        },
        None => Ok(None),
    }
}
