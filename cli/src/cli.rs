use std::path::PathBuf;

use anyhow::Result;
use quakeview::DashboardConfig;

/// Earthquake-impact dashboard, headless
#[derive(clap::Parser, Debug)]
#[command(name = "quakeview", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Dashboard configuration (TOML); defaults apply when omitted
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn load_config(&self) -> Result<DashboardConfig> {
        match &self.config {
            Some(path) => DashboardConfig::load_from_file(path),
            None => Ok(DashboardConfig::default()),
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print chart records for a metric, or list the metrics
    Chart(ChartArgs),

    /// Summarise building footprints by size class and damage state
    Inspect(InspectArgs),

    /// Mount a dashboard on an in-memory map and replay scripted steps
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
pub struct ChartArgs {
    /// Metric name or label, e.g. poverty, walls, "Matériaux de toit"
    pub metric: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// A buildings GeoJSON file, or a directory searched recursively
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    pub path: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// Directory that geometry locators are resolved against
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub data_root: PathBuf,

    /// Page to mount first: overview, damage or seismic
    #[arg(short, long, default_value = "overview")]
    pub page: String,

    /// Steps: select:NAME, toggle:boundaries|buildings|mi|pga, overlay:stats|charts,
    /// class:LABEL, metric:NAME, reset, page:overview|damage|seismic
    pub steps: Vec<String>,
}
