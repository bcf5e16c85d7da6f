//! Command-line parsing for the two front-ends.
//!
//! Argument parsing stays here; the pipeline and presentation code never see
//! clap types.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::domain::DEFAULT_COUNTRIES;

pub mod command;
pub mod data_path;

/// Environment variable naming the default CSV path (also read from `.env`).
pub const DATA_PATH_ENV: &str = "COVID_DATA_CSV";

/// Used when neither `--csv` nor the environment names a file.
pub const DEFAULT_DATA_PATH: &str = "owid-covid-data.csv";

/// Static report: quality summary, charts, insights.
#[derive(Debug, Parser, Clone)]
#[command(name = "covid-report", version, about = "COVID-19 Global Data Tracker (static report)")]
pub struct ReportArgs {
    /// Input CSV (defaults to $COVID_DATA_CSV, then ./owid-covid-data.csv).
    #[arg(short = 'f', long)]
    pub csv: Option<PathBuf>,

    /// Countries to report on (names or ISO codes).
    #[arg(
        short = 'c',
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_COUNTRIES.map(String::from)
    )]
    pub countries: Vec<String>,

    /// First date to include (YYYY-MM-DD). Defaults to the earliest date in the data.
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD). Defaults to the latest date in the data.
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Skip the ASCII charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the selected rows (with derived metrics) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Interactive dashboard driven by line commands on stdin.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "covid-dashboard",
    version,
    about = "COVID-19 Global Data Tracker (interactive dashboard)"
)]
pub struct DashboardArgs {
    /// Input CSV (defaults to $COVID_DATA_CSV, then ./owid-covid-data.csv).
    #[arg(short = 'f', long)]
    pub csv: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::io::ingest::parse_date(s.trim())
}
