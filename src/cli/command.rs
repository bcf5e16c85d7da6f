//! Line commands understood by the dashboard.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::Metric;
use crate::io::ingest::parse_date;

pub const HELP: &str = "\
Commands:
  countries A,B,...      select countries (names or ISO codes)
  range START END        restrict dates (YYYY-MM-DD, inclusive)
  reset                  restore the full date range
  hospital on|off        toggle hospital/ICU series
  plot METRIC            chart a metric (e.g. total_cases, vaccination_pct)
  map                    latest vaccination % per country
  export-map PATH        write the map snapshot as JSON
  show                   preview rows and insights
  help                   this message
  quit                   leave the dashboard";

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    Countries(Vec<String>),
    Range(NaiveDate, NaiveDate),
    Reset,
    Hospital(bool),
    Plot(Metric),
    Map,
    ExportMap(PathBuf),
    Show,
    Help,
    Quit,
}

impl DashboardCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let parsed = match cmd.to_ascii_lowercase().as_str() {
            "countries" | "c" => DashboardCommand::Countries(
                rest.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            "range" | "r" => {
                let mut parts = rest.split_whitespace();
                let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err("Usage: range START END".to_string());
                };
                DashboardCommand::Range(parse_date(start)?, parse_date(end)?)
            }
            "reset" => DashboardCommand::Reset,
            "hospital" => match rest.to_ascii_lowercase().as_str() {
                "on" => DashboardCommand::Hospital(true),
                "off" => DashboardCommand::Hospital(false),
                _ => return Err("Usage: hospital on|off".to_string()),
            },
            "plot" | "p" => DashboardCommand::Plot(parse_metric(rest)?),
            "map" => DashboardCommand::Map,
            "export-map" => {
                if rest.is_empty() {
                    return Err("Usage: export-map PATH".to_string());
                }
                DashboardCommand::ExportMap(PathBuf::from(rest))
            }
            "show" | "s" => DashboardCommand::Show,
            "help" | "h" | "?" => DashboardCommand::Help,
            "quit" | "q" | "exit" => DashboardCommand::Quit,
            other => return Err(format!("Unknown command '{other}'. Type `help` for a list.")),
        };
        Ok(Some(parsed))
    }
}

fn parse_metric(s: &str) -> Result<Metric, String> {
    use clap::ValueEnum;
    Metric::from_str(s.trim(), true).map_err(|_| {
        let names: Vec<String> = Metric::value_variants()
            .iter()
            .filter_map(|m| m.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        format!("Unknown metric '{s}'. Choose one of: {}", names.join(", "))
    })
}
