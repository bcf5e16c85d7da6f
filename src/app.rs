//! Top-level application orchestration.
//!
//! The binaries are tiny; this module is the "real main" for both:
//! - `covid-report`: pipeline once, then quality summary, charts, insights
//! - `covid-dashboard`: pipeline once, then a command loop over a session

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::command::{DashboardCommand, HELP};
use crate::cli::data_path::resolve_csv_path;
use crate::cli::{DashboardArgs, ReportArgs};
use crate::domain::{DateRange, Metric, Selection};
use crate::error::{AppError, TrackerError};
use crate::report::{
    format_insights, format_latest_table, format_map, format_preview, format_quality_summary,
};

pub mod pipeline;
pub mod session;

use pipeline::{PipelineOutput, run_pipeline};
use session::DashboardSession;

/// Rows shown by the dashboard's preview table.
const PREVIEW_ROWS: usize = 5;

/// Install the stderr log subscriber (`RUST_LOG` overrides the `warn` default).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Entry point for `covid-report`.
pub fn run_report() -> Result<(), AppError> {
    let args = ReportArgs::parse();
    init_logging();

    let path = resolve_csv_path(args.csv.as_deref())?;
    let run = run_pipeline(&path)?;
    let text = render_report(&args, &run)?;
    print!("{text}");
    Ok(())
}

/// Build the full static report for one pipeline run.
pub fn render_report(args: &ReportArgs, run: &PipelineOutput) -> Result<String, AppError> {
    let span = run
        .dataset
        .date_span()
        .ok_or_else(|| AppError::new(3, "No usable records remain after cleaning."))?;
    let range = DateRange::new(
        args.start.unwrap_or(span.start()),
        args.end.unwrap_or(span.end()),
    )?;
    let view = crate::select::select(&run.dataset, &Selection::new(&args.countries, range));

    let mut out = String::new();
    out.push_str("=== COVID-19 Global Data Tracker ===\n");
    out.push_str(&format!("Countries: {}\n", args.countries.join(", ")));
    out.push_str(&format!("Range: {} .. {}\n\n", range.start(), range.end()));
    out.push_str(&format_quality_summary(&run.quality));
    out.push('\n');

    if view.is_empty() {
        warn!(countries = ?args.countries, "selection matched no records");
    } else {
        out.push_str(&format_latest_table(&view));
        out.push('\n');
    }

    if !args.no_plot && !view.is_empty() {
        let hospital: &[Metric] = if view.has_hospital_data() { &Metric::HOSPITAL } else { &[] };
        for metric in Metric::REPORT.iter().chain(hospital) {
            out.push_str(&crate::plot::render_metric_plot(&view, *metric, args.width, args.height));
            out.push('\n');
        }
    }

    out.push_str(&format_insights(&crate::report::summarize(&view, true)));

    if let Some(path) = &args.export {
        crate::io::export::write_view_csv(path, &view)?;
        out.push_str(&format!("\nExported {} rows to {}\n", view.len(), path.display()));
    }

    Ok(out)
}

/// Entry point for `covid-dashboard`.
pub fn run_dashboard() -> Result<(), AppError> {
    let args = DashboardArgs::parse();
    init_logging();

    let path = resolve_csv_path(args.csv.as_deref())?;
    let run = run_pipeline(&path)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    drive_dashboard(&args, &run, stdin.lock(), stdout.lock())
}

/// Command loop over a dashboard session. Returns on `quit` or end of input.
pub fn drive_dashboard<R: BufRead, W: Write>(
    args: &DashboardArgs,
    run: &PipelineOutput,
    input: R,
    mut out: W,
) -> Result<(), AppError> {
    let mut session = DashboardSession::new(&run.dataset);
    let write_err = |e: io::Error| AppError::new(4, format!("Failed to write output: {e}"));

    writeln!(
        out,
        "Loaded {} records for {} countries. Type `help` for commands.",
        run.dataset.records.len(),
        run.dataset.countries().len()
    )
    .map_err(write_err)?;
    write!(out, "{}", format_quality_summary(&run.quality)).map_err(write_err)?;
    write!(out, "{}", render_panel(&mut session)).map_err(write_err)?;

    for line in input.lines() {
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        let command = match DashboardCommand::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "{msg}").map_err(write_err)?;
                continue;
            }
        };

        let text = match command {
            DashboardCommand::Quit => break,
            DashboardCommand::Help => format!("{HELP}\n"),
            DashboardCommand::Countries(countries) => {
                session.set_countries(countries);
                render_panel(&mut session)
            }
            DashboardCommand::Range(start, end) => match session.set_range(start, end) {
                Ok(()) => render_panel(&mut session),
                Err(e) => format!("{e}\n"),
            },
            DashboardCommand::Reset => {
                session.reset_range();
                render_panel(&mut session)
            }
            DashboardCommand::Hospital(on) => {
                session.set_show_hospital(on);
                if on && !session.show_hospital() {
                    "No hospital/ICU columns in this dataset.\n".to_string()
                } else {
                    render_panel(&mut session)
                }
            }
            DashboardCommand::Plot(metric) => {
                let view = session.current_view();
                crate::plot::render_metric_plot(&view, metric, args.width, args.height)
            }
            DashboardCommand::Map => format_map(&session.map()),
            DashboardCommand::ExportMap(path) => {
                let entries = session.map();
                match crate::io::map::write_map_json(&path, &entries) {
                    Ok(()) => {
                        format!("Wrote {} map entries to {}\n", entries.len(), path.display())
                    }
                    Err(e) => report_error(e),
                }
            }
            DashboardCommand::Show => render_panel(&mut session),
        };
        write!(out, "{text}").map_err(write_err)?;
    }

    out.flush().map_err(write_err)
}

/// Results pane: selection header, preview rows, optional hospital charts, insights.
fn render_panel(session: &mut DashboardSession<'_>) -> String {
    let view = session.current_view();
    let range = session.range();

    let mut out = String::new();
    out.push_str(&format!(
        "\n[{}] {} .. {} | {} rows\n",
        session.countries().join(", "),
        range.start(),
        range.end(),
        view.len()
    ));
    if !view.is_empty() {
        out.push_str(&format_preview(&view, PREVIEW_ROWS));
    }
    if session.show_hospital() {
        for metric in Metric::HOSPITAL {
            out.push_str(&crate::plot::render_metric_plot(&view, metric, 60, 10));
        }
    }
    out.push_str(&format_insights(&session.insights()));
    out
}

fn report_error(e: TrackerError) -> String {
    warn!(error = %e, "dashboard command failed");
    format!("{e}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_dataset;
    use crate::io::ingest::load_records;

    const CSV: &str = "\
iso_code,location,date,total_cases,new_cases,total_deaths,new_deaths,total_vaccinations,population
KEN,Kenya,2021-01-01,10,10,1,1,0,100
KEN,Kenya,2021-01-02,20,10,1,0,10,100
IND,India,2021-01-01,100,100,1,1,0,1000
IND,India,2021-01-02,200,100,4,3,100,1000
SOL,Solo,2021-01-01,1,1,0,0,,
";

    fn run() -> PipelineOutput {
        let (dataset, quality) = build_dataset(load_records(CSV.as_bytes()).unwrap());
        PipelineOutput { dataset, quality }
    }

    fn dashboard(script: &str) -> String {
        let args = DashboardArgs::parse_from(["covid-dashboard"]);
        let mut out = Vec::new();
        drive_dashboard(&args, &run(), script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn report_prints_quality_before_insights() {
        let args = ReportArgs::parse_from(["covid-report", "--no-plot"]);
        let txt = render_report(&args, &run()).unwrap();

        let quality = txt.find("Data quality:").unwrap();
        let insights = txt.find("Key insights:").unwrap();
        assert!(quality < insights);
        assert!(txt.contains("countries dropped (< 2 observations): 1 (Solo)"));
        assert!(txt.contains("1. India had the highest number of total cases (200)."));
        assert!(!txt.contains("Over Time"));
    }

    #[test]
    fn report_includes_charts_and_rejects_reversed_dates() {
        let args = ReportArgs::parse_from(["covid-report", "--width", "20", "--height", "5"]);
        let txt = render_report(&args, &run()).unwrap();
        assert!(txt.contains("Total COVID-19 Cases Over Time"));
        assert!(txt.contains("Percentage Vaccinated Over Time"));

        let args = ReportArgs::parse_from([
            "covid-report",
            "--start",
            "2021-02-01",
            "--end",
            "2021-01-01",
        ]);
        assert_eq!(render_report(&args, &run()).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn dashboard_keeps_running_after_bad_input() {
        let script = "range 2021-01-02 2021-01-01\nfrobnicate\ncountries Atlantis\nquit\nshow\n";
        let txt = dashboard(script);
        assert!(txt.contains("Invalid date range"));
        assert!(txt.contains("Unknown command 'frobnicate'"));
        assert!(txt.contains("[Atlantis]"));
        assert!(txt.contains("| 0 rows"));
        // Nothing after `quit` is processed.
        assert_eq!(txt.matches("Key insights:").count(), 2);
    }

    #[test]
    fn dashboard_filters_and_maps() {
        let txt = dashboard("countries KEN\nrange 2021-01-02 2021-01-02\nmap\nhospital on\n");
        assert!(txt.contains("[KEN] 2021-01-02 .. 2021-01-02 | 1 rows"));
        assert!(txt.contains("KEN  Kenya"));
        assert!(txt.contains("No hospital/ICU columns"));
    }

    #[test]
    fn hospital_toggle_controls_hospital_insight() {
        let csv = "\
location,date,total_cases,new_cases,total_deaths,new_deaths,hosp_patients
Kenya,2021-01-01,10,10,0,0,5
Kenya,2021-01-02,20,10,0,0,9
";
        let (dataset, quality) = build_dataset(load_records(csv.as_bytes()).unwrap());
        let run = PipelineOutput { dataset, quality };
        let args = DashboardArgs::parse_from(["covid-dashboard"]);
        let mut out = Vec::new();
        drive_dashboard(&args, &run, "hospital on\nhospital off\n".as_bytes(), &mut out).unwrap();
        let txt = String::from_utf8(out).unwrap();

        // Initial panel, `on` panel, `off` panel.
        assert_eq!(txt.matches("Key insights:").count(), 3);
        assert_eq!(txt.matches("highest hospital load (9 patients at peak)").count(), 1);
        assert!(txt.contains("Hospital Patients Over Time"));
    }

    #[test]
    fn dashboard_exports_map_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let txt = dashboard(&format!("export-map {}\n", path.display()));
        assert!(txt.contains("Wrote 2 map entries"));
        let file = crate::io::map::read_map_json(&path).unwrap();
        assert_eq!(file.entries[0].iso_code, "IND");
    }
}
