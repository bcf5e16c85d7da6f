//! Formatted terminal output.
//!
//! Kept apart from the pipeline so output changes stay local and testable.

use crate::domain::{EnrichedRecord, MapEntry, QualityReport, View};
use crate::report::insights::Insight;

/// Rows of detail shown for dropped rows before eliding the rest.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Data-quality summary printed before the insights in static mode.
pub fn format_quality_summary(report: &QualityReport) -> String {
    let mut out = String::new();

    out.push_str("Data quality:\n");
    out.push_str(&format!("- rows read: {}\n", report.rows_read));
    out.push_str(&format!("- rows dropped (unparseable): {}\n", report.rows_dropped()));
    for e in report.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("    line {}: {}\n", e.line, e.message));
    }
    if report.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "    ... {} more\n",
            report.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }
    out.push_str(&format!("- duplicate dates discarded: {}\n", report.duplicate_rows));
    out.push_str(&format!(
        "- countries dropped (< 2 observations): {}",
        report.dropped_groups.len()
    ));
    if !report.dropped_groups.is_empty() {
        out.push_str(&format!(" ({})", report.dropped_groups.join(", ")));
    }
    out.push('\n');
    out.push_str(&format!(
        "- cumulative values clamped: {}\n",
        report.monotonic_clamps
    ));

    out
}

/// Numbered insight list.
pub fn format_insights(insights: &[Insight]) -> String {
    let mut out = String::from("Key insights:\n");
    if insights.is_empty() {
        out.push_str("(no data in the selected range)\n");
        return out;
    }
    for (i, insight) in insights.iter().enumerate() {
        out.push_str(&format!("{}. {insight}\n", i + 1));
    }
    out
}

/// Latest record per country in the view.
pub fn format_latest_table(view: &View) -> String {
    let latest: Vec<&EnrichedRecord> = view
        .countries()
        .into_iter()
        .filter_map(|c| view.records.iter().rev().find(|r| r.country() == c))
        .collect();
    format_table(&latest)
}

/// First `n` rows of the view.
pub fn format_preview(view: &View, n: usize) -> String {
    let rows: Vec<&EnrichedRecord> = view.records.iter().take(n).collect();
    format_table(&rows)
}

fn format_table(rows: &[&EnrichedRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<20} {:<10} {:>12} {:>10} {:>10} {:>10} {:>8} {:>8}\n",
            "country", "date", "total_cases", "new_cases", "rolling", "deaths", "rate%", "vax%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<20} {:-<10} {:-<12} {:-<10} {:-<10} {:-<10} {:-<8} {:-<8}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<20} {:<10} {:>12.0} {:>10.0} {:>10.1} {:>10.0} {:>8} {:>8}\n",
                truncate(r.country(), 20),
                r.date(),
                r.record.total_cases,
                r.record.new_cases,
                r.metrics.rolling_new_cases,
                r.record.total_deaths,
                fmt_opt_pct(r.metrics.death_rate.map(|v| v * 100.0)),
                fmt_opt_pct(r.metrics.vaccination_pct),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Choropleth snapshot as a table.
pub fn format_map(entries: &[MapEntry]) -> String {
    let mut out = String::new();
    out.push_str("Percentage vaccinated by country (latest):\n");
    if entries.is_empty() {
        out.push_str("(no countries with ISO code and vaccination data)\n");
        return out;
    }
    for e in entries {
        out.push_str(&format!(
            "{:<4} {:<20} {} {:>6.2}%\n",
            e.iso_code,
            truncate(&e.country, 20),
            e.date,
            e.vaccination_pct
        ));
    }
    out
}

fn fmt_opt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
