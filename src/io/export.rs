//! Export a view to CSV.
//!
//! One row per record with the cleaned fields and derived metrics, meant for
//! spreadsheets and downstream charting.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EnrichedRecord, View};
use crate::error::TrackerError;

/// One exported row; field order is the column order.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    country: &'a str,
    iso_code: Option<&'a str>,
    date: NaiveDate,
    total_cases: f64,
    new_cases: f64,
    total_deaths: f64,
    new_deaths: f64,
    total_vaccinations: f64,
    population: Option<f64>,
    death_rate: Option<f64>,
    vaccination_pct: Option<f64>,
    rolling_new_cases: f64,
    hosp_patients: Option<f64>,
    icu_patients: Option<f64>,
}

impl<'a> From<&'a EnrichedRecord> for ExportRow<'a> {
    fn from(r: &'a EnrichedRecord) -> Self {
        let c = &r.record;
        Self {
            country: &c.country,
            iso_code: c.iso_code.as_deref(),
            date: c.date,
            total_cases: c.total_cases,
            new_cases: c.new_cases,
            total_deaths: c.total_deaths,
            new_deaths: c.new_deaths,
            total_vaccinations: c.total_vaccinations,
            population: c.population,
            death_rate: r.metrics.death_rate,
            vaccination_pct: r.metrics.vaccination_pct,
            rolling_new_cases: r.metrics.rolling_new_cases,
            hosp_patients: c.hosp_patients,
            icu_patients: c.icu_patients,
        }
    }
}

/// Write the view's rows to a CSV file (header row included).
pub fn write_view_csv(path: &Path, view: &View) -> Result<(), TrackerError> {
    let context = |verb: &str| format!("Failed to {verb} export CSV '{}'", path.display());
    let file = File::create(path).map_err(|e| TrackerError::io(context("create"), e))?;

    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);
    for r in &view.records {
        writer.serialize(ExportRow::from(r))?;
    }
    writer.flush().map_err(|e| TrackerError::io(context("write"), e))
}
