//! CSV ingest.
//!
//! Turns the OWID-style CSV into typed [`RawRecord`]s.
//!
//! - Required columns (`country`/`location`, `date`) are validated once from the
//!   header; a missing one is a schema error.
//! - Bad rows are skipped and reported, never fatal.
//! - Extra columns are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{RawRecord, RowError};
use crate::error::TrackerError;

/// Accepted names for the country column, in priority order.
const COUNTRY_COLUMNS: [&str; 2] = ["country", "location"];

/// Resolved column positions for one input file.
#[derive(Debug, Clone)]
struct Columns {
    country: usize,
    date: usize,
    iso_code: Option<usize>,
    total_cases: Option<usize>,
    new_cases: Option<usize>,
    total_deaths: Option<usize>,
    new_deaths: Option<usize>,
    total_vaccinations: Option<usize>,
    population: Option<usize>,
    hosp_patients: Option<usize>,
    icu_patients: Option<usize>,
}

impl Columns {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, TrackerError> {
        let country = COUNTRY_COLUMNS
            .iter()
            .find_map(|name| header_map.get(*name).copied())
            .ok_or_else(|| TrackerError::Schema {
                column: "country".to_string(),
            })?;
        let date = header_map
            .get("date")
            .copied()
            .ok_or_else(|| TrackerError::Schema {
                column: "date".to_string(),
            })?;

        let opt = |name: &str| header_map.get(name).copied();
        Ok(Self {
            country,
            date,
            iso_code: opt("iso_code"),
            total_cases: opt("total_cases"),
            new_cases: opt("new_cases"),
            total_deaths: opt("total_deaths"),
            new_deaths: opt("new_deaths"),
            total_vaccinations: opt("total_vaccinations"),
            population: opt("population"),
            hosp_patients: opt("hosp_patients"),
            icu_patients: opt("icu_patients"),
        })
    }

    fn has_hospital_data(&self) -> bool {
        self.hosp_patients.is_some() || self.icu_patients.is_some()
    }
}

/// Loader output: parsed records plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedRows {
    pub records: Vec<RawRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub has_hospital_data: bool,
}

/// Open and load a CSV file.
pub fn load_csv(path: &Path) -> Result<LoadedRows, TrackerError> {
    let file = File::open(path)
        .map_err(|e| TrackerError::io(format!("Failed to open CSV '{}'", path.display()), e))?;
    info!(path = %path.display(), "loading dataset");
    load_records(file)
}

/// Load records from any CSV source with a header row.
pub fn load_records<R: Read>(source: R) -> Result<LoadedRows, TrackerError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&build_header_map(&headers))?;

    let mut out = LoadedRows {
        has_hospital_data: columns.has_hospital_data(),
        ..LoadedRows::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        out.rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &columns));

        match parsed {
            Ok(row) => out.records.push(row),
            Err(message) => {
                warn!(line, %message, "dropping unparseable row");
                out.row_errors.push(RowError { line, message });
            }
        }
    }

    info!(
        rows_read = out.rows_read,
        rows_used = out.records.len(),
        rows_dropped = out.row_errors.len(),
        "dataset loaded"
    );
    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<RawRecord, String> {
    let country = get_cell(record, Some(columns.country))
        .ok_or_else(|| "Missing country value.".to_string())?
        .to_string();
    let date = parse_date(
        get_cell(record, Some(columns.date)).ok_or_else(|| "Missing date value.".to_string())?,
    )?;

    Ok(RawRecord {
        country,
        date,
        iso_code: get_cell(record, columns.iso_code).map(str::to_string),
        total_cases: parse_number(record, columns.total_cases, "total_cases")?,
        new_cases: parse_number(record, columns.new_cases, "new_cases")?,
        total_deaths: parse_number(record, columns.total_deaths, "total_deaths")?,
        new_deaths: parse_number(record, columns.new_deaths, "new_deaths")?,
        total_vaccinations: parse_number(
            record,
            columns.total_vaccinations,
            "total_vaccinations",
        )?,
        population: parse_number(record, columns.population, "population")?,
        hosp_patients: parse_number(record, columns.hosp_patients, "hosp_patients")?,
        icu_patients: parse_number(record, columns.icu_patients, "icu_patients")?,
    })
}

fn get_cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record
        .get(idx?)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Empty cells are null; anything else must be a finite number.
fn parse_number(
    record: &StringRecord,
    idx: Option<usize>,
    name: &str,
) -> Result<Option<f64>, String> {
    let Some(s) = get_cell(record, idx) else {
        return Ok(None);
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("Invalid `{name}` value '{s}'.")),
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}
