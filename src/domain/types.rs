//! Shared domain types.
//!
//! Records move through three shapes:
//!
//! - [`RawRecord`]: what the loader parsed (every numeric field nullable)
//! - [`CleanRecord`]: after fill/clamp policies (cumulative and incremental
//!   fields are always present)
//! - [`EnrichedRecord`]: a clean record plus its [`DerivedMetrics`]

use std::collections::BTreeSet;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Trailing window (observations) for `rolling_new_cases`.
pub const ROLLING_WINDOW: usize = 7;

/// Country groups with fewer observations are dropped by the cleaner.
pub const MIN_OBSERVATIONS: usize = 2;

/// Percentage points within which the vaccination trend is reported as flat.
pub const TREND_TOLERANCE_PCT: f64 = 0.5;

/// Countries used when none are chosen explicitly.
pub const DEFAULT_COUNTRIES: [&str; 3] = ["Kenya", "United States", "India"];

/// Normalized country key: trimmed and lowercased.
///
/// Grouping in the cleaner and matching in the selector both go through this,
/// so `Kenya` and `KENYA` are one country everywhere.
pub fn country_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One (country, date) row as parsed from the CSV.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub country: String,
    pub date: NaiveDate,
    pub iso_code: Option<String>,

    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
    pub total_vaccinations: Option<f64>,
    pub population: Option<f64>,

    pub hosp_patients: Option<f64>,
    pub icu_patients: Option<f64>,
}

/// A record after the cleaner's fill and monotonicity policies.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub country: String,
    pub date: NaiveDate,
    pub iso_code: Option<String>,

    /// Cumulative: forward-filled, non-decreasing, never negative.
    pub total_cases: f64,
    pub total_deaths: f64,
    pub total_vaccinations: f64,

    /// Incremental: nulls become zero.
    pub new_cases: f64,
    pub new_deaths: f64,

    /// Forward-filled but never invented; `None` until the first known value.
    pub population: Option<f64>,

    pub hosp_patients: Option<f64>,
    pub icu_patients: Option<f64>,
}

/// Grouped, date-ordered cleaner output (country ascending, then date ascending).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedDataset {
    pub records: Vec<CleanRecord>,
}

impl CleanedDataset {
    /// Iterate over contiguous per-country slices.
    pub fn groups(&self) -> impl Iterator<Item = &[CleanRecord]> {
        self.records.chunk_by(|a, b| a.country == b.country)
    }
}

/// Metrics computed per record, per country.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    /// `total_deaths / total_cases`; `None` iff `total_cases == 0`.
    pub death_rate: Option<f64>,
    /// `total_vaccinations / population * 100`, clamped to `[0, 100]`.
    pub vaccination_pct: Option<f64>,
    /// Trailing mean of up to [`ROLLING_WINDOW`] `new_cases` values.
    pub rolling_new_cases: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: CleanRecord,
    pub metrics: DerivedMetrics,
}

impl EnrichedRecord {
    pub fn country(&self) -> &str {
        &self.record.country
    }

    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    /// Case-insensitive match on country name or ISO code.
    pub fn matches_country(&self, wanted: &str) -> bool {
        let wanted = country_key(wanted);
        country_key(&self.record.country) == wanted
            || self
                .record
                .iso_code
                .as_deref()
                .is_some_and(|iso| country_key(iso) == wanted)
    }
}

/// The canonical, immutable, cleaned and enriched table.
///
/// Built once by [`crate::app::pipeline::run_pipeline`] and passed by reference
/// to every selection and summary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub records: Vec<EnrichedRecord>,
    /// Whether the source CSV carried `hosp_patients` / `icu_patients` columns.
    pub has_hospital_data: bool,
}

impl Dataset {
    /// Distinct country names in dataset order.
    pub fn countries(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.records {
            if out.last().map(String::as_str) != Some(r.country()) {
                out.push(r.country().to_string());
            }
        }
        out
    }

    /// Earliest and latest date present, if any.
    pub fn date_span(&self) -> Option<DateRange> {
        let start = self.records.iter().map(EnrichedRecord::date).min()?;
        let end = self.records.iter().map(EnrichedRecord::date).max()?;
        Some(DateRange { start, end })
    }
}

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TrackerError> {
        if start > end {
            return Err(TrackerError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Country set plus date range: the parameters of one view request.
///
/// Country names are trimmed and lowercased so equal requests hash equally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    countries: BTreeSet<String>,
    range: DateRange,
}

impl Selection {
    pub fn new<I, S>(countries: I, range: DateRange) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let countries = countries
            .into_iter()
            .map(|c| country_key(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        Self { countries, range }
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn range(&self) -> DateRange {
        self.range
    }
}

/// A filtered, read-only slice of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub selection: Selection,
    pub records: Vec<EnrichedRecord>,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Distinct countries present in the view, in record order.
    pub fn countries(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.records {
            if out.last() != Some(&r.country()) {
                out.push(r.country());
            }
        }
        out
    }

    pub fn has_hospital_data(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.record.hosp_patients.is_some() || r.record.icu_patients.is_some())
    }
}

/// Latest vaccination coverage for one country (choropleth input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub iso_code: String,
    pub country: String,
    pub date: NaiveDate,
    pub vaccination_pct: f64,
}

/// Plottable per-record series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Metric {
    TotalCases,
    TotalDeaths,
    NewCases,
    RollingNewCases,
    DeathRate,
    TotalVaccinations,
    VaccinationPct,
    HospPatients,
    IcuPatients,
}

impl Metric {
    /// Metrics charted by the static report.
    pub const REPORT: [Metric; 7] = [
        Metric::TotalCases,
        Metric::TotalDeaths,
        Metric::NewCases,
        Metric::RollingNewCases,
        Metric::DeathRate,
        Metric::TotalVaccinations,
        Metric::VaccinationPct,
    ];

    pub const HOSPITAL: [Metric; 2] = [Metric::HospPatients, Metric::IcuPatients];

    pub fn title(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total COVID-19 Cases Over Time",
            Metric::TotalDeaths => "Total Deaths Over Time",
            Metric::NewCases => "New Daily Cases",
            Metric::RollingNewCases => "New Cases (7-observation average)",
            Metric::DeathRate => "Death Rate Over Time",
            Metric::TotalVaccinations => "Total Vaccinations Over Time",
            Metric::VaccinationPct => "Percentage Vaccinated Over Time",
            Metric::HospPatients => "Hospital Patients Over Time",
            Metric::IcuPatients => "ICU Patients Over Time",
        }
    }

    pub fn value(self, r: &EnrichedRecord) -> Option<f64> {
        match self {
            Metric::TotalCases => Some(r.record.total_cases),
            Metric::TotalDeaths => Some(r.record.total_deaths),
            Metric::NewCases => Some(r.record.new_cases),
            Metric::RollingNewCases => Some(r.metrics.rolling_new_cases),
            Metric::DeathRate => r.metrics.death_rate,
            Metric::TotalVaccinations => Some(r.record.total_vaccinations),
            Metric::VaccinationPct => r.metrics.vaccination_pct,
            Metric::HospPatients => r.record.hosp_patients,
            Metric::IcuPatients => r.record.icu_patients,
        }
    }
}

/// Direction of the average vaccination percentage across a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Flat => "flat",
        };
        f.write_str(s)
    }
}

/// A row-level problem encountered during loading.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Non-fatal data-quality counts accumulated by the pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QualityReport {
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    pub duplicate_rows: usize,
    pub dropped_groups: Vec<String>,
    pub monotonic_clamps: usize,
}

impl QualityReport {
    pub fn rows_dropped(&self) -> usize {
        self.row_errors.len()
    }
}
