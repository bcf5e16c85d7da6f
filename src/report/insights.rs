//! Short textual findings for a view.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{EnrichedRecord, TREND_TOLERANCE_PCT, TrendDirection, View};

/// One observation about a view. `Display` renders the sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    MostCases {
        country: String,
        total_cases: f64,
    },
    HighestDeathRate {
        country: String,
        death_rate: f64,
    },
    /// Records whose death rate falls outside `[0, 1]`.
    AnomalousDeathRates {
        count: usize,
    },
    VaccinationTrend {
        direction: TrendDirection,
        early_pct: f64,
        late_pct: f64,
    },
    PeakHospitalization {
        country: String,
        hosp_patients: f64,
    },
}

impl std::fmt::Display for Insight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insight::MostCases {
                country,
                total_cases,
            } => write!(
                f,
                "{country} had the highest number of total cases ({total_cases:.0})."
            ),
            Insight::HighestDeathRate {
                country,
                death_rate,
            } => write!(
                f,
                "{country} had the highest death rate ({:.2}%).",
                death_rate * 100.0
            ),
            Insight::AnomalousDeathRates { count } => write!(
                f,
                "{count} record(s) report more deaths than cases; their death rates were ignored."
            ),
            Insight::VaccinationTrend {
                direction,
                early_pct,
                late_pct,
            } => write!(
                f,
                "Average vaccination coverage is {direction} ({early_pct:.1}% -> {late_pct:.1}%)."
            ),
            Insight::PeakHospitalization {
                country,
                hosp_patients,
            } => write!(
                f,
                "{country} had the highest hospital load ({hosp_patients:.0} patients at peak)."
            ),
        }
    }
}

/// Summarize a view. An empty view yields no insights.
///
/// The peak-hospitalization finding is only produced when `include_hospital`
/// is set and the view carries hospital data.
pub fn summarize(view: &View, include_hospital: bool) -> Vec<Insight> {
    let mut out = Vec::new();
    if view.is_empty() {
        return out;
    }

    let cases = |r: &EnrichedRecord| Some(r.record.total_cases);
    if let Some((country, total_cases)) = max_by_country(&view.records, cases) {
        out.push(Insight::MostCases {
            country,
            total_cases,
        });
    }

    let in_bounds = |r: &EnrichedRecord| r.metrics.death_rate.filter(|v| (0.0..=1.0).contains(v));
    if let Some((country, death_rate)) = max_by_country(&view.records, in_bounds) {
        out.push(Insight::HighestDeathRate {
            country,
            death_rate,
        });
    }

    let anomalous = view
        .records
        .iter()
        .filter(|r| r.metrics.death_rate.is_some_and(|v| !(0.0..=1.0).contains(&v)))
        .count();
    if anomalous > 0 {
        out.push(Insight::AnomalousDeathRates { count: anomalous });
    }

    if let Some(trend) = vaccination_trend(&view.records) {
        out.push(trend);
    }

    if include_hospital && view.has_hospital_data() {
        let hosp = |r: &EnrichedRecord| r.record.hosp_patients;
        if let Some((country, hosp_patients)) = max_by_country(&view.records, hosp) {
            out.push(Insight::PeakHospitalization {
                country,
                hosp_patients,
            });
        }
    }

    out
}

/// Country holding the largest value of `metric`; ties go to the
/// alphabetically first country.
fn max_by_country<F>(records: &[EnrichedRecord], metric: F) -> Option<(String, f64)>
where
    F: Fn(&EnrichedRecord) -> Option<f64>,
{
    let mut best: Option<(&str, f64)> = None;
    for r in records {
        let Some(v) = metric(r) else { continue };
        best = match best {
            Some((c, b)) if b > v || (b == v && c <= r.country()) => Some((c, b)),
            _ => Some((r.country(), v)),
        };
    }
    best.map(|(c, v)| (c.to_string(), v))
}

/// Compare mean vaccination % on the first vs. last quartile of distinct dates.
fn vaccination_trend(records: &[EnrichedRecord]) -> Option<Insight> {
    let dates: Vec<NaiveDate> = records
        .iter()
        .map(EnrichedRecord::date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if dates.is_empty() {
        return None;
    }

    let q = dates.len().div_ceil(4);
    let early_end = dates[q - 1];
    let late_start = dates[dates.len() - q];

    let early_pct = mean(
        records
            .iter()
            .filter(|r| r.date() <= early_end)
            .filter_map(|r| r.metrics.vaccination_pct),
    )?;
    let late_pct = mean(
        records
            .iter()
            .filter(|r| r.date() >= late_start)
            .filter_map(|r| r.metrics.vaccination_pct),
    )?;

    let direction = if late_pct - early_pct > TREND_TOLERANCE_PCT {
        TrendDirection::Increasing
    } else if early_pct - late_pct > TREND_TOLERANCE_PCT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Flat
    };

    Some(Insight::VaccinationTrend {
        direction,
        early_pct,
        late_pct,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
