//! Derived metrics: death rate, vaccination percentage, rolling new cases.
//!
//! Every metric is computed within a single country group; nothing carries
//! across a country boundary.

use crate::domain::{
    CleanRecord, CleanedDataset, Dataset, DerivedMetrics, EnrichedRecord, ROLLING_WINDOW,
};

/// Attach [`DerivedMetrics`] to every record of a cleaned dataset.
pub fn derive_metrics(cleaned: CleanedDataset, has_hospital_data: bool) -> Dataset {
    let mut records = Vec::with_capacity(cleaned.records.len());

    for group in cleaned.groups() {
        let rolling = rolling_mean(group.iter().map(|r| r.new_cases), ROLLING_WINDOW);
        for (r, rolling_new_cases) in group.iter().zip(rolling) {
            records.push(EnrichedRecord {
                record: r.clone(),
                metrics: DerivedMetrics {
                    death_rate: death_rate(r),
                    vaccination_pct: vaccination_pct(r),
                    rolling_new_cases,
                },
            });
        }
    }

    Dataset {
        records,
        has_hospital_data,
    }
}

/// `total_deaths / total_cases`, undefined when there are no cases.
///
/// Not clamped: values above 1 are left for the summarizer to flag.
pub fn death_rate(r: &CleanRecord) -> Option<f64> {
    if r.total_cases == 0.0 {
        return None;
    }
    Some(r.total_deaths / r.total_cases)
}

/// Vaccinations per 100 people, clamped to `[0, 100]`.
pub fn vaccination_pct(r: &CleanRecord) -> Option<f64> {
    let population = r.population.filter(|p| *p != 0.0)?;
    let pct = r.total_vaccinations / population * 100.0;
    Some(pct.clamp(0.0, 100.0))
}

/// Trailing mean over up to `window` values.
///
/// The window shrinks at the start of the series, so the first output equals
/// the first input.
pub fn rolling_mean(values: impl IntoIterator<Item = f64>, window: usize) -> Vec<f64> {
    let window = window.max(1);
    let values: Vec<f64> = values.into_iter().collect();

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let n = (i + 1).min(window);
        out.push(sum / n as f64);
    }
    out
}
