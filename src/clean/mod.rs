//! Cleaning: group by country, order by date, fill nulls, enforce monotonicity.
//!
//! Field policies:
//! - cumulative (`total_cases`, `total_deaths`, `total_vaccinations`): forward-fill,
//!   `0` before the first known value, clamped to be non-decreasing
//! - incremental (`new_cases`, `new_deaths`): null becomes `0`
//! - `population`, `iso_code`: forward-fill only
//! - hospital gauges: untouched

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{CleanRecord, CleanedDataset, MIN_OBSERVATIONS, RawRecord, country_key};

/// Cleaner output plus the counts it is responsible for reporting.
#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub dataset: CleanedDataset,
    pub duplicate_rows: usize,
    pub dropped_groups: Vec<String>,
    pub monotonic_clamps: usize,
}

/// Clean raw records into a grouped, date-ordered dataset.
///
/// Rows are grouped by [`country_key`]; every row of a group takes the first
/// spelling seen for that country.
pub fn clean_records(raw: Vec<RawRecord>) -> CleanOutcome {
    let mut groups: BTreeMap<String, (String, Vec<RawRecord>)> = BTreeMap::new();
    for mut r in raw {
        let (name, rows) = groups
            .entry(country_key(&r.country))
            .or_insert_with(|| (r.country.clone(), Vec::new()));
        r.country.clone_from(name);
        rows.push(r);
    }

    let mut out = CleanOutcome::default();

    for (country, mut rows) in groups.into_values() {
        // Stable sort keeps input order among equal dates; the last one wins.
        rows.sort_by_key(|r| r.date);
        let before = rows.len();
        rows = dedup_keep_last(rows);
        out.duplicate_rows += before - rows.len();

        if rows.len() < MIN_OBSERVATIONS {
            warn!(
                %country,
                observations = rows.len(),
                "dropping country with too few observations"
            );
            out.dropped_groups.push(country);
            continue;
        }

        let (cleaned, clamps) = clean_group(&rows);
        out.monotonic_clamps += clamps;
        out.dataset.records.extend(cleaned);
    }

    if out.duplicate_rows > 0 {
        warn!(duplicates = out.duplicate_rows, "discarded duplicate (country, date) rows");
    }
    if out.monotonic_clamps > 0 {
        warn!(clamps = out.monotonic_clamps, "clamped decreasing cumulative values");
    }

    out
}

fn dedup_keep_last(rows: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut out: Vec<RawRecord> = Vec::with_capacity(rows.len());
    for r in rows {
        match out.last_mut() {
            Some(prev) if prev.date == r.date => *prev = r,
            _ => out.push(r),
        }
    }
    out
}

/// Running state for one cumulative field.
#[derive(Debug, Default)]
struct Cumulative {
    last: f64,
    clamps: usize,
}

impl Cumulative {
    fn next(&mut self, value: Option<f64>) -> f64 {
        let v = value.unwrap_or(self.last);
        if v < self.last {
            self.clamps += 1;
        } else {
            self.last = v;
        }
        self.last
    }
}

/// Clean one date-sorted, duplicate-free country group.
fn clean_group(rows: &[RawRecord]) -> (Vec<CleanRecord>, usize) {
    let mut cases = Cumulative::default();
    let mut deaths = Cumulative::default();
    let mut vaccinations = Cumulative::default();
    let mut population: Option<f64> = None;
    let mut iso_code: Option<String> = None;

    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        population = r.population.or(population);
        if r.iso_code.is_some() {
            iso_code = r.iso_code.clone();
        }

        out.push(CleanRecord {
            country: r.country.clone(),
            date: r.date,
            iso_code: iso_code.clone(),
            total_cases: cases.next(r.total_cases),
            total_deaths: deaths.next(r.total_deaths),
            total_vaccinations: vaccinations.next(r.total_vaccinations),
            new_cases: r.new_cases.unwrap_or(0.0),
            new_deaths: r.new_deaths.unwrap_or(0.0),
            population,
            hosp_patients: r.hosp_patients,
            icu_patients: r.icu_patients,
        });
    }

    (out, cases.clamps + deaths.clamps + vaccinations.clamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(country: &str, day: u32) -> RawRecord {
        RawRecord {
            country: country.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            ..RawRecord::default()
        }
    }

    fn series(country: &str, total_cases: &[Option<f64>]) -> Vec<RawRecord> {
        total_cases
            .iter()
            .enumerate()
            .map(|(i, &tc)| RawRecord {
                total_cases: tc,
                ..raw(country, i as u32 + 1)
            })
            .collect()
    }

    #[test]
    fn forward_fills_cumulative_and_zero_fills_incremental() {
        let deaths = [None, Some(1.0), Some(2.0), None];
        let mut rows = series("A", &[None, Some(10.0), None, Some(30.0)]);
        for (r, d) in rows.iter_mut().zip(deaths) {
            r.total_deaths = d;
        }
        rows[1].new_cases = Some(10.0);

        let out = clean_records(rows);
        let recs = &out.dataset.records;

        let cases: Vec<f64> = recs.iter().map(|r| r.total_cases).collect();
        let deaths: Vec<f64> = recs.iter().map(|r| r.total_deaths).collect();
        let new_cases: Vec<f64> = recs.iter().map(|r| r.new_cases).collect();
        assert_eq!(cases, vec![0.0, 10.0, 10.0, 30.0]);
        assert_eq!(deaths, vec![0.0, 1.0, 2.0, 2.0]);
        assert_eq!(new_cases, vec![0.0, 10.0, 0.0, 0.0]);
        assert_eq!(out.monotonic_clamps, 0);
    }

    #[test]
    fn sorts_by_date_within_country_and_orders_countries() {
        let mut rows = series("B", &[Some(1.0), Some(2.0)]);
        rows.reverse();
        rows.extend(series("A", &[Some(5.0), Some(6.0)]));

        let out = clean_records(rows);
        let keys: Vec<(String, u32)> = out
            .dataset
            .records
            .iter()
            .map(|r| (r.country.clone(), chrono::Datelike::day(&r.date)))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A".to_string(), 1),
                ("A".to_string(), 2),
                ("B".to_string(), 1),
                ("B".to_string(), 2),
            ]
        );
        assert_eq!(out.dataset.groups().count(), 2);
    }

    #[test]
    fn drops_single_observation_groups() {
        let mut rows = series("A", &[Some(1.0), Some(2.0)]);
        rows.push(raw("Solo", 1));

        let out = clean_records(rows);
        assert_eq!(out.dropped_groups, vec!["Solo".to_string()]);
        assert!(out.dataset.records.iter().all(|r| r.country == "A"));
    }

    #[test]
    fn clamps_decreasing_and_negative_cumulative_values() {
        let rows = series("A", &[Some(-3.0), Some(10.0), Some(8.0), Some(12.0)]);
        let out = clean_records(rows);

        let cases: Vec<f64> = out.dataset.records.iter().map(|r| r.total_cases).collect();
        assert_eq!(cases, vec![0.0, 10.0, 10.0, 12.0]);
        assert_eq!(out.monotonic_clamps, 2);
    }

    #[test]
    fn duplicate_dates_keep_the_last_row() {
        let mut rows = series("A", &[Some(1.0), Some(2.0)]);
        rows.push(RawRecord {
            total_cases: Some(7.0),
            ..raw("A", 2)
        });

        let out = clean_records(rows);
        assert_eq!(out.duplicate_rows, 1);
        let cases: Vec<f64> = out.dataset.records.iter().map(|r| r.total_cases).collect();
        assert_eq!(cases, vec![1.0, 7.0]);
    }

    #[test]
    fn country_spellings_differing_in_case_form_one_group() {
        let rows = vec![
            RawRecord {
                total_cases: Some(1.0),
                ..raw("Kenya", 1)
            },
            RawRecord {
                total_cases: Some(3.0),
                ..raw(" KENYA", 2)
            },
        ];

        let out = clean_records(rows);
        assert!(out.dropped_groups.is_empty());
        assert_eq!(out.dataset.groups().count(), 1);
        let names: Vec<&str> = out.dataset.records.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Kenya", "Kenya"]);
        let cases: Vec<f64> = out.dataset.records.iter().map(|r| r.total_cases).collect();
        assert_eq!(cases, vec![1.0, 3.0]);
    }

    #[test]
    fn population_and_iso_code_are_forward_filled_but_not_invented() {
        let mut rows = series("A", &[Some(1.0), Some(2.0), Some(3.0)]);
        rows[1].population = Some(1000.0);
        rows[1].iso_code = Some("AAA".to_string());

        let out = clean_records(rows);
        let pops: Vec<Option<f64>> = out.dataset.records.iter().map(|r| r.population).collect();
        assert_eq!(pops, vec![None, Some(1000.0), Some(1000.0)]);
        assert_eq!(out.dataset.records[0].iso_code, None);
        assert_eq!(out.dataset.records[2].iso_code.as_deref(), Some("AAA"));
    }
}
