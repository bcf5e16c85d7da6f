//! Filtering the dataset into views.
//!
//! Selection is forgiving: an empty country set or unknown names produce an
//! empty view rather than an error. Only a reversed date range fails, and that
//! is caught when the [`DateRange`](crate::domain::DateRange) is built.

use crate::domain::{Dataset, EnrichedRecord, MapEntry, Selection, View};

/// Select from the full dataset.
pub fn select(dataset: &Dataset, selection: &Selection) -> View {
    select_records(&dataset.records, selection)
}

/// Narrow an existing view. Re-applying its own selection yields an equal view.
pub fn reselect(view: &View, selection: &Selection) -> View {
    select_records(&view.records, selection)
}

fn select_records(records: &[EnrichedRecord], selection: &Selection) -> View {
    let range = selection.range();
    let records = records
        .iter()
        .filter(|r| range.contains(r.date()))
        .filter(|r| selection.countries().iter().any(|c| r.matches_country(c)))
        .cloned()
        .collect();

    View {
        selection: selection.clone(),
        records,
    }
}

/// Latest record per country that has both an ISO code and a vaccination
/// percentage, ordered by country.
pub fn map_snapshot(view: &View) -> Vec<MapEntry> {
    let mut out: Vec<MapEntry> = Vec::new();
    for r in &view.records {
        let (Some(iso_code), Some(pct)) =
            (r.record.iso_code.as_deref(), r.metrics.vaccination_pct)
        else {
            continue;
        };
        let entry = MapEntry {
            iso_code: iso_code.to_string(),
            country: r.country().to_string(),
            date: r.date(),
            vaccination_pct: pct,
        };
        match out.iter_mut().find(|e| e.country == entry.country) {
            Some(existing) if existing.date < entry.date => *existing = entry,
            Some(_) => {}
            None => out.push(entry),
        }
    }
    out.sort_by(|a, b| a.country.cmp(&b.country));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CleanRecord, DateRange, DerivedMetrics};
    use chrono::{Datelike, NaiveDate};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn record(country: &str, iso: &str, day: u32, total_cases: f64) -> EnrichedRecord {
        EnrichedRecord {
            record: CleanRecord {
                country: country.to_string(),
                date: d(day),
                iso_code: Some(iso.to_string()),
                total_cases,
                total_deaths: 0.0,
                total_vaccinations: 0.0,
                new_cases: 0.0,
                new_deaths: 0.0,
                population: None,
                hosp_patients: None,
                icu_patients: None,
            },
            metrics: DerivedMetrics::default(),
        }
    }

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for day in 1..=5 {
            records.push(record("India", "IND", day, day as f64 * 10.0));
        }
        for day in 1..=5 {
            records.push(record("Kenya", "KEN", day, day as f64));
        }
        Dataset {
            records,
            has_hospital_data: false,
        }
    }

    fn range(start: u32, end: u32) -> DateRange {
        DateRange::new(d(start), d(end)).unwrap()
    }

    #[test]
    fn filters_by_country_and_inclusive_range() {
        let view = select(&dataset(), &Selection::new(["kenya"], range(2, 4)));
        let days: Vec<NaiveDate> = view.records.iter().map(EnrichedRecord::date).collect();
        assert_eq!(days, vec![d(2), d(3), d(4)]);
        assert!(view.records.iter().all(|r| r.country() == "Kenya"));
    }

    #[test]
    fn matches_iso_codes() {
        let view = select(&dataset(), &Selection::new(["IND"], range(1, 5)));
        assert_eq!(view.len(), 5);
        assert_eq!(view.countries(), vec!["India"]);
    }

    #[test]
    fn empty_and_unknown_selections_yield_empty_views() {
        let empty = select(&dataset(), &Selection::new(Vec::<String>::new(), range(1, 5)));
        assert!(empty.is_empty());

        let unknown = select(&dataset(), &Selection::new(["Atlantis"], range(1, 5)));
        assert!(unknown.is_empty());
    }

    #[test]
    fn reselecting_is_idempotent() {
        let selection = Selection::new(["India", "Kenya"], range(2, 3));
        let once = select(&dataset(), &selection);
        let twice = reselect(&once, &selection);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }

    #[test]
    fn map_snapshot_keeps_latest_record_with_coverage() {
        let mut ds = dataset();
        for r in ds.records.iter_mut() {
            if r.date() <= d(4) {
                r.metrics.vaccination_pct = Some(r.date().day() as f64);
            }
        }
        ds.records[9].record.iso_code = None;

        let view = select(&ds, &Selection::new(["India", "Kenya"], range(1, 5)));
        let map = map_snapshot(&view);

        assert_eq!(map.len(), 2);
        assert_eq!(map[0].iso_code, "IND");
        assert_eq!(map[0].date, d(4));
        assert_eq!(map[0].vaccination_pct, 4.0);
        assert_eq!(map[1].country, "Kenya");
        assert_eq!(map[1].date, d(4));
    }
}
