//! Interactive dashboard session state.
//!
//! The session borrows the immutable [`Dataset`] built at startup and keeps the
//! user's current selection. The most recent views are memoized by
//! [`Selection`] (at most [`VIEW_CACHE_CAPACITY`]); a cached view is always
//! equal to a fresh one.

use std::collections::VecDeque;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DEFAULT_COUNTRIES, DateRange, Dataset, MapEntry, Selection, View};
use crate::error::TrackerError;
use crate::report::insights::{Insight, summarize};
use crate::select::{map_snapshot, select};

/// Views kept by a session. Older ones are evicted first.
pub const VIEW_CACHE_CAPACITY: usize = 8;

pub struct DashboardSession<'a> {
    dataset: &'a Dataset,
    countries: Vec<String>,
    range: DateRange,
    show_hospital: bool,
    /// Most recently used first.
    cache: VecDeque<(Selection, Rc<View>)>,
}

impl<'a> DashboardSession<'a> {
    /// Start with the default countries over the dataset's full date span.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            range: full_span(dataset),
            show_hospital: false,
            cache: VecDeque::with_capacity(VIEW_CACHE_CAPACITY),
        }
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn set_countries<I, S>(&mut self, countries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
    }

    /// Change the date range. On error the previous range is kept.
    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), TrackerError> {
        self.range = DateRange::new(start, end)?;
        Ok(())
    }

    pub fn reset_range(&mut self) {
        self.range = full_span(self.dataset);
    }

    /// Hospital/ICU series only show when the source has them.
    pub fn set_show_hospital(&mut self, on: bool) {
        self.show_hospital = on;
    }

    pub fn show_hospital(&self) -> bool {
        self.show_hospital && self.dataset.has_hospital_data
    }

    pub fn selection(&self) -> Selection {
        Selection::new(&self.countries, self.range)
    }

    /// View for the current selection.
    pub fn current_view(&mut self) -> Rc<View> {
        let selection = self.selection();
        self.view_for(&selection)
    }

    /// View for an arbitrary selection, served from the cache when possible.
    pub fn view_for(&mut self, selection: &Selection) -> Rc<View> {
        if let Some(pos) = self.cache.iter().position(|(s, _)| s == selection) {
            if let Some(entry) = self.cache.remove(pos) {
                debug!(records = entry.1.len(), "view cache hit");
                let view = Rc::clone(&entry.1);
                self.cache.push_front(entry);
                return view;
            }
        }

        let view = Rc::new(select(self.dataset, selection));
        self.cache.push_front((selection.clone(), Rc::clone(&view)));
        self.cache.truncate(VIEW_CACHE_CAPACITY);
        debug!(records = view.len(), cached = self.cache.len(), "view computed");
        view
    }

    /// Insights for the current view; hospital findings follow the toggle.
    pub fn insights(&mut self) -> Vec<Insight> {
        let show_hospital = self.show_hospital();
        summarize(&self.current_view(), show_hospital)
    }

    pub fn map(&mut self) -> Vec<MapEntry> {
        map_snapshot(&self.current_view())
    }

    pub fn cached_views(&self) -> usize {
        self.cache.len()
    }
}

fn full_span(dataset: &Dataset) -> DateRange {
    dataset
        .date_span()
        .unwrap_or_else(|| DateRange::day(chrono::Local::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_dataset;
    use crate::io::ingest::load_records;

    fn dataset() -> Dataset {
        let csv = "\
iso_code,location,date,total_cases,new_cases,total_deaths,new_deaths,total_vaccinations,population
KEN,Kenya,2021-01-01,10,10,1,1,0,100
KEN,Kenya,2021-01-02,20,10,1,0,10,100
KEN,Kenya,2021-01-03,30,10,2,1,20,100
IND,India,2021-01-01,100,100,1,1,0,1000
IND,India,2021-01-02,200,100,4,3,100,1000
IND,India,2021-01-03,300,100,6,2,200,1000
";
        build_dataset(load_records(csv.as_bytes()).unwrap()).0
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    #[test]
    fn defaults_cover_full_span_and_ignore_missing_countries() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        assert_eq!(session.range(), DateRange::new(d(1), d(3)).unwrap());

        // "United States" is absent from the data and silently ignored.
        let view = session.current_view();
        assert_eq!(view.countries(), vec!["India", "Kenya"]);
        assert_eq!(view.len(), 6);
    }

    #[test]
    fn memoized_views_equal_fresh_selections() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        session.set_countries(["Kenya"]);
        session.set_range(d(2), d(3)).unwrap();

        let first = session.current_view();
        let second = session.current_view();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(session.cached_views(), 1);
        assert_eq!(*first, select(&ds, &session.selection()));
    }

    #[test]
    fn view_cache_stays_bounded_and_keeps_recent_views() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        let first = session.current_view();

        for start in 1..=3 {
            for end in start..=3 {
                for countries in [&["Kenya"][..], &["India"], &["Kenya", "India"]] {
                    session.set_countries(countries.iter().copied());
                    session.set_range(d(start), d(end)).unwrap();
                    let view = session.current_view();
                    assert_eq!(*view, select(&ds, &session.selection()));
                    assert!(session.cached_views() <= VIEW_CACHE_CAPACITY);
                }
            }
        }
        assert_eq!(session.cached_views(), VIEW_CACHE_CAPACITY);

        // The latest selection is still served from the cache.
        let again = session.current_view();
        assert!(Rc::ptr_eq(&again, &session.current_view()));

        // The initial view was evicted long ago and is rebuilt equal.
        session.set_countries(DEFAULT_COUNTRIES);
        session.reset_range();
        let rebuilt = session.current_view();
        assert!(!Rc::ptr_eq(&first, &rebuilt));
        assert_eq!(first, rebuilt);
    }

    #[test]
    fn invalid_range_is_reported_and_previous_range_kept() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        session.set_range(d(2), d(2)).unwrap();

        let err = session.set_range(d(3), d(1)).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidRange { .. }));
        assert_eq!(session.range(), DateRange::new(d(2), d(2)).unwrap());

        session.reset_range();
        assert_eq!(session.range(), DateRange::new(d(1), d(3)).unwrap());
    }

    #[test]
    fn empty_country_set_gives_empty_view_and_no_insights() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        session.set_countries(Vec::<String>::new());
        assert!(session.current_view().is_empty());
        assert!(session.insights().is_empty());
        assert!(session.map().is_empty());
    }

    #[test]
    fn hospital_toggle_requires_source_columns() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        session.set_show_hospital(true);
        assert!(!session.show_hospital());
    }

    #[test]
    fn map_reports_latest_coverage() {
        let ds = dataset();
        let mut session = DashboardSession::new(&ds);
        let map = session.map();
        assert_eq!(map.len(), 2);
        assert_eq!(map[0].iso_code, "IND");
        assert_eq!(map[0].date, d(3));
        assert!((map[0].vaccination_pct - 20.0).abs() < 1e-9);
        assert!((map[1].vaccination_pct - 20.0).abs() < 1e-9);
    }
}
