//! `covid-tracker` library crate.
//!
//! Both binaries (`covid-report`, `covid-dashboard`) are thin wrappers so that:
//!
//! - the load/clean/derive pipeline is testable without spawning processes
//! - the report and the dashboard share one pipeline and one selector

pub mod app;
pub mod clean;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod select;
