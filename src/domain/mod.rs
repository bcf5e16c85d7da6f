//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the record shapes (`RawRecord`, `CleanRecord`, `EnrichedRecord`)
//! - the dataset/view containers and selection parameters
//! - data-quality bookkeeping (`QualityReport`, `RowError`)

pub mod types;

pub use types::*;
