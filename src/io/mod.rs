//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - view exports to CSV (`export`)
//! - choropleth snapshot JSON read/write (`map`)

pub mod export;
pub mod ingest;
pub mod map;

pub use export::*;
pub use ingest::*;
pub use map::*;
