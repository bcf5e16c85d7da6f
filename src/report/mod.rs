//! Reporting: insight summaries and formatted terminal output.

pub mod format;
pub mod insights;

pub use format::*;
pub use insights::{Insight, summarize};
