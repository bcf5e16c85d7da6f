//! Shared pipeline used by both the static report and the dashboard.
//!
//! Loader -> Cleaner -> MetricDeriver, run once. The front-ends then only
//! select, summarize, and present.

use std::path::Path;

use tracing::info;

use crate::clean::clean_records;
use crate::domain::{Dataset, QualityReport};
use crate::error::TrackerError;
use crate::io::ingest::{LoadedRows, load_csv};
use crate::metrics::derive_metrics;

/// Everything a front-end needs from one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: Dataset,
    pub quality: QualityReport,
}

/// Load, clean and enrich the CSV at `path`.
///
/// Only schema and I/O problems fail; row-level issues end up in the
/// [`QualityReport`].
pub fn run_pipeline(path: &Path) -> Result<PipelineOutput, TrackerError> {
    let loaded = load_csv(path)?;
    let (dataset, quality) = build_dataset(loaded);
    Ok(PipelineOutput { dataset, quality })
}

/// Clean and enrich already-loaded rows.
pub fn build_dataset(loaded: LoadedRows) -> (Dataset, QualityReport) {
    let LoadedRows {
        records,
        row_errors,
        rows_read,
        has_hospital_data,
    } = loaded;

    let cleaned = clean_records(records);
    let dataset = derive_metrics(cleaned.dataset, has_hospital_data);

    let quality = QualityReport {
        rows_read,
        row_errors,
        duplicate_rows: cleaned.duplicate_rows,
        dropped_groups: cleaned.dropped_groups,
        monotonic_clamps: cleaned.monotonic_clamps,
    };

    info!(
        records = dataset.records.len(),
        countries = dataset.countries().len(),
        rows_dropped = quality.rows_dropped(),
        groups_dropped = quality.dropped_groups.len(),
        "pipeline complete"
    );

    (dataset, quality)
}
