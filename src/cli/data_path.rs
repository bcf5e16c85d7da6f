//! Input CSV resolution.
//!
//! Order: `--csv`, then `$COVID_DATA_CSV` (a `.env` file is honoured), then
//! `./owid-covid-data.csv`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{DATA_PATH_ENV, DEFAULT_DATA_PATH};
use crate::error::AppError;

/// Resolve the dataset path for a run.
pub fn resolve_csv_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    if explicit.is_none() {
        dotenvy::dotenv().ok();
    }
    resolve_from(explicit, std::env::var(DATA_PATH_ENV).ok())
}

fn resolve_from(explicit: Option<&Path>, configured: Option<String>) -> Result<PathBuf, AppError> {
    if let Some(path) = explicit {
        return validate_csv_path(path);
    }

    let path = configured
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    debug!(path = %path.display(), "resolved dataset path");

    validate_csv_path(&path).map_err(|err| {
        AppError::new(
            err.exit_code(),
            format!("{err}\nPass a file with `--csv <file.csv>` or set {DATA_PATH_ENV}."),
        )
    })
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}
