//! Read/write choropleth snapshot JSON.
//!
//! The snapshot is the dashboard's map input: latest vaccination coverage per
//! country keyed by ISO code (see `select::map_snapshot`).

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::MapEntry;
use crate::error::TrackerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    pub tool: String,
    pub metric: String,
    pub entries: Vec<MapEntry>,
}

/// Write a map snapshot JSON file.
pub fn write_map_json(path: &Path, entries: &[MapEntry]) -> Result<(), TrackerError> {
    let file = File::create(path).map_err(|e| {
        TrackerError::io(format!("Failed to create map JSON '{}'", path.display()), e)
    })?;

    let map = MapFile {
        tool: "covid-tracker".to_string(),
        metric: "vaccination_pct".to_string(),
        entries: entries.to_vec(),
    };
    serde_json::to_writer_pretty(file, &map)?;
    Ok(())
}

/// Read a map snapshot JSON file.
pub fn read_map_json(path: &Path) -> Result<MapFile, TrackerError> {
    let file = File::open(path)
        .map_err(|e| TrackerError::io(format!("Failed to open map JSON '{}'", path.display()), e))?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn map_json_round_trips_through_disk() {
        let entries = vec![MapEntry {
            iso_code: "KEN".to_string(),
            country: "Kenya".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
            vaccination_pct: 31.5,
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");

        write_map_json(&path, &entries).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"date\": \"2022-06-01\""));

        let back = read_map_json(&path).unwrap();
        assert_eq!(back.metric, "vaccination_pct");
        assert_eq!(back.entries, entries);
    }
}
