//! Generated-JSON artifact management
//!
//! Converted records are written under the output directory mirroring their
//! ResourceID path. Deleting a record removes its file and prunes ancestor
//! directories that became empty, stopping at the first directory that still
//! holds other entries (and never climbing past the output root).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::Error;

fn record_path(output_dir: &Path, resource_id: &str) -> PathBuf {
    let relative = resource_id.trim_start_matches("spase://");
    output_dir.join(format!("{relative}.json"))
}

/// Write a converted record, creating parent directories as needed.
pub fn write_record_json(
    output_dir: &Path,
    resource_id: &str,
    record: &Value,
) -> Result<PathBuf, Error> {
    let path = record_path(output_dir, resource_id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_json::to_string_pretty(record).unwrap_or_default())?;
    info!(path = %path.display(), "wrote converted record");
    Ok(path)
}

/// Remove a converted record and prune now-empty parent directories.
pub fn remove_record_json(output_dir: &Path, resource_id: &str) -> Result<(), Error> {
    let path = record_path(output_dir, resource_id);
    fs::remove_file(&path)?;
    info!(path = %path.display(), "deleted converted record");

    let mut dir = path.parent();
    while let Some(current) = dir {
        if current == output_dir {
            break;
        }
        if fs::read_dir(current)?.next().is_some() {
            break;
        }
        fs::remove_dir(current)?;
        dir = current.parent();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_then_remove_prunes_empty_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let record = json!({"@type": "Dataset"});
        let path = write_record_json(
            dir.path(),
            "spase://NASA/NumericalData/ACE/MAG/L2",
            &record,
        )
        .unwrap();
        assert!(path.is_file());

        remove_record_json(dir.path(), "spase://NASA/NumericalData/ACE/MAG/L2").unwrap();
        assert!(!path.exists());
        // all emptied ancestors are gone, the output root stays
        assert!(!dir.path().join("NASA").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_remove_stops_at_nonempty_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let record = json!({});
        write_record_json(dir.path(), "spase://NASA/NumericalData/ACE/MAG", &record).unwrap();
        write_record_json(dir.path(), "spase://NASA/NumericalData/ACE/SWE", &record).unwrap();

        remove_record_json(dir.path(), "spase://NASA/NumericalData/ACE/MAG").unwrap();
        assert!(!dir.path().join("NASA/NumericalData/ACE/MAG.json").exists());
        assert!(dir.path().join("NASA/NumericalData/ACE/SWE.json").exists());
        assert!(dir.path().join("NASA/NumericalData/ACE").exists());
    }

    #[test]
    fn test_remove_missing_record_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = remove_record_json(dir.path(), "spase://NASA/NumericalData/Nope").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
