//! Reading and writing record batches

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use bizdir_domain::{parse_batch, Record};

use crate::error::Result;

/// Load and validate a JSON batch of records
pub fn load_batch(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let records = parse_batch(&content)?;
    debug!(path = %path.display(), records = records.len(), "loaded batch");
    Ok(records)
}

/// Write a batch as pretty-printed JSON
pub fn save_batch(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    write_json(path, records)
}

/// Write any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    debug!(path = %path.display(), "wrote json");
    Ok(())
}

/// Copy `path` to `backup` byte for byte
pub fn backup_file(path: impl AsRef<Path>, backup: impl AsRef<Path>) -> Result<()> {
    fs::copy(path.as_ref(), backup.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DedupError;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let records = vec![
            Record::new(1, "Phở Saigon").with_address("123 Main St"),
            Record::new(2, "Lotus Nails"),
        ];

        save_batch(&path, &records).unwrap();
        let loaded = load_batch(&path).unwrap();
        assert_eq!(loaded, records);

        // Non-ASCII is written as-is
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Phở Saigon"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_batch(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, DedupError::Io(_)));
    }

    #[test]
    fn test_load_rejects_invalid_batch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]"#).unwrap();
        assert!(matches!(load_batch(&path), Err(DedupError::Ingest(_))));
    }

    #[test]
    fn test_backup_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let backup = dir.path().join("seed.json.backup");
        fs::write(&path, "[]").unwrap();
        backup_file(&path, &backup).unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), "[]");
    }
}
