use hitboard_core::config::MalformedPolicy;
use hitboard_core::domain::Record;
use hitboard_core::error::HitboardError;
use hitboard_core::ports::{RecordRepository, Result};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::PathBuf;

/// JSON results file implementation of the RecordRepository trait
pub struct JsonRecordRepository {
    path: PathBuf,
    on_malformed: MalformedPolicy,
}

impl JsonRecordRepository {
    /// Creates a new JsonRecordRepository for the given results file
    pub fn new(path: impl Into<PathBuf>, on_malformed: MalformedPolicy) -> Self {
        Self {
            path: path.into(),
            on_malformed,
        }
    }

    /// Reads the stored entries as raw values, so entries that are not valid records survive a rewrite.
    /// A missing file or unparseable text counts as an empty history; any other
    /// read failure or a non-array payload is an error, leaving the file untouched.
    fn load_raw_history(&self) -> Result<Vec<Value>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("starting new history at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => Err(HitboardError::Malformed {
                index: None,
                reason: format!("{} does not hold a JSON array", self.path.display()),
            }),
            Err(e) => {
                tracing::warn!("starting new history, {} is not valid JSON: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }
}

fn sort_key(entry: &Value) -> &str {
    entry.get("data").and_then(Value::as_str).unwrap_or("")
}

impl RecordRepository for JsonRecordRepository {
    fn fetch_all_records(&self) -> Result<Vec<Record>> {
        let data = fs::read_to_string(&self.path)?;
        let payload: Value = serde_json::from_str(&data)?;
        let Value::Array(entries) = payload else {
            return Err(HitboardError::Malformed {
                index: None,
                reason: "expected a JSON array of records".to_string(),
            });
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Record>(entry) {
                Ok(record) => records.push(record),
                Err(e) => match self.on_malformed {
                    MalformedPolicy::Skip => {
                        tracing::warn!(index, "skipping malformed record: {}", e);
                    }
                    MalformedPolicy::Fail => {
                        return Err(HitboardError::Malformed {
                            index: Some(index),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        tracing::debug!("loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn append_records(&self, records: &[Record]) -> Result<()> {
        let mut entries = self.load_raw_history()?;
        for record in records {
            entries.push(serde_json::to_value(record)?);
        }
        // Newest first; ISO timestamps order correctly as strings
        entries.sort_by(|a, b| sort_key(b).cmp(sort_key(a)));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)?;

        tracing::info!(
            added = records.len(),
            total = entries.len(),
            "updated history at {}",
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn record(timestamp: &str, url: &str, snippet: &str) -> Record {
        Record {
            timestamp: timestamp.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
        }
    }

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_fetch_reads_records_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(
            &path,
            r#"[
                {"data": "2025-01-01T10:00:00", "url": "https://a/x.pdf", "trecho": "um"},
                {"data": "2025-02-01T10:00:00", "url": "https://a/y.pdf", "trecho": "dois", "extra": 1}
            ]"#,
        );
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Fail);
        let records = repo.fetch_all_records().unwrap();
        assert_eq!(
            records,
            vec![
                record("2025-01-01T10:00:00", "https://a/x.pdf", "um"),
                record("2025-02-01T10:00:00", "https://a/y.pdf", "dois"),
            ]
        );
    }

    #[test]
    fn test_fetch_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonRecordRepository::new(dir.path().join("none.json"), MalformedPolicy::Skip);
        assert!(matches!(repo.fetch_all_records(), Err(HitboardError::Io(_))));
    }

    #[test]
    fn test_fetch_non_array_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(&path, r#"{"data": "x"}"#);
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Skip);
        assert!(matches!(
            repo.fetch_all_records(),
            Err(HitboardError::Malformed { index: None, .. })
        ));
    }

    #[test]
    fn test_fetch_invalid_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(&path, "[{");
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Skip);
        assert!(matches!(repo.fetch_all_records(), Err(HitboardError::Json(_))));
    }

    #[test]
    fn test_fetch_skip_policy_drops_bad_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(
            &path,
            r#"[{"data": "d", "url": "u"}, 7, {"data": "d", "url": "https://a/ok", "trecho": "t"}]"#,
        );
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Skip);
        assert_eq!(
            repo.fetch_all_records().unwrap(),
            vec![record("d", "https://a/ok", "t")]
        );
    }

    #[test]
    fn test_fetch_fail_policy_reports_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(
            &path,
            r#"[{"data": "d", "url": "u", "trecho": "t"}, {"data": "d", "trecho": "t"}]"#,
        );
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Fail);
        match repo.fetch_all_records() {
            Err(HitboardError::Malformed { index, reason }) => {
                assert_eq!(index, Some(1));
                assert!(reason.contains("url"));
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_append_creates_file_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("resultados.json");
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Fail);

        repo.append_records(&[record("2025-01-01T00:00:00", "https://a/1", "um")])
            .unwrap();
        repo.append_records(&[record("2025-03-01T00:00:00", "https://a/3", "três")])
            .unwrap();
        repo.append_records(&[record("2025-02-01T00:00:00", "https://a/2", "dois")])
            .unwrap();

        let urls: Vec<String> = repo
            .fetch_all_records()
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, vec!["https://a/3", "https://a/2", "https://a/1"]);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"trecho\": \"três\""));
        assert!(raw.contains("\n  {\n    \"url\": \"https://a/3\",\n    \"data\""));
    }

    #[test]
    fn test_append_over_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(&path, "not json");
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Fail);

        repo.append_records(&[record("2025-01-01", "https://a/1", "um")])
            .unwrap();
        assert_eq!(repo.fetch_all_records().unwrap().len(), 1);
    }

    #[test]
    fn test_append_refuses_non_array_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        let before = r#"{"historico": [{"data": "2024-01-01", "url": "https://a/0", "trecho": "antigo"}]}"#;
        write(&path, before);
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Skip);

        let result = repo.append_records(&[record("2025-01-01", "https://a/1", "um")]);
        assert!(matches!(result, Err(HitboardError::Malformed { index: None, .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_append_refuses_unreadable_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        let before: &[u8] = b"[{\"trecho\": \"\xff\xfe\"}]";
        fs::write(&path, before).unwrap();
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Skip);

        let result = repo.append_records(&[record("2025-01-01", "https://a/1", "um")]);
        assert!(matches!(result, Err(HitboardError::Io(_))));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_append_preserves_malformed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.json");
        write(&path, r#"[{"url": "https://a/legacy"}]"#);
        let repo = JsonRecordRepository::new(&path, MalformedPolicy::Skip);

        repo.append_records(&[record("2025-01-01", "https://a/1", "um")])
            .unwrap();
        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1]["url"], "https://a/legacy");
    }
}
