//! Persisting finished sessions: an append-only CSV log for the history
//! and an optional JSON dump of the full breakdown.

use chrono::Local;
use csv::WriterBuilder;
use directories::ProjectDirs;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use crate::session::SessionResult;

/// One CSV row per finished session.
#[derive(Debug, Serialize)]
struct LogRow {
    timestamp: String,
    wpm: f64,
    accuracy: f64,
    actual_duration: f64,
    nominal_duration: Option<f64>,
    text_hash: String,
}

/// Stable identifier for a reference text, so historical rows for the
/// same text can be grouped without storing the text itself.
pub fn text_hash(reference: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    reference.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "typetest") {
            pd.config_dir().join("log.csv")
        } else {
            PathBuf::from("typetest_log.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, emitting the header only when the file is created.
    pub fn append(
        &self,
        result: &SessionResult,
        reference: &str,
        nominal_duration: Option<f64>,
    ) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(LogRow {
                timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                wpm: result.speed.wpm,
                accuracy: result.accuracy,
                actual_duration: result.duration,
                nominal_duration,
                text_hash: format!("{:016x}", text_hash(reference)),
            })
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writer.flush()
    }
}

/// Dump the full session breakdown as pretty-printed JSON.
pub fn write_json_report(path: &Path, result: &SessionResult) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(result)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    fs::write(path, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Event, Session, SessionConfig};
    use tempfile::tempdir;

    fn finished_result() -> (SessionResult, String) {
        let reference = "hi".to_string();
        let mut session = Session::new(reference.clone(), &SessionConfig::default()).unwrap();
        let _ = session.feed(Event::Char('h')).unwrap();
        let _ = session.feed(Event::Char('i')).unwrap();
        (session.submit(), reference)
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::with_path(dir.path().join("log.csv"));
        let (result, reference) = finished_result();

        log.append(&result, &reference, None).unwrap();
        log.append(&result, &reference, Some(60.0)).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,wpm,accuracy"));
        // empty field for an untimed session, the nominal limit otherwise
        assert!(lines[1].contains(",,"));
        assert!(lines[2].contains("60.0"));
    }

    #[test]
    fn rows_carry_the_text_hash() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::with_path(dir.path().join("log.csv"));
        let (result, reference) = finished_result();
        log.append(&result, &reference, None).unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let expected = format!("{:016x}", text_hash(&reference));
        assert!(contents.contains(&expected));
    }

    #[test]
    fn text_hash_is_stable_and_discriminating() {
        assert_eq!(text_hash("the quick fox"), text_hash("the quick fox"));
        assert_ne!(text_hash("the quick fox"), text_hash("the quick dog"));
    }

    #[test]
    fn json_report_contains_the_breakdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("report.json");
        let (result, _) = finished_result();

        write_json_report(&path, &result).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["accuracy"], 100.0);
        assert_eq!(parsed["correct_words"][0], "hi");
        assert!(parsed["speed"]["true_wpm"].is_number());
    }
}
