//! JSONL audit sink.
//!
//! One record per line: the event payload flattened next to `type`, `seq`
//! (per-logger counter starting at 1) and an RFC-3339 `timestamp`. Records
//! are flushed as they are written so a crashed run still leaves a readable
//! transcript.
//!
//! The first I/O failure is reported through `tracing` and disables the
//! sink; later events are dropped silently.

use factlink_application::{AuditEvent, AuditLogger};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, warn};

#[derive(Serialize)]
struct AuditRecord<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    seq: u64,
    timestamp: String,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

/// Appends audit events to a JSONL file.
pub struct JsonlAuditLogger {
    writer: Mutex<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
    seq: AtomicU64,
    disabled: AtomicBool,
}

impl JsonlAuditLogger {
    /// Open (or create) the log at `path` for appending, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "Audit log opened");

        let mut logger = Self::from_writer(BufWriter::new(file));
        logger.path = Some(path.to_path_buf());
        Ok(logger)
    }

    /// Audit into any writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            path: None,
            seq: AtomicU64::new(0),
            disabled: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True once a write has failed.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    fn record(&self, event: AuditEvent) -> AuditRecord<'static> {
        let payload = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        AuditRecord {
            event_type: event.event_type,
            seq: self.seq.fetch_add(1, Ordering::Relaxed) + 1,
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            payload,
        }
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("audit writer lock poisoned"))?;
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}

impl AuditLogger for JsonlAuditLogger {
    fn log(&self, event: AuditEvent) {
        if self.is_disabled() {
            return;
        }
        let event_type = event.event_type;
        let line = match serde_json::to_string(&self.record(event)) {
            Ok(line) => line,
            Err(e) => {
                warn!(event = event_type, error = %e, "Audit record not serializable; skipped");
                return;
            }
        };

        if let Err(e) = self.append(&line) {
            self.disabled.store(true, Ordering::Relaxed);
            warn!(
                event = event_type,
                path = ?self.path,
                error = %e,
                "Audit write failed; auditing disabled for this run"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Fails every write and counts the attempts.
    struct BrokenDisk {
        attempts: Arc<AtomicU64>,
    }

    impl Write for BrokenDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_records_carry_type_seq_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let logger = JsonlAuditLogger::open(&path).unwrap();

        logger.log(AuditEvent::new(
            "tool_call",
            json!({"phase": "discovery", "tool": "acme.vector_search_items"}),
        ));
        logger.log(AuditEvent::new("fallback", json!({"reason": "discovery failed"})));

        // Flushed per record, so readable before drop
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "tool_call");
        assert_eq!(lines[0]["seq"], 1);
        assert_eq!(lines[0]["tool"], "acme.vector_search_items");
        assert_eq!(lines[1]["seq"], 2);
        assert!(lines[1]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(logger.path(), Some(path.as_path()));
    }

    #[test]
    fn test_non_object_payload_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let logger = JsonlAuditLogger::open(&path).unwrap();

        logger.log(AuditEvent::new("note", json!("plain")));

        assert_eq!(read_lines(&path)[0]["data"], "plain");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");

        for _ in 0..2 {
            let logger = JsonlAuditLogger::open(&path).unwrap();
            logger.log(AuditEvent::new("run", json!({})));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        // Sequence restarts per logger
        assert_eq!(lines[1]["seq"], 1);
    }

    #[test]
    fn test_write_failure_disables_sink() {
        let attempts = Arc::new(AtomicU64::new(0));
        let logger = JsonlAuditLogger::from_writer(BrokenDisk {
            attempts: attempts.clone(),
        });

        logger.log(AuditEvent::new("tool_call", json!({})));
        assert!(logger.is_disabled());
        let after_first = attempts.load(Ordering::Relaxed);

        logger.log(AuditEvent::new("tool_result", json!({})));
        assert_eq!(attempts.load(Ordering::Relaxed), after_first);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        assert!(JsonlAuditLogger::open(blocker.join("audit.jsonl")).is_err());
    }
}
