use crate::errors::RiskEngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonlLogger {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub min_level: LogLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent<'a> {
    pub level: &'a str,
    pub event_type: &'a str,
    pub payload: Value,
}

impl JsonlLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_payload_bytes: 4096,
            min_level: LogLevel::Info,
        }
    }

    pub fn enabled(&self, level: &str) -> bool {
        LogLevel::parse(level).map_or(true, |level| level >= self.min_level)
    }

    pub fn append(&self, event: &LogEvent<'_>) -> Result<(), RiskEngineError> {
        if !self.enabled(event.level) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| RiskEngineError::Io(e.to_string()))?;
            }
        }
        let truncated = truncate_json(event.payload.clone(), self.max_payload_bytes);
        let line = serde_json::to_string(&LogEvent {
            level: event.level,
            event_type: event.event_type,
            payload: truncated,
        })
        .map_err(|e| RiskEngineError::Serialization(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RiskEngineError::Io(e.to_string()))?;
        // One write per line keeps concurrent appends from interleaving.
        file.write_all(format!("{line}\n").as_bytes())
            .map_err(|e| RiskEngineError::Io(e.to_string()))
    }
}

static RUN_LOG: OnceLock<JsonlLogger> = OnceLock::new();

/// Routes every later `append_run_log` call to `logger` for the rest of the process. Only the
/// first install takes effect; returns `false` when a run log was already installed.
pub fn install_run_log(logger: JsonlLogger) -> bool {
    RUN_LOG.set(logger).is_ok()
}

/// No-op until a run log is installed. Lock-free, so scoring threads never wait on each other
/// here. Write failures are swallowed so scoring never fails on logging.
pub fn append_run_log(level: &str, event_type: &str, payload: Value) {
    let Some(logger) = RUN_LOG.get() else {
        return;
    };
    if !logger.enabled(level) {
        return;
    }
    let _ = logger.append(&LogEvent {
        level,
        event_type,
        payload,
    });
}

fn truncate_json(value: Value, max_bytes: usize) -> Value {
    let rendered = serde_json::to_string(&value).unwrap_or_default();
    if rendered.len() <= max_bytes {
        return value;
    }
    let mut cut = max_bytes.saturating_sub(3);
    while cut > 0 && !rendered.is_char_boundary(cut) {
        cut -= 1;
    }
    Value::String(format!("{}...", &rendered[..cut]))
}

#[cfg(test)]
mod tests {
    use super::{JsonlLogger, LogEvent, LogLevel};
    use serde_json::json;

    #[test]
    fn logger_truncates_large_payloads_and_writes_jsonl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("run.jsonl");
        let mut logger = JsonlLogger::new(&path);
        logger.max_payload_bytes = 20;

        logger
            .append(&LogEvent {
                level: "info",
                event_type: "prioritization.completed",
                payload: json!({"text": "abcdefghijklmnopqrstuvwxyz"}),
            })
            .expect("append");

        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("\"event_type\":\"prioritization.completed\""));
        assert!(text.contains("..."));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn events_below_min_level_are_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.jsonl");
        let logger = JsonlLogger::new(&path);

        logger
            .append(&LogEvent {
                level: "debug",
                event_type: "risk_model.scored",
                payload: json!({}),
            })
            .expect("append");
        assert!(!path.exists());

        logger
            .append(&LogEvent {
                level: "warn",
                event_type: "config.loaded",
                payload: json!({}),
            })
            .expect("append");
        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn concurrent_appends_keep_each_record_on_its_own_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.jsonl");
        let logger = JsonlLogger::new(&path);

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let logger = &logger;
                scope.spawn(move || {
                    for n in 0..50 {
                        logger
                            .append(&LogEvent {
                                level: "info",
                                event_type: "risk_model.scored",
                                payload: json!({"worker": worker, "n": n}),
                            })
                            .expect("append");
                    }
                });
            }
        });

        let text = std::fs::read_to_string(&path).expect("read");
        let records = text
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("whole record"))
            .collect::<Vec<_>>();
        assert_eq!(records.len(), 400);
        assert!(records.iter().all(|r| r["event_type"] == "risk_model.scored"));
    }

    #[test]
    fn level_parsing_is_lenient() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("trace"), None);
        assert!(LogLevel::Error > LogLevel::Info);
    }
}
