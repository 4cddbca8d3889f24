//! Append-only JSONL audit logger

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{FintrackError, FintrackResult};

use super::entry::AuditEntry;

/// Writes audit entries to a log file, one JSON object per line.
///
/// A logger without a path is disabled: writes are accepted and dropped.
/// In-memory storage uses this so tests leave nothing on disk.
pub struct AuditLogger {
    log_path: Option<PathBuf>,
    // serialises appends from concurrent services
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path: Some(log_path),
            write_lock: Mutex::new(()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            log_path: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.log_path.is_some()
    }

    /// Append one entry and flush it
    pub fn log(&self, entry: &AuditEntry) -> FintrackResult<()> {
        let Some(path) = &self.log_path else {
            return Ok(());
        };

        let json = serde_json::to_string(entry)
            .map_err(|e| FintrackError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| FintrackError::Storage(format!("Audit log lock poisoned: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| FintrackError::Io(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| FintrackError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| FintrackError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Read every entry, oldest first
    pub fn read_all(&self) -> FintrackResult<Vec<AuditEntry>> {
        let Some(path) = &self.log_path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)
            .map_err(|e| FintrackError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                FintrackError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                FintrackError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> FintrackResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}
