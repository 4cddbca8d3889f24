//! JSON file helpers
//!
//! Writes go to a sibling temp file that is synced and renamed over the
//! target, so a crash mid-write leaves the previous contents intact.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{FintrackError, FintrackResult};

fn storage_error(action: &str, path: &Path, err: impl Display) -> FintrackError {
    FintrackError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Temp file used while replacing `path`
fn staging_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Parse `path`, or `T::default()` when the file does not exist yet
pub fn read_json<T, P>(path: P) -> FintrackResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(storage_error("open", path, e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Replace `path` with the pretty-printed JSON of `data`
pub fn write_json_atomic<T, P>(path: P, data: &T) -> FintrackResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let staging = staging_path(path);
    let result = write_synced(&staging, data).and_then(|()| {
        fs::rename(&staging, path).map_err(|e| storage_error("replace", path, e))
    });
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_synced<T: Serialize>(path: &Path, data: &T) -> FintrackResult<()> {
    let file = File::create(path).map_err(|e| storage_error("create", path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| storage_error("serialize", path, e))?;
    writer.flush().map_err(|e| storage_error("flush", path, e))?;
    writer.get_ref().sync_all().map_err(|e| storage_error("sync", path, e))
}
