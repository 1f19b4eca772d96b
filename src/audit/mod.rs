//! Best-effort append-only run logs.
//!
//! One plain-text file per key. Appends never fail the run: storage
//! problems are logged at warn level and swallowed. Reading a missing
//! key yields an empty string, not an error.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{AnnealError, Result};

/// File-backed append-only log store.
pub struct AuditLog {
    base_path: PathBuf,
}

impl AuditLog {
    /// Open (creating if needed) a log directory.
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)
            .map_err(|e| AnnealError::Storage(format!("cannot create {}: {}", base_path.display(), e)))?;
        Ok(Self { base_path })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.log", sanitize_key(key)))
    }

    /// Append a timestamped entry under `key`. Best-effort.
    pub fn append(&self, key: &str, entry: &str) {
        let path = self.entry_path(key);
        let line = format!("{} {}\n", chrono::Utc::now().to_rfc3339(), entry);

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            warn!("audit append to {} failed: {}", path.display(), e);
        }
    }

    /// Read everything logged under `key`. Missing key reads as empty.
    pub fn read(&self, key: &str) -> String {
        fs::read_to_string(self.entry_path(key)).unwrap_or_default()
    }
}

/// Keep keys filesystem-safe.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
