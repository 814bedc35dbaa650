use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

use super::Request;

pub const PRIMARY_FILE: &str = "published.json";
pub const BACKUP_FILE: &str = "published_backup.json";

/// Published items on disk: an authoritative file plus a copy written on every save.
#[derive(Clone, Debug)]
pub struct Storage {
    primary: PathBuf,
    backup: PathBuf,
}

impl Storage {
    pub fn new(folder: &Path) -> Self {
        Self {
            primary: folder.join(PRIMARY_FILE),
            backup: folder.join(BACKUP_FILE),
        }
    }

    pub fn load(&self) -> Result<Vec<Request>, StorageError> {
        let raw = match std::fs::read_to_string(&self.primary) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.primary.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
            path: self.primary.clone(),
            source,
        })
    }

    /// Rewrites both files in full. There is no atomic rename, so a crash mid-write can leave
    /// either file truncated; the other one is usually intact.
    pub fn save(&self, items: &[&Request]) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(items)?;

        for path in [&self.backup, &self.primary] {
            std::fs::write(path, &body).map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn temp_folder() -> PathBuf {
    let folder = std::env::temp_dir().join(format!("drop-queue-bot-{:016x}", rand::random::<u64>()));
    std::fs::create_dir_all(&folder).unwrap();
    folder
}
