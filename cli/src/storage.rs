//! File-backed key-value storage: one `<key>.json` file per slot

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shared::{KeyValueStore, RegisterError, RegisterResult};

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> RegisterResult<PathBuf> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
        if key.is_empty() || !key.chars().all(allowed) {
            return Err(RegisterError::Persistence(format!(
                "Invalid storage key '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> RegisterResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // Invalid UTF-8 is corrupt content, not a broken backend
            Err(e) if e.kind() == ErrorKind::InvalidData => Ok(Some(String::new())),
            Err(e) => Err(RegisterError::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Writes to a temporary file first so a failed write leaves the old
    /// content in place
    fn set_item(&mut self, key: &str, value: &str) -> RegisterResult<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        let persist = || -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            fs::write(&tmp, value)?;
            fs::rename(&tmp, &path)
        };

        persist().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            RegisterError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Wrote storage slot");
        Ok(())
    }
}
