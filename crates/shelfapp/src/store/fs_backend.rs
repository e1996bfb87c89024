use super::backend::StorageBackend;
use crate::error::{Result, ShelfError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: one `<key>.json` file per entry under `root`.
pub struct FsBackend {
    root: PathBuf,
    name: String,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self {
            name: format!("fs:{}", root.display()),
            root,
        }
    }

    /// Override the name reported in logs (e.g. "primary", "secondary").
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(ShelfError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_entry(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(ShelfError::Io)?;
        Ok(Some(content))
    }

    fn write_entry(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        let target_path = self.entry_path(key);

        // Atomic Write
        let tmp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, value).map_err(ShelfError::Io)?;
        fs::rename(&tmp_path, target_path).map_err(ShelfError::Io)?;

        Ok(())
    }

    fn remove_entry(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(ShelfError::Io)?;
        }
        Ok(())
    }
}
