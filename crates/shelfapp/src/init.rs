//! # Context Initialization
//!
//! Everything a client needs is wired up once by [`initialize`] and handed back
//! as a [`ShelfContext`]: the bookmark store, the effective configuration, and
//! factories for the per-session components (drag session, expansion state,
//! auto-save coordinator).
//!
//! ## Data Directory Resolution
//!
//! 1. `data_override` (the CLI's `--data`), used as-is.
//! 2. `SHELF_DATA` environment variable. Primarily used by tests to isolate state.
//! 3. OS-appropriate data directory via the `directories` crate.
//!
//! The directory is created if missing. Configuration is read from
//! `<data dir>/shelf.toml`; missing or unreadable config falls back to defaults.
//!
//! ## Expansion Backends
//!
//! Folder expansion state is written to the first backend that accepts it:
//!
//! | Order | Backend | Location |
//! |-------|---------|----------|
//! | 1 | `data` | `<data dir>/` |
//! | 2 | `cache` | OS cache dir, or `<data dir>/cache/` when the data dir was overridden |
//! | 3 | `memory` | this process only |

use crate::autosave::{AutoSaveConfig, AutoSaveCoordinator};
use crate::config::ShelfConfig;
use crate::drag::DragSession;
use crate::error::{Result, ShelfError};
use crate::expansion::ExpansionStateStore;
use crate::store::backend::StorageBackend;
use crate::store::fs::FileStore;
use crate::store::fs_backend::FsBackend;
use crate::store::mem_backend::MemBackend;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const DATA_ENV: &str = "SHELF_DATA";
pub const CONFIG_FILE: &str = "shelf.toml";

pub struct ShelfContext {
    pub store: Rc<FileStore>,
    pub config: ShelfConfig,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl ShelfContext {
    pub fn drag_session(&self) -> DragSession<FileStore> {
        DragSession::from_config(Rc::clone(&self.store), &self.config)
    }

    pub fn expansion(&self) -> ExpansionStateStore {
        let backends: Vec<Box<dyn StorageBackend>> = vec![
            Box::new(FsBackend::new(self.data_dir.clone()).with_name("data")),
            Box::new(FsBackend::new(self.cache_dir.clone()).with_name("cache")),
            Box::new(MemBackend::named("memory")),
        ];
        ExpansionStateStore::load(&self.config.expansion_key, backends)
    }

    /// Must be used from inside a `tokio::task::LocalSet`.
    pub fn autosave<F, Fut>(&self, save: F) -> AutoSaveCoordinator
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<()>> + 'static,
    {
        AutoSaveCoordinator::new(AutoSaveConfig::from(&self.config), save)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }
}

/// Resolve the data and cache directories. See the module docs for the order.
pub fn resolve_dirs(data_override: Option<PathBuf>) -> Result<(PathBuf, PathBuf)> {
    let explicit = data_override.or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from));
    if let Some(data_dir) = explicit {
        let cache_dir = data_dir.join("cache");
        return Ok((data_dir, cache_dir));
    }

    let dirs = ProjectDirs::from("com", "shelf", "shelf").ok_or_else(|| {
        ShelfError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine a data directory; pass --data or set SHELF_DATA",
        ))
    })?;
    Ok((dirs.data_dir().to_path_buf(), dirs.cache_dir().to_path_buf()))
}

pub fn load_config(data_dir: &Path) -> ShelfConfig {
    Clapfig::builder()
        .app_name("shelf")
        .file_name(CONFIG_FILE)
        .search_paths(vec![SearchPath::Path(data_dir.to_path_buf())])
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, dir = %data_dir.display(), "ignoring unreadable config, using defaults");
            ShelfConfig::default()
        })
}

/// Initialize the shelf context: directories, configuration, store.
pub fn initialize(data_override: Option<PathBuf>) -> Result<ShelfContext> {
    let (data_dir, cache_dir) = resolve_dirs(data_override)?;
    std::fs::create_dir_all(&data_dir)?;

    let config = load_config(&data_dir);
    tracing::debug!(data_dir = %data_dir.display(), edit_mode = config.edit_mode, "shelf initialized");

    let store = Rc::new(FileStore::new_fs(data_dir.clone()));
    Ok(ShelfContext {
        store,
        config,
        data_dir,
        cache_dir,
    })
}
