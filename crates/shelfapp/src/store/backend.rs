use crate::error::Result;
use std::rc::Rc;

/// Abstract interface for raw keyed storage I/O.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`super::tree_store::TreeStore`] and [`crate::expansion::ExpansionStateStore`]
/// handle the "what". Entries are opaque strings (JSON in practice).
pub trait StorageBackend {
    /// Short human-readable name used in logs.
    fn name(&self) -> &str;

    /// Read an entry.
    /// Returns Ok(None) if the entry does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_entry(&self, key: &str) -> Result<Option<String>>;

    /// Write an entry.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_entry(&self, key: &str, value: &str) -> Result<()>;

    /// Remove an entry. Removing a missing entry is not an error.
    fn remove_entry(&self, key: &str) -> Result<()>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_entry(&self, key: &str) -> Result<Option<String>> {
        (**self).read_entry(key)
    }

    fn write_entry(&self, key: &str, value: &str) -> Result<()> {
        (**self).write_entry(key, value)
    }

    fn remove_entry(&self, key: &str) -> Result<()> {
        (**self).remove_entry(key)
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Rc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_entry(&self, key: &str) -> Result<Option<String>> {
        (**self).read_entry(key)
    }

    fn write_entry(&self, key: &str, value: &str) -> Result<()> {
        (**self).write_entry(key, value)
    }

    fn remove_entry(&self, key: &str) -> Result<()> {
        (**self).remove_entry(key)
    }
}
