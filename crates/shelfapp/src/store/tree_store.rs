use super::backend::StorageBackend;
use super::tree::BookmarkTree;
use super::BookmarkStore;
use crate::error::{Result, ShelfError};
use crate::model::{BookmarkNode, MoveDestination, MoveResult};
use async_trait::async_trait;
use std::cell::Cell;

/// Entry key the tree document is stored under.
pub const TREE_KEY: &str = "bookmarks";

pub struct TreeStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    calls: Cell<usize>,
}

impl<B: StorageBackend> TreeStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            calls: Cell::new(0),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of `BookmarkStore` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.get()
    }

    /// Load the tree document, falling back to the default roots when the
    /// backend holds nothing yet.
    pub fn load(&self) -> Result<BookmarkTree> {
        match self.backend.read_entry(TREE_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).map_err(ShelfError::Serialization)?),
            None => Ok(BookmarkTree::with_default_roots()),
        }
    }

    pub fn save(&self, tree: &BookmarkTree) -> Result<()> {
        let raw = serde_json::to_string_pretty(tree).map_err(ShelfError::Serialization)?;
        self.backend.write_entry(TREE_KEY, &raw)
    }

    /// Load, apply `f`, and write back only if `f` succeeded.
    pub fn update<T>(&self, f: impl FnOnce(&mut BookmarkTree) -> Result<T>) -> Result<T> {
        let mut tree = self.load()?;
        let value = f(&mut tree)?;
        self.save(&tree)?;
        Ok(value)
    }

    fn count_call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

#[async_trait(?Send)]
impl<B: StorageBackend> BookmarkStore for TreeStore<B> {
    async fn get(&self, id: &str) -> Result<BookmarkNode> {
        self.count_call();
        self.load()?
            .get(id)
            .ok_or_else(|| ShelfError::NodeNotFound(id.to_string()))
    }

    async fn get_children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>> {
        self.count_call();
        self.load()?.children(parent_id)
    }

    async fn move_node(&self, id: &str, destination: &MoveDestination) -> Result<MoveResult> {
        self.count_call();
        self.update(|tree| tree.move_node(id, destination))
    }
}
