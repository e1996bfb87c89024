//! # Storage Layer
//!
//! The drag engine never touches persistence directly. It talks to an abstract
//! hierarchical store through the [`BookmarkStore`] trait, which exposes exactly
//! three operations:
//!
//! - `get(id)`: a single node, including its `parent_id`
//! - `get_children(parent_id)`: the ordered sibling list of a container
//! - `move_node(id, destination)`: the only mutation the engine performs
//!
//! All three are `async`: the validator and committer suspend on them while a
//! drop is being processed. Everything runs on one thread, so the trait is
//! declared `?Send` and implementations are free to use `RefCell`.
//!
//! ## Tree Store Architecture
//!
//! The bundled implementation mirrors a split between *what* and *how*:
//!
//! 1. [`tree::BookmarkTree`]: the document (nodes, ordered children, move rules).
//! 2. [`backend::StorageBackend`]: raw keyed I/O (filesystem or memory).
//! 3. [`tree_store::TreeStore`]: loads the document, applies a change, writes it back.
//!
//! The same `StorageBackend` trait also persists folder expansion state
//! (see [`crate::expansion`]), so it is keyed rather than tree-specific.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: `TreeStore` over [`fs_backend::FsBackend`]; one JSON file per entry.
//! - [`memory::InMemoryStore`]: `TreeStore` over [`mem_backend::MemBackend`], for tests.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── bookmarks.json          # BookmarkTree document
//! ├── <expansion key>.json    # Folder expansion map
//! └── shelf.toml              # Configuration
//! ```

use crate::error::Result;
use crate::model::{BookmarkNode, MoveDestination, MoveResult};
use async_trait::async_trait;

pub mod backend;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod tree;
pub mod tree_store;

/// Abstract interface for the hierarchical bookmark store.
#[async_trait(?Send)]
pub trait BookmarkStore {
    /// Get a node by id
    async fn get(&self, id: &str) -> Result<BookmarkNode>;

    /// Ordered children of a container
    async fn get_children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>>;

    /// Move a node. A refused move comes back as `Err`.
    async fn move_node(&self, id: &str, destination: &MoveDestination) -> Result<MoveResult>;
}
