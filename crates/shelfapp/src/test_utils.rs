use crate::drag::{DragSession, DraggableHooks, DropZoneHooks, Validator};
use crate::model::{DragPayload, DropTarget};
use crate::store::fs::FileStore;
use crate::store::BookmarkStore;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub store: Rc<FileStore>,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let store = Rc::new(FileStore::new_fs(root.clone()));
        Self {
            _temp_dir: temp_dir,
            store,
            root,
        }
    }

    /// A fresh store over the same directory, as a new process would see it.
    pub fn reopen(self) -> Self {
        let store = Rc::new(FileStore::new_fs(self.root.clone()));
        Self { store, ..self }
    }

    /// Add a bookmark; returns its id.
    pub fn item(&self, parent: &str, title: &str, url: &str) -> String {
        self.store
            .update(|tree| tree.add_item(parent, title, url))
            .expect("failed to add item")
    }

    /// Add a folder; returns its id.
    pub fn folder(&self, parent: &str, title: &str) -> String {
        self.store
            .update(|tree| tree.add_container(parent, title))
            .expect("failed to add folder")
    }

    pub fn session(&self) -> DragSession<FileStore> {
        DragSession::new(Rc::clone(&self.store), Validator::default())
    }

    pub async fn titles(&self, parent: &str) -> Vec<String> {
        self.store
            .get_children(parent)
            .await
            .expect("failed to list children")
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    /// Register `id` as draggable under its own id, with its current position.
    pub async fn draggable(&self, session: &DragSession<FileStore>, id: &str) {
        let node = self.store.get(id).await.expect("unknown node");
        let index = match node.parent_id.as_deref() {
            Some(parent) => self
                .store
                .get_children(parent)
                .await
                .expect("failed to list siblings")
                .iter()
                .position(|n| n.id == id),
            None => None,
        };
        session.initialize_draggable(
            id,
            DragPayload::from_node(&node, index),
            DraggableHooks::new(),
        );
    }

    pub fn zone(&self, session: &DragSession<FileStore>, name: &str, target: DropTarget) {
        session.initialize_drop_zone(name, target, DropZoneHooks::new());
    }
}
