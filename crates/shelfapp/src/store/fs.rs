use super::fs_backend::FsBackend;
use super::tree_store::TreeStore;
use std::path::PathBuf;

/// Production store: the tree document lives in `<data dir>/bookmarks.json`.
pub type FileStore = TreeStore<FsBackend>;

impl FileStore {
    pub fn new_fs(data_dir: PathBuf) -> Self {
        TreeStore::with_backend(FsBackend::new(data_dir).with_name("bookmarks"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MoveDestination;
    use crate::store::tree_store::TREE_KEY;
    use crate::store::BookmarkStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new_fs(dir.path().to_path_buf());
        let id = store
            .update(|tree| tree.add_container("1", "Reading"))
            .unwrap();
        store
            .move_node(&id, &MoveDestination::at("2", 0))
            .await
            .unwrap();

        let reopened = FileStore::new_fs(dir.path().to_path_buf());
        let node = reopened.get(&id).await.unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("2"));
        assert!(dir.path().join(format!("{}.json", TREE_KEY)).exists());
    }
}
