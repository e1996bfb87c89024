use super::mem_backend::MemBackend;
use super::tree::BookmarkTree;
use super::tree_store::TreeStore;
use crate::error::Result;

pub type InMemoryStore = TreeStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        TreeStore::with_backend(MemBackend::new())
    }

    pub fn from_tree(tree: &BookmarkTree) -> Result<Self> {
        let store = Self::new();
        store.save(tree)?;
        Ok(store)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::store::tree::BOOKMARKS_BAR_ID;

    /// Builds trees with predictable ids.
    ///
    /// Ids are handed out by the tree (numeric, ascending), so a fixture built
    /// in the same order always produces the same ids.
    pub struct StoreFixture {
        pub tree: BookmarkTree,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                tree: BookmarkTree::with_default_roots(),
            }
        }

        /// Items titled after `titles` under the bookmarks bar, with `https://<title>.example` urls.
        pub fn with_bar_items(mut self, titles: &[&str]) -> Self {
            for title in titles {
                self.tree
                    .add_item(
                        BOOKMARKS_BAR_ID,
                        title,
                        &format!("https://{}.example", title.to_lowercase()),
                    )
                    .unwrap();
            }
            self
        }

        pub fn with_node(mut self, id: &str, parent: &str, title: &str, url: Option<&str>) -> Self {
            self.tree.insert(id, parent, title, url).unwrap();
            self
        }

        /// Id of the child titled `title` under `parent`.
        pub fn id_of(&self, parent: &str, title: &str) -> String {
            self.tree
                .children(parent)
                .unwrap()
                .into_iter()
                .find(|n| n.title == title)
                .map(|n| n.id)
                .unwrap()
        }

        pub fn build(self) -> InMemoryStore {
            InMemoryStore::from_tree(&self.tree).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use crate::error::ShelfError;
    use crate::store::BookmarkStore;

    #[tokio::test]
    async fn test_get_not_found() {
        let store = InMemoryStore::new();
        match store.get("404").await {
            Err(ShelfError::NodeNotFound(id)) => assert_eq!(id, "404"),
            other => panic!("Expected NodeNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fixture_builds_ordered_bar() {
        let fixture = StoreFixture::new().with_bar_items(&["A", "B", "C"]);
        let b = fixture.id_of("1", "B");
        let store = fixture.build();

        let titles: Vec<String> = store
            .get_children("1")
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        let node = store.get(&b).await.unwrap();
        assert_eq!(node.url.as_deref(), Some("https://b.example"));
    }

    #[tokio::test]
    async fn test_children_of_item_is_an_error() {
        let fixture = StoreFixture::new().with_node("50", "1", "Item", Some("https://x.example"));
        let store = fixture.build();
        assert!(store.get_children("50").await.is_err());
    }
}
