//! # Bookmark Tree Document
//!
//! [`BookmarkTree`] is the serializable document behind [`super::tree_store::TreeStore`].
//! It keeps every node in a flat map keyed by id, and every container keeps the
//! ordered list of its children's ids. Parent links and child lists are kept in
//! sync by the mutating methods; nothing else writes to them.
//!
//! ## Move Semantics
//!
//! `move_node(id, {parent_id, index})` removes the node from its current sibling
//! list first, then inserts it at `min(index, len)` of the destination list
//! (`None` appends). The index is therefore a *final* position, which is exactly
//! what [`crate::drag::resolver::resolve_final_index`] produces.
//!
//! The tree refuses moves that would corrupt it (moving the root sentinel,
//! dropping into an item, a folder into its own subtree). The drag engine
//! rejects those earlier; these checks keep direct callers honest too.

use crate::error::{Result, ShelfError};
use crate::model::{BookmarkNode, MoveDestination, MoveResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_ROOT_ID: &str = "0";
pub const BOOKMARKS_BAR_ID: &str = "1";
pub const OTHER_BOOKMARKS_ID: &str = "2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TreeNode {
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    #[serde(default)]
    children: Vec<String>,
}

impl TreeNode {
    fn folder(title: &str, parent_id: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            url: None,
            parent_id: parent_id.map(str::to_string),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkTree {
    root_id: String,
    next_id: u64,
    nodes: BTreeMap<String, TreeNode>,
}

impl Default for BookmarkTree {
    fn default() -> Self {
        Self::with_default_roots()
    }
}

impl BookmarkTree {
    /// A tree holding only the root sentinel.
    pub fn new(root_id: &str) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.to_string(), TreeNode::folder("", None));
        Self {
            root_id: root_id.to_string(),
            next_id: 1,
            nodes,
        }
    }

    /// Root sentinel plus the two protected top-level folders.
    pub fn with_default_roots() -> Self {
        let mut root = TreeNode::folder("", None);
        root.children = vec![BOOKMARKS_BAR_ID.to_string(), OTHER_BOOKMARKS_ID.to_string()];

        let nodes = BTreeMap::from([
            (DEFAULT_ROOT_ID.to_string(), root),
            (
                BOOKMARKS_BAR_ID.to_string(),
                TreeNode::folder("Bookmarks Bar", Some(DEFAULT_ROOT_ID)),
            ),
            (
                OTHER_BOOKMARKS_ID.to_string(),
                TreeNode::folder("Other Bookmarks", Some(DEFAULT_ROOT_ID)),
            ),
        ]);
        Self {
            root_id: DEFAULT_ROOT_ID.to_string(),
            next_id: 3,
            nodes,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert a node with an explicit id, appended to `parent_id`.
    pub fn insert(
        &mut self,
        id: &str,
        parent_id: &str,
        title: &str,
        url: Option<&str>,
    ) -> Result<()> {
        if self.nodes.contains_key(id) {
            return Err(ShelfError::Store(format!("Node '{}' already exists", id)));
        }
        self.container_mut(parent_id)?.children.push(id.to_string());
        self.nodes.insert(
            id.to_string(),
            TreeNode {
                title: title.to_string(),
                url: url.map(str::to_string),
                parent_id: Some(parent_id.to_string()),
                children: Vec::new(),
            },
        );
        if let Ok(numeric) = id.parse::<u64>() {
            self.next_id = self.next_id.max(numeric + 1);
        }
        Ok(())
    }

    pub fn add_container(&mut self, parent_id: &str, title: &str) -> Result<String> {
        let id = self.allocate_id();
        self.insert(&id, parent_id, title, None)?;
        Ok(id)
    }

    pub fn add_item(&mut self, parent_id: &str, title: &str, url: &str) -> Result<String> {
        let id = self.allocate_id();
        self.insert(&id, parent_id, title, Some(url))?;
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<BookmarkNode> {
        self.nodes.get(id).map(|node| to_node(id, node))
    }

    pub fn children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>> {
        let parent = self.container(parent_id)?;
        Ok(parent
            .children
            .iter()
            .filter_map(|child| self.get(child))
            .collect())
    }

    pub fn child_ids(&self, parent_id: &str) -> Result<&[String]> {
        Ok(&self.container(parent_id)?.children)
    }

    /// Position of `id` in its parent's sibling list.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        let parent_id = self.nodes.get(id)?.parent_id.as_ref()?;
        self.nodes
            .get(parent_id)?
            .children
            .iter()
            .position(|child| child == id)
    }

    /// True if `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.nodes.get(id).and_then(|n| n.parent_id.as_deref());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if !visited.insert(parent) {
                return false;
            }
            current = self.nodes.get(parent).and_then(|n| n.parent_id.as_deref());
        }
        false
    }

    pub fn move_node(&mut self, id: &str, destination: &MoveDestination) -> Result<MoveResult> {
        if id == self.root_id {
            return Err(ShelfError::Store("The root cannot be moved".to_string()));
        }
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| ShelfError::NodeNotFound(id.to_string()))?;
        let is_container = node.url.is_none();
        let previous_parent_id = node.parent_id.clone();

        let dest = destination.parent_id.as_str();
        self.container(dest)?;
        if is_container && (dest == id || self.is_ancestor(id, dest)) {
            return Err(ShelfError::Store(format!(
                "Cannot move folder '{}' into its own subtree",
                id
            )));
        }

        // 1. Detach from the old sibling list
        let previous_index = match previous_parent_id.as_deref() {
            Some(old_parent) => {
                let siblings = &mut self.container_mut(old_parent)?.children;
                let position = siblings.iter().position(|child| child == id);
                if let Some(position) = position {
                    siblings.remove(position);
                }
                position
            }
            None => None,
        };

        // 2. Attach at the final index
        let siblings = &mut self.container_mut(dest)?.children;
        let index = destination
            .index
            .map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(index, id.to_string());

        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ShelfError::NodeNotFound(id.to_string()))?;
        node.parent_id = Some(dest.to_string());
        let node = to_node(id, node);

        Ok(MoveResult {
            node,
            parent_id: dest.to_string(),
            index,
            previous_parent_id,
            previous_index,
        })
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let candidate = self.next_id.to_string();
            self.next_id += 1;
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn container(&self, id: &str) -> Result<&TreeNode> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| ShelfError::NodeNotFound(id.to_string()))?;
        if node.url.is_some() {
            return Err(ShelfError::Store(format!("'{}' is not a folder", id)));
        }
        Ok(node)
    }

    fn container_mut(&mut self, id: &str) -> Result<&mut TreeNode> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ShelfError::NodeNotFound(id.to_string()))?;
        if node.url.is_some() {
            return Err(ShelfError::Store(format!("'{}' is not a folder", id)));
        }
        Ok(node)
    }
}

fn to_node(id: &str, node: &TreeNode) -> BookmarkNode {
    BookmarkNode {
        id: id.to_string(),
        title: node.title.clone(),
        url: node.url.clone(),
        parent_id: node.parent_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(tree: &BookmarkTree, parent: &str) -> Vec<String> {
        tree.children(parent)
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }

    fn bar_with_five() -> BookmarkTree {
        let mut tree = BookmarkTree::with_default_roots();
        for t in ["A", "B", "C", "D", "E"] {
            tree.add_item(BOOKMARKS_BAR_ID, t, &format!("https://{}.example", t))
                .unwrap();
        }
        tree
    }

    #[test]
    fn test_default_roots() {
        let tree = BookmarkTree::with_default_roots();
        assert_eq!(tree.root_id(), "0");
        assert_eq!(titles(&tree, "0"), vec!["Bookmarks Bar", "Other Bookmarks"]);
        assert_eq!(tree.get("1").unwrap().parent_id.as_deref(), Some("0"));
        assert_eq!(tree.get("0").unwrap().parent_id, None);
        assert!(tree.children("2").unwrap().is_empty());

        let mut inserted = BookmarkTree::new(DEFAULT_ROOT_ID);
        inserted.insert("1", "0", "Bookmarks Bar", None).unwrap();
        inserted.insert("2", "0", "Other Bookmarks", None).unwrap();
        assert_eq!(tree, inserted);
    }

    #[test]
    fn test_allocated_ids_skip_explicit_ones() {
        let mut tree = BookmarkTree::with_default_roots();
        let id = tree.add_container("1", "Work").unwrap();
        assert_eq!(id, "3");
        tree.insert("10", "1", "Pinned", None).unwrap();
        assert_eq!(tree.add_container("1", "Next").unwrap(), "11");
    }

    #[test]
    fn test_move_forward_uses_final_index() {
        let mut tree = bar_with_five();
        let a = tree.children("1").unwrap()[0].id.clone();

        let result = tree.move_node(&a, &MoveDestination::at("1", 2)).unwrap();

        assert_eq!(titles(&tree, "1"), vec!["B", "C", "A", "D", "E"]);
        assert_eq!(result.index, 2);
        assert_eq!(result.previous_index, Some(0));
        assert_eq!(result.previous_parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_move_append_and_clamp() {
        let mut tree = bar_with_five();
        let b = tree.children("1").unwrap()[1].id.clone();

        tree.move_node(&b, &MoveDestination::at("2", 99)).unwrap();
        assert_eq!(titles(&tree, "2"), vec!["B"]);

        let c = tree.children("1").unwrap()[1].id.clone();
        let result = tree.move_node(&c, &MoveDestination::append("2")).unwrap();
        assert_eq!(result.index, 1);
        assert_eq!(titles(&tree, "1"), vec!["A", "D", "E"]);
        assert_eq!(tree.get(&c).unwrap().parent_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_refuses_move_into_item() {
        let mut tree = bar_with_five();
        let kids = tree.children("1").unwrap();
        let err = tree
            .move_node(&kids[0].id, &MoveDestination::append(kids[1].id.clone()))
            .unwrap_err();
        assert!(err.to_string().contains("not a folder"));
    }

    #[test]
    fn test_refuses_folder_into_descendant() {
        let mut tree = BookmarkTree::with_default_roots();
        let f1 = tree.add_container("1", "F1").unwrap();
        let f2 = tree.add_container(&f1, "F2").unwrap();
        let f3 = tree.add_container(&f2, "F3").unwrap();

        assert!(tree.is_ancestor(&f1, &f3));
        assert!(tree.move_node(&f1, &MoveDestination::append(f3)).is_err());
        assert!(tree.move_node(&f1, &MoveDestination::append(f1.clone())).is_err());
    }

    #[test]
    fn test_refuses_moving_root_and_unknown_nodes() {
        let mut tree = BookmarkTree::with_default_roots();
        assert!(tree.move_node("0", &MoveDestination::append("1")).is_err());
        assert!(matches!(
            tree.move_node("404", &MoveDestination::append("1")),
            Err(ShelfError::NodeNotFound(_))
        ));
        assert!(matches!(
            tree.move_node("1", &MoveDestination::append("404")),
            Err(ShelfError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_preserves_order() {
        let tree = bar_with_five();
        let json = serde_json::to_string(&tree).unwrap();
        let back: BookmarkTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
        assert_eq!(titles(&back, "1"), vec!["A", "B", "C", "D", "E"]);
    }
}
