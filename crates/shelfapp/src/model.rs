//! # Domain Model: Nodes, Payloads and Drop Targets
//!
//! Shelf works on a one-level hierarchy of named containers (folders) holding
//! items (bookmarks). Everything the drag engine reasons about is expressed with
//! the types in this module.
//!
//! ## Nodes
//!
//! A [`BookmarkNode`] is what the store hands back. A node without a `url` is a
//! container; a node with one is an item. The forest root is a sentinel node
//! (id `"0"` by default) that is never moved and never receives drops.
//!
//! ## Drag Payload
//!
//! A [`DragPayload`] is a snapshot of the node being dragged, taken at drag start.
//! It lives for exactly one drag and is owned by the active
//! [`crate::drag::DragSession`]. `source_index` is the node's position in its
//! sibling list *before* removal.
//!
//! ## Drop Targets
//!
//! A [`DropTarget`] describes where the pointer released the payload:
//!
//! | Kind | `target_id` | Destination parent | Destination index |
//! |------|-------------|--------------------|-------------------|
//! | `IntoContainer` | the container | `target_id` | append |
//! | `BetweenSiblings` | the neighbouring node | `parent_id` | `target_index` (a gap) |
//! | `WithinContainerAtIndex` | the container | `target_id` | `target_index` (a gap) |
//!
//! Gaps are insertion points `0..=N` in the sibling list *while it still contains
//! the source*. Converting a gap into a structural index is the job of
//! [`crate::drag::resolver`].

use serde::{Deserialize, Serialize};

/// A node as returned by a [`crate::store::BookmarkStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl BookmarkNode {
    pub fn is_container(&self) -> bool {
        self.url.is_none()
    }

    pub fn kind(&self) -> PayloadKind {
        if self.is_container() {
            PayloadKind::Container
        } else {
            PayloadKind::Item
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Item,
    Container,
}

/// Snapshot of the dragged node for the duration of one drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub kind: PayloadKind,
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub parent_id: Option<String>,
    pub source_index: Option<usize>,
}

impl DragPayload {
    pub fn item(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Item,
            id: id.into(),
            title: title.into(),
            url: Some(url.into()),
            parent_id: None,
            source_index: None,
        }
    }

    pub fn container(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Container,
            id: id.into(),
            title: title.into(),
            url: None,
            parent_id: None,
            source_index: None,
        }
    }

    /// Builds a payload from a store node and its current sibling position.
    pub fn from_node(node: &BookmarkNode, source_index: Option<usize>) -> Self {
        Self {
            kind: node.kind(),
            id: node.id.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            parent_id: node.parent_id.clone(),
            source_index,
        }
    }

    pub fn at(mut self, parent_id: impl Into<String>, source_index: usize) -> Self {
        self.parent_id = Some(parent_id.into());
        self.source_index = Some(source_index);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind == PayloadKind::Container
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropKind {
    IntoContainer,
    BetweenSiblings,
    WithinContainerAtIndex,
}

/// Where a payload was released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub kind: DropKind,
    pub target_id: String,
    pub parent_id: Option<String>,
    pub target_index: Option<usize>,
}

impl DropTarget {
    pub fn into_container(container_id: impl Into<String>) -> Self {
        Self {
            kind: DropKind::IntoContainer,
            target_id: container_id.into(),
            parent_id: None,
            target_index: None,
        }
    }

    /// A gap next to `sibling_id` inside `parent_id`.
    pub fn between_siblings(
        sibling_id: impl Into<String>,
        parent_id: impl Into<String>,
        gap: usize,
    ) -> Self {
        Self {
            kind: DropKind::BetweenSiblings,
            target_id: sibling_id.into(),
            parent_id: Some(parent_id.into()),
            target_index: Some(gap),
        }
    }

    pub fn within_container(container_id: impl Into<String>, gap: usize) -> Self {
        Self {
            kind: DropKind::WithinContainerAtIndex,
            target_id: container_id.into(),
            parent_id: None,
            target_index: Some(gap),
        }
    }

    /// The container that will hold the payload after the move.
    ///
    /// `None` only for a malformed `BetweenSiblings` target without a parent.
    pub fn destination_parent(&self) -> Option<&str> {
        match self.kind {
            DropKind::IntoContainer | DropKind::WithinContainerAtIndex => {
                Some(self.target_id.as_str())
            }
            DropKind::BetweenSiblings => self.parent_id.as_deref(),
        }
    }

    /// The chosen gap, if the target addresses one.
    pub fn insertion_point(&self) -> Option<usize> {
        match self.kind {
            DropKind::IntoContainer => None,
            DropKind::BetweenSiblings | DropKind::WithinContainerAtIndex => self.target_index,
        }
    }
}

/// Arguments for [`crate::store::BookmarkStore::move_node`].
///
/// `index` is the final position in the destination list once the node has been
/// removed from its old place. `None` appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDestination {
    pub parent_id: String,
    pub index: Option<usize>,
}

impl MoveDestination {
    pub fn append(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            index: None,
        }
    }

    pub fn at(parent_id: impl Into<String>, index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            index: Some(index),
        }
    }
}

/// What the store reports after a successful move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub node: BookmarkNode,
    pub parent_id: String,
    pub index: usize,
    pub previous_parent_id: Option<String>,
    pub previous_index: Option<usize>,
}
