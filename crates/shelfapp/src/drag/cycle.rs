use crate::error::Result;
use crate::store::BookmarkStore;
use std::collections::HashSet;

// Safety break against pathological trees (depth limit)
const MAX_DEPTH: usize = 1000;

/// Rejects moving a folder into its own subtree.
///
/// Walks the ancestor chain of the destination, one `get` per level, and reports
/// a cycle if the dragged folder shows up on it. The walk stops at the root
/// sentinel, at a node without a parent, at a node it has already visited
/// (a corrupt store), or at [`MAX_DEPTH`], so it always terminates.
pub struct CycleDetector<'a, S: BookmarkStore + ?Sized> {
    store: &'a S,
    root_id: &'a str,
}

impl<'a, S: BookmarkStore + ?Sized> CycleDetector<'a, S> {
    pub fn new(store: &'a S, root_id: &'a str) -> Self {
        Self { store, root_id }
    }

    /// True if placing `dragged_id` under `destination_id` would create a cycle.
    pub async fn creates_cycle(&self, dragged_id: &str, destination_id: &str) -> Result<bool> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = destination_id.to_string();

        for _ in 0..MAX_DEPTH {
            if current == dragged_id {
                return Ok(true);
            }
            if current == self.root_id {
                return Ok(false);
            }
            if !visited.insert(current.clone()) {
                tracing::warn!(
                    node = %current,
                    "ancestor chain revisits a node; store hierarchy looks corrupt"
                );
                return Ok(false);
            }

            let node = self.store.get(&current).await?;
            match node.parent_id {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }

        tracing::warn!(
            dragged = dragged_id,
            destination = destination_id,
            "ancestor walk hit the depth limit"
        );
        Ok(false)
    }
}
