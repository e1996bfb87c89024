//! # Insertion Index Resolution
//!
//! The pointer selects a *gap* in the sibling list as it is rendered, i.e. while
//! the dragged node is still in it. Gaps are numbered `0..=N`:
//!
//! ```text
//!   gap:  0   1   2   3   4   5
//!         | A | B | C | D | E |
//! ```
//!
//! The store wants the node's *final* index, after it has been removed from its
//! old position. Removing the source shifts every later position down by one, so
//! a gap past the source loses one:
//!
//! - `insertion_point > source_index` → `insertion_point - 1`
//! - otherwise → `insertion_point`
//!
//! Dragging `A` (0) to gap 3 gives final index 2: `[B, C, A, D, E]`.
//!
//! The gaps immediately before and after the source (`source_index` and
//! `source_index + 1`) leave the list unchanged. They are not filtered here: the
//! validator rejects them as `NoOpPosition` so the no-op is visible to the caller.

use crate::model::{DragPayload, DropTarget, MoveDestination};

/// Final structural index for moving `source_index` to gap `insertion_point`
/// within the same sibling list.
pub fn resolve_final_index(source_index: usize, insertion_point: usize) -> usize {
    if insertion_point > source_index {
        insertion_point - 1
    } else {
        insertion_point
    }
}

/// True when dropping `source_index` at `insertion_point` would not move it.
pub fn is_noop_insertion(source_index: usize, insertion_point: usize) -> bool {
    insertion_point == source_index || insertion_point.checked_sub(1) == Some(source_index)
}

/// Translate a drop target into store arguments.
///
/// Same-parent gaps are resolved against the source position; gaps in another
/// container are used as-is. Returns `None` when the target does not name a
/// destination container.
pub fn resolve_destination(payload: &DragPayload, target: &DropTarget) -> Option<MoveDestination> {
    let parent_id = target.destination_parent()?;
    let index = target.insertion_point().map(|gap| {
        let same_parent = payload.parent_id.as_deref() == Some(parent_id);
        match (same_parent, payload.source_index) {
            (true, Some(source)) => resolve_final_index(source, gap),
            _ => gap,
        }
    });
    Some(MoveDestination {
        parent_id: parent_id.to_string(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn apply(list: &[&str], source: usize, gap: usize) -> Vec<String> {
        let mut items: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        let moved = items.remove(source);
        items.insert(resolve_final_index(source, gap), moved);
        items
    }

    #[test]
    fn drag_first_to_gap_three() {
        assert_eq!(resolve_final_index(0, 3), 2);
        assert_eq!(
            apply(&["A", "B", "C", "D", "E"], 0, 3),
            vec!["B", "C", "A", "D", "E"]
        );
    }

    #[test]
    fn drag_backwards_keeps_gap() {
        assert_eq!(resolve_final_index(4, 1), 1);
        assert_eq!(
            apply(&["A", "B", "C", "D", "E"], 4, 1),
            vec!["A", "E", "B", "C", "D"]
        );
    }

    #[test]
    fn drag_to_end() {
        assert_eq!(
            apply(&["A", "B", "C", "D", "E"], 1, 5),
            vec!["A", "C", "D", "E", "B"]
        );
    }

    #[test]
    fn gaps_adjacent_to_source_are_noops() {
        assert!(is_noop_insertion(2, 2));
        assert!(is_noop_insertion(2, 3));
        assert!(!is_noop_insertion(2, 0));
        assert!(!is_noop_insertion(2, 4));
        assert_eq!(apply(&["A", "B", "C"], 1, 1), vec!["A", "B", "C"]);
        assert_eq!(apply(&["A", "B", "C"], 1, 2), vec!["A", "B", "C"]);
    }

    #[test]
    fn noop_check_handles_largest_index() {
        assert!(is_noop_insertion(usize::MAX, usize::MAX));
        assert!(!is_noop_insertion(usize::MAX, 0));
        assert!(is_noop_insertion(usize::MAX - 1, usize::MAX));
        assert!(!is_noop_insertion(usize::MAX, usize::MAX - 1));
    }

    #[test]
    fn destination_in_same_parent_is_resolved() {
        let payload = DragPayload::item("a", "A", "https://a.example").at("1", 0);
        let dest = resolve_destination(&payload, &DropTarget::within_container("1", 3)).unwrap();
        assert_eq!(dest, MoveDestination::at("1", 2));
    }

    #[test]
    fn destination_in_other_parent_keeps_gap() {
        let payload = DragPayload::item("a", "A", "https://a.example").at("1", 0);
        let dest =
            resolve_destination(&payload, &DropTarget::between_siblings("x", "2", 3)).unwrap();
        assert_eq!(dest, MoveDestination::at("2", 3));
    }

    #[test]
    fn into_container_appends() {
        let payload = DragPayload::container("f", "F").at("1", 0);
        let dest = resolve_destination(&payload, &DropTarget::into_container("2")).unwrap();
        assert_eq!(dest, MoveDestination::append("2"));
    }

    fn source_and_gap() -> impl Strategy<Value = (usize, usize, usize)> {
        (1usize..64).prop_flat_map(|n| (Just(n), 0..n, 0..=n))
    }

    proptest! {
        #[test]
        fn final_index_stays_in_bounds((n, source, gap) in source_and_gap()) {
            let index = resolve_final_index(source, gap);
            prop_assert!(index < n);
        }

        #[test]
        fn final_index_places_item_at_gap((n, source, gap) in source_and_gap()) {
            let list: Vec<usize> = (0..n).collect();
            let mut moved = list.clone();
            let item = moved.remove(source);
            moved.insert(resolve_final_index(source, gap), item);

            // Everything rendered before the gap (minus the source) stays before it.
            let before = list[..gap].iter().filter(|&&v| v != source).count();
            prop_assert_eq!(moved[before], source);
            if is_noop_insertion(source, gap) {
                prop_assert_eq!(moved, list);
            }
        }
    }
}
