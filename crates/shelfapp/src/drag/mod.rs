//! # Drag Engine
//!
//! Turns pointer gestures into validated store moves. Leaves first:
//!
//! - [`resolver`]: gap → final structural index. Pure, no store.
//! - [`cycle`]: ancestor walk that refuses folder-into-own-subtree moves.
//! - [`validate`]: the ordered rule pipeline, with a synchronous fast path.
//! - [`commit`]: performs the move and emits `moved`.
//! - [`events`]: named events (`dragstart`, `dragenter`, `dragleave`, `drop`, `moved`).
//! - [`session`]: the state machine the host drives with pointer events.
//!
//! ## Flow
//!
//! ```text
//! drag_start ─► drag_enter/leave (fast path) ─► drop ─► validate (async) ─► commit ─► "moved"
//! ```
//!
//! Within one drag, fast validation always precedes full validation, which always
//! precedes the commit.

pub mod commit;
pub mod cycle;
pub mod events;
pub mod resolver;
pub mod session;
pub mod validate;

pub use commit::MutationCommitter;
pub use cycle::CycleDetector;
pub use events::{DragEvent, DragEventKind, EventBus, Subscription};
pub use resolver::{is_noop_insertion, resolve_destination, resolve_final_index};
pub use session::{DragSession, DragState, DraggableHooks, DropOutcome, DropZoneHooks};
pub use validate::{
    BlockReason, GuardPolicy, Rule, ValidationOutcome, Validator, WarningReason,
};
