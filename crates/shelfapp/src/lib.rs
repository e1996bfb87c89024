//! # Shelf Architecture
//!
//! Shelf is a **UI-agnostic reordering engine** for bookmark-like entries kept in
//! named folders. It owns the hard part of drag-and-drop: turning "the pointer let
//! go between B and C" into a safe, exact store mutation. Rendering, theming and
//! input plumbing belong to the host; the bundled CLI is one such host.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (CLI in crates/shelf, or any UI)                      │
//! │  - Registers draggables/drop zones, forwards pointer events │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Drag Engine (drag/)                                        │
//! │  - DragSession state machine, event bus                     │
//! │  - Validator pipeline, resolver, cycle detector, committer  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract BookmarkStore trait                             │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Beside the drag engine sit two independent collaborators: the
//! [`autosave::AutoSaveCoordinator`] (debounced persistence of free-form edits)
//! and the [`expansion::ExpansionStateStore`] (which folders are open).
//!
//! ## Execution Model
//!
//! Single-threaded and event-driven. Store calls are `async` and the engine
//! suspends on them while validating and committing, but nothing runs in
//! parallel: shared state lives in `Rc`/`RefCell`, and the auto-save timer is a
//! local task, so hosts drive the library from a current-thread tokio runtime
//! with a `LocalSet`.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Library code:
//! - Takes regular Rust function arguments
//! - Returns regular Rust types; a rejected drop is data, not an error
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** calls `std::process::exit`
//!
//! ## Module Overview
//!
//! - [`drag`]: Session, validation pipeline, index resolver, cycle detector, committer, events
//! - [`autosave`]: Debounced dirty/saving state machine
//! - [`expansion`]: Persisted folder expansion map with backend fallback
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`BookmarkNode`, `DragPayload`, `DropTarget`)
//! - [`observer`]: Listener registry with per-listener panic isolation
//! - [`config`]: Configuration management
//! - [`init`]: Data directory resolution and context setup
//! - [`error`]: Error types

pub mod autosave;
pub mod config;
pub mod drag;
pub mod error;
pub mod expansion;
pub mod init;
pub mod model;
pub mod observer;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
