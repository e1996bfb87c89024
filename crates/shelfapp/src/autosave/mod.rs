//! Debounced auto-save for free-form edits.
//!
//! Provides:
//! - `AutoSaveCoordinator` - dirty/saving state machine with a debounce timer
//! - `AutoSaveState` - the snapshot listeners receive
//! - `AutoSaveConfig` - enable switch and debounce delay
//!
//! The coordinator is independent of the drag engine; it only shares the
//! listener registry ([`crate::observer::Observers`]).

mod config;
mod coordinator;

pub use config::AutoSaveConfig;
pub use coordinator::{AutoSaveCoordinator, AutoSaveState, SaveFuture};
