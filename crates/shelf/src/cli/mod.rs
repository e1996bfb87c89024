//! # CLI Behavior
//!
//! This is **one possible host** for the shelf engine, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## Naked Execution (`shelf`)
//!
//! Running `shelf` with no arguments defaults to `shelf list`.
//!
//! ## Addressing
//!
//! Nodes are addressed by id, as printed by `shelf list`. Positions are gaps:
//! in a folder holding `A B C`, gap 0 is before `A` and gap 3 is after `C`.
//! `shelf move 3 1 --at 0` therefore moves node 3 to the top of folder 1.
//!
//! ## Exit Codes
//!
//! `move` and `check` exit with 1 when the drop is rejected, so scripts can
//! test a reorder before performing it.
//!
//! ## Module Structure
//!
//! - `commands`: Context setup, dispatch, per-command handlers
//! - `logging`: tracing subscriber driven by `-v` and `RUST_LOG`
//! - `render`: Output formatting
//! - `setup`: Argument parsing via clap

mod commands;
mod logging;
mod render;
pub mod setup;

pub use commands::run;
