//! # Shelf CLI Architecture
//!
//! Shelf ships with a small CLI client, but the binary is intentionally thin:
//! the CLI lives in `src/cli/`, while this file only invokes `cli::run()` and
//! handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/shelfapp/`: core library (drag engine, auto-save, expansion state, storage)
//! - `crates/shelf/`: this CLI tool, depends on the `shelfapp` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/shelf/src/cli/)                          │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal rendering (render.rs)                           │
//! │  - tracing subscriber setup (logging.rs)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (crates/shelfapp)                                  │
//! │  - DragSession drives every `move`                          │
//! │  - Validator answers `check`                                │
//! │  - ExpansionStateStore backs `expand`/`collapse`/`toggle`   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `move` is not a shortcut around the engine: the CLI registers the node as a
//! draggable and the destination as a drop zone, then replays
//! start → enter → drop → end exactly as a pointer-driven UI would.
//!
//! ## Testing Approach
//!
//! - Rendering is verified in `cli/render.rs` by feeding canned results.
//! - End-to-end behavior is covered in `tests/` via `assert_cmd`, with
//!   `SHELF_DATA` pointing at a temporary directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
