use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shelf",
    bin_name = "shelf",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Reorder, file and fold your bookmarks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (overrides SHELF_DATA)
    #[arg(long, global = true, help_heading = "Options")]
    pub data: Option<String>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the bookmark tree
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Show every folder's contents, ignoring collapsed state
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Add a bookmark
    #[command(display_order = 2)]
    Add {
        title: String,
        url: String,

        /// Folder to add into
        #[arg(long, short = 'p', default_value = "1")]
        parent: String,
    },

    /// Create a folder
    #[command(display_order = 3)]
    Mkdir {
        title: String,

        /// Folder to create it in
        #[arg(long, short = 'p', default_value = "1")]
        parent: String,
    },

    /// Move a node, validating it like a drag-and-drop
    #[command(alias = "mv", display_order = 10)]
    Move {
        /// Node to move
        id: String,

        /// Destination folder
        parent: String,

        /// Gap inside the destination (0 = before the first child); appends when omitted
        #[arg(long)]
        at: Option<usize>,
    },

    /// Check whether a move would be accepted, without performing it
    #[command(display_order = 11)]
    Check {
        id: String,
        parent: String,

        #[arg(long)]
        at: Option<usize>,
    },

    /// Expand a folder in `list`
    #[command(display_order = 20)]
    Expand { id: String },

    /// Collapse a folder in `list`
    #[command(display_order = 21)]
    Collapse { id: String },

    /// Flip a folder between expanded and collapsed
    #[command(display_order = 22)]
    Toggle { id: String },

    /// Print the effective configuration as JSON
    #[command(display_order = 30)]
    Config,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
