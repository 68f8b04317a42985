use clap::{Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pad", bin_name = "pad", version)]
#[command(about = "Project-aware scratch pads for the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Operate on global notes
    #[arg(short, long, global = true, help_heading = "Options")]
    pub global: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true, help_heading = "Options")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "n")]
    Create {
        /// Title of the note (derived from the content when omitted)
        title: Option<String>,

        /// Content of the note (read from stdin when omitted and stdin is piped)
        #[arg(short, long)]
        content: Option<String>,
    },

    /// List notes
    #[command(alias = "ls")]
    List {
        /// Show deleted notes only
        #[arg(long, conflicts_with = "all")]
        deleted: bool,

        /// Show active and deleted notes
        #[arg(long)]
        all: bool,

        /// List every known scope
        #[arg(long)]
        all_scopes: bool,
    },

    /// View one or more notes
    #[command(alias = "v")]
    View {
        /// Identifiers (e.g. 1 p1 d1 proj-2 3f2a)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Show only the opening and closing lines
        #[arg(long)]
        peek: bool,
    },

    /// Change the title and/or content of a note
    #[command(alias = "u")]
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// Pin one or more notes
    #[command(alias = "p")]
    Pin {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Unpin one or more notes
    Unpin {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Delete one or more notes (restorable until flushed)
    #[command(alias = "rm")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Restore deleted notes
    Restore {
        #[arg(required_unless_present = "newer_than", conflicts_with = "newer_than")]
        ids: Vec<String>,

        /// Restore everything deleted within this window (e.g. 2h, 3d)
        #[arg(long)]
        newer_than: Option<String>,
    },

    /// Permanently remove deleted notes
    Flush {
        #[arg(required_unless_present_any = ["older_than", "all"], conflicts_with_all = ["older_than", "all"])]
        ids: Vec<String>,

        /// Flush everything deleted longer ago than this window (e.g. 30d)
        #[arg(long, conflicts_with = "all")]
        older_than: Option<String>,

        /// Flush every deleted note
        #[arg(long)]
        all: bool,
    },

    /// Search notes
    Search {
        query: String,

        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,

        /// Include deleted notes
        #[arg(long)]
        deleted: bool,

        /// Search every known scope
        #[arg(long)]
        all_scopes: bool,
    },

    /// Delete every active note in the scope (restorable until flushed)
    Nuke {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete stale notes and flush old deletions
    Cleanup {
        /// Delete unpinned notes created longer ago than this (default from config, 30d)
        #[arg(long)]
        stale_after: Option<String>,

        /// Flush notes deleted longer ago than this (default from config, 7d)
        #[arg(long)]
        purge_after: Option<String>,
    },

    /// Print the file path of one or more notes
    Path {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Check the scope for inconsistencies and repair them
    Doctor,
}
