use clap::{Parser, Subcommand, ValueEnum};
use infinitydb_remote::{Bound, Move};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "idb", about = "InfinityDB REST client", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file (defaults to ./infinitydb.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, overriding config and INFINITYDB_URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Database, overriding config and INFINITYDB_DB
    #[arg(long, global = true)]
    pub db: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the server and database answer
    Head,

    /// Read the subtree under a prefix
    Get {
        /// Prefix in token form, e.g. 'Documentation "intro"'
        #[arg(default_value = "")]
        path: String,

        /// Print plain JSON instead of extended text
        #[arg(long)]
        json: bool,
    },

    /// List the Items under a prefix, one per line
    Items {
        #[arg(default_value = "")]
        path: String,

        /// Maximum number of Items
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Write JSON under a prefix
    Put {
        path: String,

        /// File containing the JSON body
        file: Option<PathBuf>,

        /// Inline JSON body
        #[arg(short = 'e', long = "expr")]
        expr: Option<String>,
    },

    /// Run the query stored under a prefix
    Query {
        path: String,

        /// File containing the request JSON
        file: Option<PathBuf>,

        /// Inline request JSON
        #[arg(short = 'e', long = "expr")]
        expr: Option<String>,

        /// Extra JSON sent as the query parameter
        #[arg(long)]
        param: Option<String>,

        /// Leave the response nested instead of flattening it into Tuples
        #[arg(long)]
        no_flatten: bool,
    },

    /// Single unbuffered move from a prefix
    Move {
        #[arg(value_enum)]
        direction: DirectionArg,

        #[arg(default_value = "")]
        prefix: String,

        #[arg(long, value_enum, default_value = "item")]
        bound: BoundArg,
    },

    /// Iterate forward from an Item through the next buffer
    Next {
        item: String,

        #[arg(long, value_enum, default_value = "item")]
        bound: BoundArg,

        /// Number of steps
        #[arg(long, short = 'n', default_value_t = 10)]
        count: usize,

        /// Items fetched per batch
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Exit 0 when the Item exists, 1 otherwise
    Exists { item: String },

    /// Insert one Item
    Insert { item: String },

    /// Delete one Item, or with --subspace every Item under a prefix
    Delete {
        item: String,

        #[arg(long)]
        subspace: bool,
    },

    /// Commit and wait until durable
    Commit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BoundArg {
    Item,
    Tuple,
    Component,
}

impl From<BoundArg> for Bound {
    fn from(arg: BoundArg) -> Self {
        match arg {
            BoundArg::Item => Bound::Item,
            BoundArg::Tuple => Bound::Tuple,
            BoundArg::Component => Bound::Component,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    First,
    Next,
    Last,
    Previous,
}

impl From<DirectionArg> for Move {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::First => Move::First,
            DirectionArg::Next => Move::Next,
            DirectionArg::Last => Move::Last,
            DirectionArg::Previous => Move::Previous,
        }
    }
}
