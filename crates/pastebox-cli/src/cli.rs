use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use pastebox_core::VERSION;

/// Pastebox - storage administration for an encrypted paste service
#[derive(Parser)]
#[command(name = "pastebox")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root directory of the paste store
    #[arg(short, long, global = true, env = "PASTEBOX_ROOT")]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a new paste (payload from --file or stdin)
    Put(PutArgs),

    /// Print a paste
    Get(GetArgs),

    /// Check whether a paste exists
    Exists(IdArgs),

    /// Delete a paste and its discussion
    Delete(IdArgs),

    /// List live paste IDs
    List(ListArgs),

    /// Remove expired pastes
    Purge(PurgeArgs),

    /// Manage discussion comments
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `put` command
#[derive(Args)]
pub struct PutArgs {
    /// Paste ID (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Read the payload from this file instead of stdin
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Expiration (5min, 10min, 1hour, 1day, 1week, 1month, 1year, never)
    #[arg(long)]
    pub expire: Option<String>,

    /// Creation time (ISO-8601); defaults to now
    #[arg(long)]
    pub created: Option<String>,

    /// Display formatter hint
    #[arg(long)]
    pub formatter: Option<String>,

    /// Allow discussion comments
    #[arg(long)]
    pub open_discussion: bool,

    /// Delete the paste after its first read
    #[arg(long)]
    pub burn_after_reading: bool,

    /// Extra metadata as KEY=VALUE
    #[arg(long, value_name = "KEY=VALUE")]
    pub meta: Vec<String>,
}

/// Arguments for the `get` command
#[derive(Args)]
pub struct GetArgs {
    /// Paste ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON (payload base64-encoded)
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands that only take an ID
#[derive(Args)]
pub struct IdArgs {
    /// Paste ID
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `purge` command
#[derive(Args)]
pub struct PurgeArgs {
    /// Maximum number of pastes to remove (defaults to the configured batch)
    #[arg(long)]
    pub batch: Option<usize>,
}

#[derive(Subcommand)]
pub enum CommentCommands {
    /// Add a comment to a paste
    Add(CommentAddArgs),

    /// List the comments of a paste
    List(CommentListArgs),
}

/// Arguments for the `comment add` command
#[derive(Args)]
pub struct CommentAddArgs {
    /// Paste ID
    #[arg(value_name = "PASTE_ID")]
    pub paste_id: String,

    /// Comment being replied to (defaults to the paste itself)
    #[arg(long)]
    pub parent: Option<String>,

    /// Comment ID (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Read the payload from this file instead of stdin
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Avatar hint
    #[arg(long)]
    pub icon: Option<String>,
}

/// Arguments for the `comment list` command
#[derive(Args)]
pub struct CommentListArgs {
    /// Paste ID
    #[arg(value_name = "PASTE_ID")]
    pub paste_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
