//! Pastebox CLI - storage administration for an encrypted paste service
//!
//! This is the command-line interface for Pastebox. It drives every
//! operation of the core store against a configured root directory.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod helpers;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::AppContext;
use cli::{Cli, Commands, CommentCommands};
use commands::comments::{handle_comment_add, handle_comment_list};
use commands::maintenance::{handle_list, handle_purge};
use commands::misc::handle_completions;
use commands::pastes::{handle_delete, handle_exists, handle_get, handle_put};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let ctx = AppContext::new(&cli);
    match &cli.command {
        Commands::Put(args) => handle_put(&ctx, args),
        Commands::Get(args) => handle_get(&ctx, args),
        Commands::Exists(args) => handle_exists(&ctx, args),
        Commands::Delete(args) => handle_delete(&ctx, args),
        Commands::List(args) => handle_list(&ctx, args),
        Commands::Purge(args) => handle_purge(&ctx, args),
        Commands::Comment(CommentCommands::Add(args)) => handle_comment_add(&ctx, args),
        Commands::Comment(CommentCommands::List(args)) => handle_comment_list(&ctx, args),
        Commands::Completions { shell } => handle_completions(*shell),
    }
}
