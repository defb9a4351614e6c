use pastebox_core::PasteStore;

use crate::app::AppContext;
use crate::cli::{ListArgs, PurgeArgs};
use crate::output::ids_table;

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let ids = store.list_ids()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ids)?);
    } else if ctx.quiet() {
        for id in &ids {
            println!("{}", id);
        }
    } else if ids.is_empty() {
        println!("No pastes stored");
    } else {
        println!("{}", ids_table(&ids));
    }
    Ok(())
}

pub fn handle_purge(ctx: &AppContext, args: &PurgeArgs) -> anyhow::Result<()> {
    let batch = match args.batch {
        Some(batch) => batch,
        None => ctx.config()?.store.purge_batch_size,
    };
    let store = ctx.open_store()?;
    let purged = store.purge_expired(batch)?;
    if !ctx.quiet() {
        println!("Purged {} expired paste(s)", purged);
    }
    Ok(())
}
