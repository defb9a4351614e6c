use std::io::Write;

use pastebox_core::storage::{CreateOutcome, ExpirePreset, NewPaste, PasteStore};
use pastebox_core::{PasteError, PasteId};

use crate::app::{exit_invalid_input, exit_not_found_with_hint, parse_id, AppContext};
use crate::cli::{GetArgs, IdArgs, PutArgs};
use crate::constants::exit_codes;
use crate::helpers::{parse_datetime, parse_meta_pair, read_payload};
use crate::output::{paste_json, print_paste_summary};

pub fn handle_put(ctx: &AppContext, args: &PutArgs) -> anyhow::Result<()> {
    let id = match args.id.as_deref() {
        Some(value) => parse_id(value),
        None => PasteId::generate(),
    };

    let mut paste = NewPaste::new(read_payload(args.file.as_deref())?)
        .with_open_discussion(args.open_discussion)
        .with_burn_after_reading(args.burn_after_reading);
    if let Some(value) = &args.expire {
        let preset: ExpirePreset = value
            .parse()
            .unwrap_or_else(|err: PasteError| exit_invalid_input(&err.to_string()));
        paste = paste.with_expire(preset);
    }
    if let Some(value) = &args.created {
        paste = paste.with_created_at(parse_datetime(value)?);
    }
    if let Some(formatter) = &args.formatter {
        paste = paste.with_formatter(formatter);
    }
    for pair in &args.meta {
        let (key, value) = parse_meta_pair(pair)?;
        paste = paste.with_extra(key, value);
    }

    let store = ctx.open_store()?;
    match store.create(&id, &paste) {
        Ok(CreateOutcome::Created) => {
            if ctx.quiet() {
                println!("{}", id);
            } else {
                println!("Created paste {}", id);
            }
            Ok(())
        }
        Ok(CreateOutcome::AlreadyExists) => {
            exit_invalid_input(&format!("Paste {} already exists", id))
        }
        Err(err) if err.is_caller_error() => exit_invalid_input(&err.to_string()),
        Err(err) => Err(err.into()),
    }
}

pub fn handle_get(ctx: &AppContext, args: &GetArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id);
    let store = ctx.open_store()?;

    let paste = store.read(&id)?.unwrap_or_else(|| {
        exit_not_found_with_hint(
            &format!("Paste {} not found", id),
            "Hint: It may have expired or been deleted. Run `pastebox list` to see live pastes.",
        )
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paste_json(&paste))?);
    } else {
        if !ctx.quiet() {
            print_paste_summary(&paste);
        }
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&paste.payload)?;
        stdout.flush()?;
    }

    // Burn after reading is enforced here, by the caller, not by the store
    if paste.meta.burn_after_reading {
        store.delete(&id)?;
        tracing::debug!(paste_id = %id, "burned paste after reading");
        if !ctx.quiet() {
            eprintln!("Paste {} was burned after reading", id);
        }
    }
    Ok(())
}

pub fn handle_exists(ctx: &AppContext, args: &IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id);
    let store = ctx.open_store()?;
    let exists = store.exists(&id)?;
    if !ctx.quiet() {
        println!("{}", exists);
    }
    if !exists {
        std::process::exit(exit_codes::NOT_FOUND);
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &IdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id);
    let store = ctx.open_store()?;
    store.delete(&id)?;
    if !ctx.quiet() {
        println!("Deleted paste {}", id);
    }
    Ok(())
}
