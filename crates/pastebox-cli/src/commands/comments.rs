use pastebox_core::storage::{CreateOutcome, NewComment, PasteStore};
use pastebox_core::{PasteError, PasteId};

use crate::app::{exit_invalid_input, exit_not_found_with_hint, parse_id, AppContext};
use crate::cli::{CommentAddArgs, CommentListArgs};
use crate::helpers::read_payload;
use crate::output::{comment_json, comments_table};

pub fn handle_comment_add(ctx: &AppContext, args: &CommentAddArgs) -> anyhow::Result<()> {
    let paste_id = parse_id(&args.paste_id);
    let parent_id = match args.parent.as_deref() {
        Some(value) => parse_id(value),
        None => paste_id.clone(),
    };
    let comment_id = match args.id.as_deref() {
        Some(value) => parse_id(value),
        None => PasteId::generate(),
    };

    let mut comment = NewComment::new(read_payload(args.file.as_deref())?);
    if let Some(icon) = &args.icon {
        comment = comment.with_icon(icon);
    }

    let store = ctx.open_store()?;
    match store.create_comment(&paste_id, &parent_id, &comment_id, &comment) {
        Ok(CreateOutcome::Created) => {
            if ctx.quiet() {
                println!("{}", comment_id);
            } else {
                println!("Added comment {} to paste {}", comment_id, paste_id);
            }
            Ok(())
        }
        Ok(CreateOutcome::AlreadyExists) => {
            exit_invalid_input(&format!("Comment {} already exists", comment_id))
        }
        Err(PasteError::NotFound(what)) => exit_not_found_with_hint(
            &format!("{} not found", what),
            "Hint: Comments can only be added to live pastes and existing comments.",
        ),
        Err(err) if err.is_caller_error() => exit_invalid_input(&err.to_string()),
        Err(err) => Err(err.into()),
    }
}

pub fn handle_comment_list(ctx: &AppContext, args: &CommentListArgs) -> anyhow::Result<()> {
    let paste_id = parse_id(&args.paste_id);
    let store = ctx.open_store()?;
    let comments = store.read_comments(&paste_id)?;

    if args.json {
        let values: Vec<serde_json::Value> = comments.iter().map(comment_json).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if comments.is_empty() {
        if !ctx.quiet() {
            println!("No comments on paste {}", paste_id);
        }
    } else {
        println!("{}", comments_table(&comments));
    }
    Ok(())
}
