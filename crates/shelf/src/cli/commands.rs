//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Resolve the data directory, load config, open the store
//! 3. **Dispatch**: Route commands to handlers on a single-threaded runtime
//! 4. **Output Formatting**: Hand results to `render`
//! 5. **Error Handling**: Rejected drops become errors so the process exits with 1

use super::logging::{init_logging, LogConfig};
use super::render::{
    render_added, render_check, render_drop, render_expansion, render_tree, ListedNode,
};
use super::setup::{parse_cli, Commands};
use anyhow::{anyhow, bail, Context, Result};
use shelfapp::drag::{
    DragEvent, DragEventKind, DraggableHooks, DropZoneHooks, GuardPolicy, Validator,
};
use shelfapp::init::{initialize, ShelfContext};
use shelfapp::model::{BookmarkNode, DragPayload, DropTarget};
use shelfapp::store::BookmarkStore;
use std::path::PathBuf;
use tokio::task::LocalSet;

/// Drop zone name used for the single destination of `move`.
const DESTINATION_ZONE: &str = "destination";

pub fn run() -> Result<()> {
    let cli = parse_cli();
    init_logging(&LogConfig::from_verbosity(cli.verbose));

    let ctx = initialize(cli.data.map(PathBuf::from))?;
    let command = cli.command.unwrap_or(Commands::List { all: false });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    LocalSet::new().block_on(&runtime, dispatch(&ctx, command))
}

async fn dispatch(ctx: &ShelfContext, command: Commands) -> Result<()> {
    match command {
        Commands::List { all } => handle_list(ctx, all).await,
        Commands::Add { title, url, parent } => {
            let id = ctx.store.update(|tree| tree.add_item(&parent, &title, &url))?;
            print!("{}", render_added("bookmark", &id, &title));
            Ok(())
        }
        Commands::Mkdir { title, parent } => {
            let id = ctx.store.update(|tree| tree.add_container(&parent, &title))?;
            print!("{}", render_added("folder", &id, &title));
            Ok(())
        }
        Commands::Move { id, parent, at } => handle_move(ctx, &id, &parent, at).await,
        Commands::Check { id, parent, at } => handle_check(ctx, &id, &parent, at).await,
        Commands::Expand { id } => handle_expansion(ctx, &id, Some(true)).await,
        Commands::Collapse { id } => handle_expansion(ctx, &id, Some(false)).await,
        Commands::Toggle { id } => handle_expansion(ctx, &id, None).await,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            Ok(())
        }
    }
}

async fn handle_list(ctx: &ShelfContext, all: bool) -> Result<()> {
    let expansion = ctx.expansion();
    let roots = ctx.store.get_children(&ctx.config.root_id).await?;

    let mut listed = Vec::new();
    let mut stack: Vec<(BookmarkNode, usize)> = roots.into_iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        if !node.is_container() {
            listed.push(ListedNode {
                depth,
                id: node.id,
                title: node.title,
                url: node.url,
                is_container: false,
                expanded: false,
                child_count: 0,
            });
            continue;
        }

        let children = ctx.store.get_children(&node.id).await?;
        let expanded = all || expansion.is_expanded(&node.id);
        listed.push(ListedNode {
            depth,
            child_count: children.len(),
            id: node.id,
            title: node.title,
            url: None,
            is_container: true,
            expanded,
        });
        if expanded {
            stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
        }
    }

    print!("{}", render_tree(&listed));
    Ok(())
}

/// Payload for `id` carrying its current parent and position.
async fn payload_for(ctx: &ShelfContext, id: &str) -> Result<DragPayload> {
    let node = ctx.store.get(id).await?;
    let index = match node.parent_id.as_deref() {
        Some(parent) => ctx
            .store
            .get_children(parent)
            .await?
            .iter()
            .position(|sibling| sibling.id == id),
        None => None,
    };
    Ok(DragPayload::from_node(&node, index))
}

fn target_for(parent: &str, at: Option<usize>) -> DropTarget {
    match at {
        Some(gap) => DropTarget::within_container(parent, gap),
        None => DropTarget::into_container(parent),
    }
}

/// Replays a full pointer drag: start, enter, drop, end.
async fn handle_move(ctx: &ShelfContext, id: &str, parent: &str, at: Option<usize>) -> Result<()> {
    let payload = payload_for(ctx, id).await?;
    let session = ctx.drag_session();

    session.bus().subscribe(DragEventKind::Moved, |event| {
        if let DragEvent::Moved { payload, result, .. } = event {
            tracing::info!(id = %payload.id, parent = %result.parent_id, index = result.index, "moved");
        }
    });

    session.initialize_draggable(
        id,
        payload,
        DraggableHooks::new().on_drag_end(|payload, dropped| {
            tracing::debug!(id = %payload.id, dropped, "drag ended");
        }),
    );
    session.initialize_drop_zone(DESTINATION_ZONE, target_for(parent, at), DropZoneHooks::new());

    session.drag_start(id)?;
    let preview = session.drag_enter(DESTINATION_ZONE)?;
    tracing::debug!(?preview, "hover preview");
    let outcome = session.drop_on(DESTINATION_ZONE).await?;
    session.drag_end();

    print!("{}", render_drop(&outcome));
    if !outcome.handled() {
        return Err(anyhow!("{} was not moved", id));
    }
    Ok(())
}

async fn handle_check(ctx: &ShelfContext, id: &str, parent: &str, at: Option<usize>) -> Result<()> {
    let payload = payload_for(ctx, id).await?;
    let validator = Validator::new(GuardPolicy::from(&ctx.config));
    let outcome = validator
        .validate(ctx.store.as_ref(), &payload, &target_for(parent, at))
        .await?;

    print!("{}", render_check(&outcome));
    if outcome.is_rejected() {
        bail!("{} cannot be moved there", id);
    }
    Ok(())
}

/// `Some(state)` sets the folder; `None` toggles it.
async fn handle_expansion(ctx: &ShelfContext, id: &str, state: Option<bool>) -> Result<()> {
    let node = ctx.store.get(id).await?;
    if !node.is_container() {
        bail!("{} is not a folder", id);
    }

    let mut expansion = ctx.expansion();
    let (expanded, status) = match state {
        Some(expanded) => (expanded, expansion.set_expanded(id, expanded)),
        None => {
            let expanded = expansion.toggle(id);
            let status = expansion
                .last_status()
                .cloned()
                .unwrap_or_else(|| expansion.flush());
            (expanded, status)
        }
    };

    print!("{}", render_expansion(&node.title, expanded, &status));
    Ok(())
}
