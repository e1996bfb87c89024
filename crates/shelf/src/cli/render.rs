//! Output formatting.
//!
//! Every function here returns a `String`; the caller decides where it goes.
//! Styling is applied through `console`, which drops the escape codes
//! automatically when stdout is not a terminal.

use console::style;
use serde::Serialize;
use shelfapp::drag::{DropOutcome, ValidationOutcome};
use shelfapp::expansion::PersistStatus;
use shelfapp::model::MoveResult;

const INDENT: &str = "  ";

/// One line of `shelf list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedNode {
    pub depth: usize,
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub is_container: bool,
    pub expanded: bool,
    pub child_count: usize,
}

pub fn render_tree(nodes: &[ListedNode]) -> String {
    if nodes.is_empty() {
        return format!("{}\n", style("Nothing here yet.").dim());
    }
    let mut out = String::new();
    for node in nodes {
        out.push_str(&INDENT.repeat(node.depth));
        out.push_str(&format!("{:>4} ", style(&node.id).dim()));
        if node.is_container {
            let marker = if node.expanded { "▾" } else { "▸" };
            out.push_str(&format!("{} {}", marker, style(&node.title).bold()));
            if !node.expanded && node.child_count > 0 {
                out.push_str(&format!(" {}", style(format!("({})", node.child_count)).dim()));
            }
        } else {
            out.push_str(&format!("  {}", node.title));
            if let Some(url) = &node.url {
                out.push_str(&format!("  {}", style(url).dim()));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_added(kind: &str, id: &str, title: &str) -> String {
    format!("Added {} {} {}\n", kind, style(id).bold(), title)
}

fn render_moved(result: &MoveResult) -> String {
    format!(
        "{} {} to {} at {}\n",
        style("Moved").green(),
        result.node.title,
        style(&result.parent_id).bold(),
        result.index
    )
}

fn render_warning(reason: impl std::fmt::Display) -> String {
    format!("{} {}\n", style("Warning:").yellow(), reason)
}

pub fn render_drop(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Moved { result, warning } => {
            let mut out = render_moved(result);
            if let Some(reason) = warning {
                out.push_str(&render_warning(reason));
            }
            out
        }
        DropOutcome::Rejected(validation) => render_rejection(validation),
        DropOutcome::Cancelled => format!("{}\n", style("Cancelled").yellow()),
    }
}

fn render_rejection(outcome: &ValidationOutcome) -> String {
    match outcome.blocking_reason {
        Some(reason) => format!("{} {}\n", style("Rejected:").red(), reason),
        None => format!("{}\n", style("Rejected").red()),
    }
}

pub fn render_check(outcome: &ValidationOutcome) -> String {
    if outcome.is_rejected() {
        return render_rejection(outcome);
    }
    let mut out = format!("{}\n", style("OK").green());
    if let Some(reason) = outcome.warning_reason {
        out.push_str(&render_warning(reason));
    }
    out
}

pub fn render_expansion(title: &str, expanded: bool, status: &PersistStatus) -> String {
    let state = if expanded { "expanded" } else { "collapsed" };
    let mut out = format!("{} {}\n", title, style(state).bold());
    if !status.is_persisted() {
        out.push_str(&render_warning("could not save folder state; it will be lost on exit"));
    }
    out
}
