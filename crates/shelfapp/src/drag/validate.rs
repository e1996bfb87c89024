//! # Drop Validation Pipeline
//!
//! Every drop passes through an ordered chain of rules before the store is
//! touched. Each rule passes, blocks, or passes with a warning. The first block
//! ends the chain; only the first warning is kept.
//!
//! | # | Rule | Outcome | Store access |
//! |---|------|---------|--------------|
//! | 1 | Structural validity | block `InvalidPayload` | none |
//! | 2 | Self-drop | block `SelfDrop` | none |
//! | 3 | No-op position | block `NoOpPosition` | none |
//! | 4 | Protected guard | block `ProtectedNode`; `ProtectedTarget` per policy | `get` (title lookup) |
//! | 5 | Root-drop guard | block `RootDrop` | none |
//! | 6 | Cycle guard (containers) | block `CircularReference` | `get` per ancestor |
//! | 7 | Duplicate guard (items) | warn `DuplicateFound` | `get_children` |
//!
//! Cheap, decisive rules come first so most rejections never reach the store.
//!
//! ## Fast Path
//!
//! [`Validator::validate_fast`] runs rules 1, 2, 3 and 5 synchronously. The drag
//! session uses it on `dragenter` for live feedback. [`Validator::validate`] runs
//! the whole chain and is only called on an actual drop.
//!
//! Validation results are data: a rejected drop is an `Ok(outcome)` with
//! `accepted == false`. `Err` means a store read failed mid-pipeline.

use super::cycle::CycleDetector;
use super::resolver::is_noop_insertion;
use crate::config::{ProtectedTargetPolicy, ShelfConfig};
use crate::error::Result;
use crate::model::{DragPayload, DropKind, DropTarget, PayloadKind};
use crate::store::BookmarkStore;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    InvalidPayload,
    SelfDrop,
    NoOpPosition,
    ProtectedNode,
    ProtectedTarget,
    RootDrop,
    CircularReference,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockReason::InvalidPayload => "invalid drag payload or drop target",
            BlockReason::SelfDrop => "cannot drop a node onto itself",
            BlockReason::NoOpPosition => "drop position leaves the node where it is",
            BlockReason::ProtectedNode => "protected folders cannot be moved",
            BlockReason::ProtectedTarget => "cannot drop into a protected folder",
            BlockReason::RootDrop => "cannot drop at the root level",
            BlockReason::CircularReference => "cannot move a folder into its own subfolder",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningReason {
    ProtectedTarget,
    DuplicateFound,
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WarningReason::ProtectedTarget => "dropping into a protected folder",
            WarningReason::DuplicateFound => "destination already holds a bookmark with this title or url",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub blocking_reason: Option<BlockReason>,
    pub warning_reason: Option<WarningReason>,
}

impl ValidationOutcome {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            blocking_reason: None,
            warning_reason: None,
        }
    }

    pub fn reject(reason: BlockReason) -> Self {
        Self {
            accepted: false,
            blocking_reason: Some(reason),
            warning_reason: None,
        }
    }

    pub fn warn(reason: WarningReason) -> Self {
        Self {
            accepted: true,
            blocking_reason: None,
            warning_reason: Some(reason),
        }
    }

    pub fn is_rejected(&self) -> bool {
        !self.accepted
    }
}

/// A single step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Structural,
    SelfDrop,
    NoOpPosition,
    ProtectedGuard,
    RootDrop,
    CycleGuard,
    DuplicateGuard,
}

impl Rule {
    /// Synchronous subset used for hover feedback.
    pub const FAST: [Rule; 4] = [
        Rule::Structural,
        Rule::SelfDrop,
        Rule::NoOpPosition,
        Rule::RootDrop,
    ];

    pub const PIPELINE: [Rule; 7] = [
        Rule::Structural,
        Rule::SelfDrop,
        Rule::NoOpPosition,
        Rule::ProtectedGuard,
        Rule::RootDrop,
        Rule::CycleGuard,
        Rule::DuplicateGuard,
    ];
}

enum Verdict {
    Pass,
    Block(BlockReason),
    Warn(WarningReason),
}

/// Which nodes the guards protect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub root_id: String,
    pub protected_ids: Vec<String>,
    /// Matched against containers sitting directly under the root.
    pub protected_titles: Vec<String>,
    pub protected_target: ProtectedTargetPolicy,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::from(&ShelfConfig::default())
    }
}

impl From<&ShelfConfig> for GuardPolicy {
    fn from(config: &ShelfConfig) -> Self {
        Self {
            root_id: config.root_id.clone(),
            protected_ids: config.protected_ids(),
            protected_titles: config.protected_titles(),
            protected_target: config.protected_target_policy(),
        }
    }
}

impl GuardPolicy {
    fn is_protected_id(&self, id: &str) -> bool {
        self.protected_ids.iter().any(|p| p == id)
    }

    fn is_protected_root_title(&self, title: &str, parent_id: Option<&str>) -> bool {
        parent_id == Some(self.root_id.as_str()) && self.protected_titles.iter().any(|t| t == title)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    policy: GuardPolicy,
}

impl Validator {
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Rules 1, 2, 3 and 5, without store access.
    pub fn validate_fast(&self, payload: &DragPayload, target: &DropTarget) -> ValidationOutcome {
        let mut warning = None;
        for rule in Rule::FAST {
            match self.check_local(rule, payload, target) {
                Verdict::Pass => {}
                Verdict::Block(reason) => return self.rejected(rule, reason, payload),
                Verdict::Warn(reason) => {
                    warning.get_or_insert(reason);
                }
            }
        }
        outcome(warning)
    }

    /// The full pipeline. Suspends on store reads for rules 4, 6 and 7.
    pub async fn validate<S>(
        &self,
        store: &S,
        payload: &DragPayload,
        target: &DropTarget,
    ) -> Result<ValidationOutcome>
    where
        S: BookmarkStore + ?Sized,
    {
        let mut warning = None;
        for rule in Rule::PIPELINE {
            let verdict = match rule {
                Rule::ProtectedGuard => self.check_protected(store, payload, target).await?,
                Rule::CycleGuard => self.check_cycle(store, payload, target).await?,
                Rule::DuplicateGuard => check_duplicates(store, payload, target).await?,
                _ => self.check_local(rule, payload, target),
            };
            match verdict {
                Verdict::Pass => {}
                Verdict::Block(reason) => return Ok(self.rejected(rule, reason, payload)),
                Verdict::Warn(reason) => {
                    if warning.is_none() {
                        tracing::debug!(rule = ?rule, reason = ?reason, id = %payload.id, "drop warning");
                        warning = Some(reason);
                    }
                }
            }
        }
        Ok(outcome(warning))
    }

    fn rejected(&self, rule: Rule, reason: BlockReason, payload: &DragPayload) -> ValidationOutcome {
        tracing::debug!(rule = ?rule, reason = ?reason, id = %payload.id, "drop rejected");
        ValidationOutcome::reject(reason)
    }

    fn check_local(&self, rule: Rule, payload: &DragPayload, target: &DropTarget) -> Verdict {
        match rule {
            Rule::Structural => check_structure(payload, target),
            Rule::SelfDrop => {
                if payload.id == target.target_id {
                    Verdict::Block(BlockReason::SelfDrop)
                } else {
                    Verdict::Pass
                }
            }
            Rule::NoOpPosition => check_noop(payload, target),
            Rule::RootDrop => {
                if target.destination_parent() == Some(self.policy.root_id.as_str()) {
                    Verdict::Block(BlockReason::RootDrop)
                } else {
                    Verdict::Pass
                }
            }
            Rule::ProtectedGuard | Rule::CycleGuard | Rule::DuplicateGuard => Verdict::Pass,
        }
    }

    async fn check_protected<S>(
        &self,
        store: &S,
        payload: &DragPayload,
        target: &DropTarget,
    ) -> Result<Verdict>
    where
        S: BookmarkStore + ?Sized,
    {
        // Protected ids are refused without a store read.
        if self.policy.is_protected_id(&payload.id) {
            return Ok(Verdict::Block(BlockReason::ProtectedNode));
        }
        if payload.is_container() && self.policy.protected_titles.contains(&payload.title) {
            let parent_id = match &payload.parent_id {
                Some(parent_id) => Some(parent_id.clone()),
                None => store.get(&payload.id).await?.parent_id,
            };
            if self
                .policy
                .is_protected_root_title(&payload.title, parent_id.as_deref())
            {
                return Ok(Verdict::Block(BlockReason::ProtectedNode));
            }
        }

        if self.policy.protected_target == ProtectedTargetPolicy::Allow {
            return Ok(Verdict::Pass);
        }
        let Some(destination) = target.destination_parent() else {
            return Ok(Verdict::Pass);
        };

        let protected = if self.policy.is_protected_id(destination) {
            true
        } else if self.policy.protected_titles.is_empty() || destination == self.policy.root_id {
            false
        } else {
            let node = store.get(destination).await?;
            node.is_container()
                && self
                    .policy
                    .is_protected_root_title(&node.title, node.parent_id.as_deref())
        };

        Ok(match (protected, self.policy.protected_target) {
            (false, _) | (true, ProtectedTargetPolicy::Allow) => Verdict::Pass,
            (true, ProtectedTargetPolicy::Warn) => Verdict::Warn(WarningReason::ProtectedTarget),
            (true, ProtectedTargetPolicy::Reject) => Verdict::Block(BlockReason::ProtectedTarget),
        })
    }

    async fn check_cycle<S>(
        &self,
        store: &S,
        payload: &DragPayload,
        target: &DropTarget,
    ) -> Result<Verdict>
    where
        S: BookmarkStore + ?Sized,
    {
        if !payload.is_container() {
            return Ok(Verdict::Pass);
        }
        let Some(destination) = target.destination_parent() else {
            return Ok(Verdict::Pass);
        };
        let detector = CycleDetector::new(store, &self.policy.root_id);
        if detector.creates_cycle(&payload.id, destination).await? {
            Ok(Verdict::Block(BlockReason::CircularReference))
        } else {
            Ok(Verdict::Pass)
        }
    }
}

fn outcome(warning: Option<WarningReason>) -> ValidationOutcome {
    match warning {
        Some(reason) => ValidationOutcome::warn(reason),
        None => ValidationOutcome::accept(),
    }
}

fn check_structure(payload: &DragPayload, target: &DropTarget) -> Verdict {
    let payload_ok = !payload.id.is_empty()
        && match payload.kind {
            PayloadKind::Item => payload.url.as_deref().is_some_and(|u| !u.is_empty()),
            PayloadKind::Container => payload.url.is_none(),
        };
    let target_ok = !target.target_id.is_empty()
        && match target.kind {
            DropKind::IntoContainer => true,
            DropKind::BetweenSiblings => {
                target.parent_id.as_deref().is_some_and(|p| !p.is_empty())
                    && target.target_index.is_some()
            }
            DropKind::WithinContainerAtIndex => target.target_index.is_some(),
        };
    if payload_ok && target_ok {
        Verdict::Pass
    } else {
        Verdict::Block(BlockReason::InvalidPayload)
    }
}

fn check_noop(payload: &DragPayload, target: &DropTarget) -> Verdict {
    let same_parent = payload.parent_id.is_some()
        && payload.parent_id.as_deref() == target.destination_parent();
    match (same_parent, payload.source_index, target.insertion_point()) {
        (true, Some(source), Some(gap)) if is_noop_insertion(source, gap) => {
            Verdict::Block(BlockReason::NoOpPosition)
        }
        _ => Verdict::Pass,
    }
}

async fn check_duplicates<S>(store: &S, payload: &DragPayload, target: &DropTarget) -> Result<Verdict>
where
    S: BookmarkStore + ?Sized,
{
    if payload.is_container() {
        return Ok(Verdict::Pass);
    }
    let Some(destination) = target.destination_parent() else {
        return Ok(Verdict::Pass);
    };
    let siblings = store.get_children(destination).await?;
    let duplicate = siblings.iter().filter(|n| n.id != payload.id).any(|n| {
        let same_url = payload.url.is_some() && n.url == payload.url;
        let same_title = !payload.title.is_empty() && n.title == payload.title;
        same_url || same_title
    });
    Ok(if duplicate {
        Verdict::Warn(WarningReason::DuplicateFound)
    } else {
        Verdict::Pass
    })
}
