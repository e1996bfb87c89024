//! # Drag Session
//!
//! A [`DragSession`] is an explicit value owned by whatever hosts the drag UI.
//! Draggable elements and drop zones are registered against it by handle, and the
//! host forwards pointer events to it. Nothing here is global: two sessions are
//! fully independent unless one was created with [`DragSession::sharing`].
//!
//! ## States
//!
//! ```text
//!   Idle ──drag_start──► Dragging ──drop──► Validating ──accepted──► Committing ──► Idle
//!                           │                   │  └──rejected──────────────────► Idle
//!                           └─drag_end/cancel─► Cancelled ◄──cancel──┘            ► Idle
//! ```
//!
//! - `drag_enter`/`drag_leave` only run the fast validator subset; the state stays
//!   `Dragging`.
//! - `drop_on` runs the full pipeline, then commits through the shared
//!   [`MutationCommitter`].
//! - A `drag_start` while `Validating` or `Committing` (here or in a sharing
//!   session) is refused with [`ShelfError::Busy`]. A `drag_start` while still
//!   `Dragging` abandons the stale drag first.
//! - Outside edit mode `drag_start` is refused with [`ShelfError::EditModeDisabled`].
//!
//! The draggable's `on_drag_end` hook fires exactly once per drag, with
//! `dropped == true` once a drop has been received.

use super::commit::MutationCommitter;
use super::events::{DragEvent, EventBus};
use super::resolver::resolve_destination;
use super::validate::{BlockReason, GuardPolicy, ValidationOutcome, Validator, WarningReason};
use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError};
use crate::model::{DragPayload, DropTarget, MoveResult};
use crate::store::BookmarkStore;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
    Validating,
    Committing,
    Cancelled,
}

impl fmt::Display for DragState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DragState::Idle => "idle",
            DragState::Dragging => "dragging",
            DragState::Validating => "validating",
            DragState::Committing => "committing",
            DragState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// How a drop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Moved {
        result: MoveResult,
        warning: Option<WarningReason>,
    },
    Rejected(ValidationOutcome),
    Cancelled,
}

impl DropOutcome {
    /// True when the store was mutated.
    pub fn handled(&self) -> bool {
        matches!(self, DropOutcome::Moved { .. })
    }

    pub fn blocking_reason(&self) -> Option<BlockReason> {
        match self {
            DropOutcome::Rejected(outcome) => outcome.blocking_reason,
            _ => None,
        }
    }
}

type StartHook = Rc<dyn Fn(&DragPayload)>;
type EndHook = Rc<dyn Fn(&DragPayload, bool)>;
type EnterHook = Rc<dyn Fn(&DragPayload, &DropTarget, &ValidationOutcome)>;
type LeaveHook = Rc<dyn Fn(&DragPayload, &DropTarget)>;
type DropHook = Rc<dyn Fn(&DragPayload, &DropTarget, &DropOutcome)>;

#[derive(Default, Clone)]
pub struct DraggableHooks {
    on_drag_start: Option<StartHook>,
    on_drag_end: Option<EndHook>,
}

impl DraggableHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_drag_start(mut self, hook: impl Fn(&DragPayload) + 'static) -> Self {
        self.on_drag_start = Some(Rc::new(hook));
        self
    }

    /// Called with `dropped == false` when the drag ended without a drop.
    pub fn on_drag_end(mut self, hook: impl Fn(&DragPayload, bool) + 'static) -> Self {
        self.on_drag_end = Some(Rc::new(hook));
        self
    }
}

#[derive(Default, Clone)]
pub struct DropZoneHooks {
    on_drag_enter: Option<EnterHook>,
    on_drag_leave: Option<LeaveHook>,
    on_drop: Option<DropHook>,
}

impl DropZoneHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_drag_enter(
        mut self,
        hook: impl Fn(&DragPayload, &DropTarget, &ValidationOutcome) + 'static,
    ) -> Self {
        self.on_drag_enter = Some(Rc::new(hook));
        self
    }

    pub fn on_drag_leave(mut self, hook: impl Fn(&DragPayload, &DropTarget) + 'static) -> Self {
        self.on_drag_leave = Some(Rc::new(hook));
        self
    }

    pub fn on_drop(
        mut self,
        hook: impl Fn(&DragPayload, &DropTarget, &DropOutcome) + 'static,
    ) -> Self {
        self.on_drop = Some(Rc::new(hook));
        self
    }
}

struct Draggable {
    payload: DragPayload,
    hooks: DraggableHooks,
}

struct DropZone {
    target: DropTarget,
    hooks: DropZoneHooks,
}

/// The drag in progress, from `drag_start` until the drop resolves or the drag ends.
struct ActiveDrag {
    element: String,
    payload: DragPayload,
    hovered: Option<String>,
}

pub struct DragSession<S: BookmarkStore + ?Sized> {
    validator: Validator,
    committer: Rc<MutationCommitter<S>>,
    state: Cell<DragState>,
    edit_mode: Cell<bool>,
    cancel_requested: Cell<bool>,
    active: RefCell<Option<ActiveDrag>>,
    // Dropped drags whose `drag_end` has not arrived yet.
    awaiting_end: RefCell<Option<ActiveDrag>>,
    // `drag_end` arrived while the drop was still resolving.
    ended_early: Cell<bool>,
    draggables: RefCell<HashMap<String, Draggable>>,
    zones: RefCell<HashMap<String, DropZone>>,
}

impl<S: BookmarkStore + ?Sized> DragSession<S> {
    pub fn new(store: Rc<S>, validator: Validator) -> Self {
        let committer = MutationCommitter::new(store, Rc::new(EventBus::new()));
        Self::with_committer(Rc::new(committer), validator, true)
    }

    pub fn from_config(store: Rc<S>, config: &ShelfConfig) -> Self {
        let session = Self::new(store, Validator::new(GuardPolicy::from(config)));
        session.edit_mode.set(config.edit_mode);
        session
    }

    /// A new, independent session over the same store, event bus and committer.
    pub fn sharing(other: &DragSession<S>) -> Self {
        Self::with_committer(
            Rc::clone(&other.committer),
            other.validator.clone(),
            other.edit_mode.get(),
        )
    }

    fn with_committer(
        committer: Rc<MutationCommitter<S>>,
        validator: Validator,
        edit_mode: bool,
    ) -> Self {
        Self {
            validator,
            committer,
            state: Cell::new(DragState::Idle),
            edit_mode: Cell::new(edit_mode),
            cancel_requested: Cell::new(false),
            active: RefCell::new(None),
            awaiting_end: RefCell::new(None),
            ended_early: Cell::new(false),
            draggables: RefCell::new(HashMap::new()),
            zones: RefCell::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> DragState {
        self.state.get()
    }

    pub fn bus(&self) -> Rc<EventBus> {
        Rc::clone(self.committer.bus())
    }

    pub fn store(&self) -> Rc<S> {
        Rc::clone(self.committer.store())
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The payload of the drag in progress.
    pub fn payload(&self) -> Option<DragPayload> {
        self.active.borrow().as_ref().map(|a| a.payload.clone())
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode.get()
    }

    /// Leaving edit mode abandons a drag that has not been dropped yet.
    pub fn set_edit_mode(&self, enabled: bool) {
        self.edit_mode.set(enabled);
        if !enabled && self.state() == DragState::Dragging {
            self.abandon("edit mode disabled");
        }
    }

    // --- Registration ---

    /// Register (or replace) a draggable element.
    pub fn initialize_draggable(&self, element: &str, payload: DragPayload, hooks: DraggableHooks) {
        self.draggables
            .borrow_mut()
            .insert(element.to_string(), Draggable { payload, hooks });
    }

    pub fn remove_draggable(&self, element: &str) -> bool {
        self.draggables.borrow_mut().remove(element).is_some()
    }

    /// Register (or replace) a drop zone.
    pub fn initialize_drop_zone(&self, element: &str, target: DropTarget, hooks: DropZoneHooks) {
        self.zones
            .borrow_mut()
            .insert(element.to_string(), DropZone { target, hooks });
    }

    pub fn remove_drop_zone(&self, element: &str) -> bool {
        self.zones.borrow_mut().remove(element).is_some()
    }

    // --- Pointer events ---

    pub fn drag_start(&self, element: &str) -> Result<DragPayload> {
        if !self.edit_mode.get() {
            return Err(ShelfError::EditModeDisabled);
        }
        match self.state() {
            DragState::Validating | DragState::Committing => return Err(ShelfError::Busy),
            DragState::Dragging => self.abandon("superseded by a new drag"),
            DragState::Idle | DragState::Cancelled => {}
        }
        if self.committer.is_committing() {
            return Err(ShelfError::Busy);
        }

        let (payload, hook) = {
            let draggables = self.draggables.borrow();
            let draggable = draggables
                .get(element)
                .ok_or_else(|| ShelfError::UnknownElement(element.to_string()))?;
            (draggable.payload.clone(), draggable.hooks.on_drag_start.clone())
        };

        self.awaiting_end.borrow_mut().take();
        self.ended_early.set(false);
        self.cancel_requested.set(false);
        *self.active.borrow_mut() = Some(ActiveDrag {
            element: element.to_string(),
            payload: payload.clone(),
            hovered: None,
        });
        self.transition(DragState::Dragging);

        self.committer.bus().emit(&DragEvent::DragStart {
            payload: payload.clone(),
        });
        if let Some(hook) = hook {
            hook(&payload);
        }
        Ok(payload)
    }

    /// Hover feedback: the fast validator subset, no store access.
    pub fn drag_enter(&self, zone: &str) -> Result<ValidationOutcome> {
        let payload = self.dragging_payload()?;
        let (target, hook) = self.zone(zone, |hooks| hooks.on_drag_enter.clone())?;

        let outcome = self.validator.validate_fast(&payload, &target);
        if let Some(active) = self.active.borrow_mut().as_mut() {
            active.hovered = Some(zone.to_string());
        }

        self.committer.bus().emit(&DragEvent::DragEnter {
            payload: payload.clone(),
            target: target.clone(),
            outcome,
        });
        if let Some(hook) = hook {
            hook(&payload, &target, &outcome);
        }
        Ok(outcome)
    }

    pub fn drag_leave(&self, zone: &str) -> Result<()> {
        let payload = self.dragging_payload()?;
        let (target, hook) = self.zone(zone, |hooks| hooks.on_drag_leave.clone())?;

        if let Some(active) = self.active.borrow_mut().as_mut() {
            if active.hovered.as_deref() == Some(zone) {
                active.hovered = None;
            }
        }

        self.committer.bus().emit(&DragEvent::DragLeave {
            payload: payload.clone(),
            target: target.clone(),
        });
        if let Some(hook) = hook {
            hook(&payload, &target);
        }
        Ok(())
    }

    /// Release the payload over `zone`: full validation, then commit.
    ///
    /// A rejected or cancelled drop is `Ok`. `Err` means the store failed (or a
    /// sharing session is committing); the drag is over either way.
    pub async fn drop_on(&self, zone: &str) -> Result<DropOutcome> {
        let payload = self.dragging_payload()?;
        let (target, hook) = self.zone(zone, |hooks| hooks.on_drop.clone())?;
        let store = self.store();

        self.cancel_requested.set(false);
        self.transition(DragState::Validating);

        let validated = self.validator.validate(&*store, &payload, &target).await;
        let outcome = match validated {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(id = %payload.id, error = %e, "validation aborted by store error");
                self.finish_drop();
                return Err(e);
            }
        };

        if self.cancel_requested.get() {
            self.transition(DragState::Cancelled);
            self.finish_drop();
            return Ok(self.report(&payload, &target, hook, DropOutcome::Cancelled));
        }

        self.committer.bus().emit(&DragEvent::Drop {
            payload: payload.clone(),
            target: target.clone(),
            outcome,
        });

        if outcome.is_rejected() {
            self.finish_drop();
            return Ok(self.report(&payload, &target, hook, DropOutcome::Rejected(outcome)));
        }

        let Some(destination) = resolve_destination(&payload, &target) else {
            self.finish_drop();
            let invalid = ValidationOutcome::reject(BlockReason::InvalidPayload);
            return Ok(self.report(&payload, &target, hook, DropOutcome::Rejected(invalid)));
        };

        if self.committer.is_committing() {
            self.finish_drop();
            return Err(ShelfError::Busy);
        }

        self.transition(DragState::Committing);
        let committed = self.committer.commit(&payload, &destination).await;
        self.finish_drop();

        let result = committed?;
        let moved = DropOutcome::Moved {
            result,
            warning: outcome.warning_reason,
        };
        Ok(self.report(&payload, &target, hook, moved))
    }

    /// The pointer released the draggable, whether or not it was over a zone.
    pub fn drag_end(&self) {
        match self.state() {
            DragState::Dragging => self.abandon("drag ended without drop"),
            DragState::Validating | DragState::Committing => {
                // Drop is still resolving; it releases the payload itself.
                if self.ended_early.replace(true) {
                    return;
                }
                let payload = self.payload();
                let element = self.active.borrow().as_ref().map(|a| a.element.clone());
                if let (Some(element), Some(payload)) = (element, payload) {
                    self.end_hook(&element, &payload, true);
                }
            }
            DragState::Idle | DragState::Cancelled => {
                if let Some(ended) = self.awaiting_end.borrow_mut().take() {
                    self.end_hook(&ended.element, &ended.payload, true);
                }
            }
        }
    }

    /// Abandon the current drag.
    ///
    /// While `Dragging` the drag ends immediately. While `Validating` the drop
    /// finishes as [`DropOutcome::Cancelled`] without committing. Returns false
    /// when there is nothing to cancel or the commit has already started.
    pub fn cancel(&self) -> bool {
        match self.state() {
            DragState::Dragging => {
                self.abandon("cancelled");
                true
            }
            DragState::Validating => {
                self.cancel_requested.set(true);
                true
            }
            DragState::Idle | DragState::Committing | DragState::Cancelled => false,
        }
    }

    // --- Internals ---

    fn transition(&self, next: DragState) {
        let previous = self.state.replace(next);
        tracing::debug!(from = %previous, to = %next, "drag state");
    }

    fn dragging_payload(&self) -> Result<DragPayload> {
        if self.state() != DragState::Dragging {
            return Err(ShelfError::NoActiveDrag);
        }
        self.payload().ok_or(ShelfError::NoActiveDrag)
    }

    fn zone<H>(
        &self,
        zone: &str,
        pick: impl FnOnce(&DropZoneHooks) -> Option<H>,
    ) -> Result<(DropTarget, Option<H>)> {
        let zones = self.zones.borrow();
        let entry = zones
            .get(zone)
            .ok_or_else(|| ShelfError::UnknownElement(zone.to_string()))?;
        Ok((entry.target.clone(), pick(&entry.hooks)))
    }

    /// Dragging → Cancelled → Idle, releasing the payload without touching the store.
    fn abandon(&self, why: &str) {
        let ended = self.active.borrow_mut().take();
        self.transition(DragState::Cancelled);
        tracing::debug!(reason = why, "drag abandoned");
        if let Some(ended) = ended {
            self.end_hook(&ended.element, &ended.payload, false);
        }
        self.transition(DragState::Idle);
    }

    fn finish_drop(&self) {
        let ended = self.active.borrow_mut().take();
        if !self.ended_early.replace(false) {
            *self.awaiting_end.borrow_mut() = ended;
        }
        self.transition(DragState::Idle);
    }

    fn end_hook(&self, element: &str, payload: &DragPayload, dropped: bool) {
        let hook = self
            .draggables
            .borrow()
            .get(element)
            .and_then(|d| d.hooks.on_drag_end.clone());
        if let Some(hook) = hook {
            hook(payload, dropped);
        }
    }

    fn report(
        &self,
        payload: &DragPayload,
        target: &DropTarget,
        hook: Option<DropHook>,
        outcome: DropOutcome,
    ) -> DropOutcome {
        if let Some(hook) = hook {
            hook(payload, target, &outcome);
        }
        outcome
    }
}
