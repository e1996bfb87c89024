//! Named drag events and the bus collaborators listen on.
//!
//! Listeners subscribe to one event name and get an opaque [`Subscription`] back.
//! Dispatch goes through [`Observers`], so a panicking listener is logged and
//! skipped instead of breaking the drag.

use super::validate::ValidationOutcome;
use crate::model::{DragPayload, DropTarget, MoveDestination, MoveResult};
use crate::observer::{ListenerId, Observers};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    DragStart,
    DragEnter,
    DragLeave,
    Drop,
    Moved,
}

impl DragEventKind {
    pub const ALL: [DragEventKind; 5] = [
        DragEventKind::DragStart,
        DragEventKind::DragEnter,
        DragEventKind::DragLeave,
        DragEventKind::Drop,
        DragEventKind::Moved,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DragEventKind::DragStart => "dragstart",
            DragEventKind::DragEnter => "dragenter",
            DragEventKind::DragLeave => "dragleave",
            DragEventKind::Drop => "drop",
            DragEventKind::Moved => "moved",
        }
    }

    fn slot(&self) -> usize {
        match self {
            DragEventKind::DragStart => 0,
            DragEventKind::DragEnter => 1,
            DragEventKind::DragLeave => 2,
            DragEventKind::Drop => 3,
            DragEventKind::Moved => 4,
        }
    }
}

impl fmt::Display for DragEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DragEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DragEventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown drag event '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    DragStart {
        payload: DragPayload,
    },
    /// Carries the fast-path verdict for hover feedback.
    DragEnter {
        payload: DragPayload,
        target: DropTarget,
        outcome: ValidationOutcome,
    },
    DragLeave {
        payload: DragPayload,
        target: DropTarget,
    },
    /// Emitted once the full pipeline has decided.
    Drop {
        payload: DragPayload,
        target: DropTarget,
        outcome: ValidationOutcome,
    },
    Moved {
        payload: DragPayload,
        destination: MoveDestination,
        result: MoveResult,
    },
}

impl DragEvent {
    pub fn kind(&self) -> DragEventKind {
        match self {
            DragEvent::DragStart { .. } => DragEventKind::DragStart,
            DragEvent::DragEnter { .. } => DragEventKind::DragEnter,
            DragEvent::DragLeave { .. } => DragEventKind::DragLeave,
            DragEvent::Drop { .. } => DragEventKind::Drop,
            DragEvent::Moved { .. } => DragEventKind::Moved,
        }
    }

    pub fn payload(&self) -> &DragPayload {
        match self {
            DragEvent::DragStart { payload }
            | DragEvent::DragEnter { payload, .. }
            | DragEvent::DragLeave { payload, .. }
            | DragEvent::Drop { payload, .. }
            | DragEvent::Moved { payload, .. } => payload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: DragEventKind,
    id: ListenerId,
}

impl Subscription {
    pub fn kind(&self) -> DragEventKind {
        self.kind
    }
}

#[derive(Default)]
pub struct EventBus {
    channels: [Observers<DragEvent>; 5],
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        kind: DragEventKind,
        listener: impl Fn(&DragEvent) + 'static,
    ) -> Subscription {
        let id = self.channels[kind.slot()].subscribe(listener);
        Subscription { kind, id }
    }

    /// Returns false if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.channels[subscription.kind.slot()].unsubscribe(subscription.id)
    }

    pub fn listener_count(&self, kind: DragEventKind) -> usize {
        self.channels[kind.slot()].len()
    }

    pub fn clear(&self) {
        for channel in &self.channels {
            channel.clear();
        }
    }

    /// Deliver `event` to the listeners of its kind.
    pub fn emit(&self, event: &DragEvent) -> usize {
        let kind = event.kind();
        tracing::trace!(event = kind.name(), id = %event.payload().id, "emit");
        self.channels[kind.slot()].notify(event)
    }
}
