use super::events::{DragEvent, EventBus};
use crate::error::{Result, ShelfError};
use crate::model::{DragPayload, MoveDestination, MoveResult};
use crate::store::BookmarkStore;
use std::cell::Cell;
use std::rc::Rc;

/// Applies validated moves to the store.
///
/// The committer is shared by every session created with
/// [`super::DragSession::sharing`]; its gate admits one commit at a time.
/// A failed move is returned as-is and logged. Nothing is rolled back here.
pub struct MutationCommitter<S: BookmarkStore + ?Sized> {
    store: Rc<S>,
    bus: Rc<EventBus>,
    in_flight: Cell<bool>,
}

impl<S: BookmarkStore + ?Sized> MutationCommitter<S> {
    pub fn new(store: Rc<S>, bus: Rc<EventBus>) -> Self {
        Self {
            store,
            bus,
            in_flight: Cell::new(false),
        }
    }

    pub fn store(&self) -> &Rc<S> {
        &self.store
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn is_committing(&self) -> bool {
        self.in_flight.get()
    }

    pub async fn commit(
        &self,
        payload: &DragPayload,
        destination: &MoveDestination,
    ) -> Result<MoveResult> {
        if self.in_flight.replace(true) {
            return Err(ShelfError::Busy);
        }
        let _gate = GateGuard(&self.in_flight);

        match self.store.move_node(&payload.id, destination).await {
            Ok(result) => {
                tracing::debug!(
                    id = %payload.id,
                    parent = %result.parent_id,
                    index = result.index,
                    "move committed"
                );
                self.bus.emit(&DragEvent::Moved {
                    payload: payload.clone(),
                    destination: destination.clone(),
                    result: result.clone(),
                });
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(id = %payload.id, parent = %destination.parent_id, error = %e, "store move failed");
                Err(e)
            }
        }
    }
}

/// Reopens the gate however the commit ends, including when the future is dropped.
struct GateGuard<'a>(&'a Cell<bool>);

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
