//! Auto-save state machine.
//!
//! ```text
//!   Clean ──mark_dirty──► Dirty ──timer / force_save──► Saving ──ok──► Clean
//!                           ▲                              │
//!                           └──────────err (error set)─────┘
//! ```
//!
//! The debounce timer is a local tokio task, so the coordinator must be driven
//! from inside a [`tokio::task::LocalSet`]. Each `mark_dirty` replaces the pending
//! timer; a generation counter makes sure a superseded timer never saves even if
//! it already woke up. The timer detaches itself before it starts saving, so
//! cancelling the timer never aborts a save in flight.
//!
//! The `saving` flag is the only thing serializing saves: a save attempt while
//! one is running returns immediately.

use super::config::AutoSaveConfig;
use crate::error::Result;
use crate::observer::{ListenerId, Observers};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use tokio::task::JoinHandle;

pub type SaveFuture = Pin<Box<dyn Future<Output = Result<()>>>>;

type SaveFn = Box<dyn Fn() -> SaveFuture>;

/// Snapshot handed to listeners and returned by [`AutoSaveCoordinator::get_state`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoSaveState {
    pub dirty: bool,
    pub saving: bool,
    pub last_saved: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

struct Inner {
    config: AutoSaveConfig,
    save: SaveFn,
    state: RefCell<AutoSaveState>,
    timer: RefCell<Option<JoinHandle<()>>>,
    generation: Cell<u64>,
    // Bumped by every mark_dirty; lets a save tell whether edits arrived mid-flight.
    revision: Cell<u64>,
    destroyed: Cell<bool>,
    listeners: Observers<AutoSaveState>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.abort();
        }
    }
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AutoSaveCoordinator {
    inner: Rc<Inner>,
}

impl AutoSaveCoordinator {
    pub fn new<F, Fut>(config: AutoSaveConfig, save: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<()>> + 'static,
    {
        let save: SaveFn = Box::new(move || Box::pin(save()) as SaveFuture);
        Self {
            inner: Rc::new(Inner {
                config,
                save,
                state: RefCell::new(AutoSaveState::default()),
                timer: RefCell::new(None),
                generation: Cell::new(0),
                revision: Cell::new(0),
                destroyed: Cell::new(false),
                listeners: Observers::new(),
            }),
        }
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.inner.config
    }

    pub fn get_state(&self) -> AutoSaveState {
        self.inner.state.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Record an edit and (re)start the debounce timer.
    pub fn mark_dirty(&self) {
        if self.is_destroyed() {
            return;
        }
        self.inner.revision.set(self.inner.revision.get() + 1);
        {
            let mut state = self.inner.state.borrow_mut();
            state.dirty = true;
            state.error = None;
        }
        self.notify();
        self.schedule();
    }

    /// Declare the content saved by other means.
    ///
    /// While a save is in flight only the pending timer is cancelled; the
    /// save's own resolution decides `dirty` and `last_saved`.
    pub fn mark_clean(&self) {
        if self.is_destroyed() {
            return;
        }
        self.cancel_auto_save();
        {
            let mut state = self.inner.state.borrow_mut();
            if state.saving || !state.dirty {
                return;
            }
            state.dirty = false;
            state.error = None;
            state.last_saved = Some(Utc::now());
        }
        self.notify();
    }

    /// Cancel the pending timer and save now.
    ///
    /// Returns true if the content is saved (or there was nothing to save, or a
    /// save is already running), false if the save failed or the coordinator
    /// was destroyed.
    pub async fn force_save(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.cancel_auto_save();
        self.attempt_save().await
    }

    pub fn cancel_auto_save(&self) {
        self.inner.generation.set(self.inner.generation.get() + 1);
        if let Some(timer) = self.inner.timer.borrow_mut().take() {
            timer.abort();
        }
    }

    pub fn has_pending_save(&self) -> bool {
        self.inner.timer.borrow().is_some()
    }

    pub fn add_listener(&self, listener: impl Fn(&AutoSaveState) + 'static) -> ListenerId {
        self.inner.listeners.subscribe(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    /// Terminal: cancels the timer and drops every listener.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.cancel_auto_save();
        self.inner.listeners.clear();
        tracing::debug!("auto-save coordinator destroyed");
    }

    fn schedule(&self) {
        self.cancel_auto_save();
        if !self.inner.config.enabled {
            return;
        }

        let generation = self.inner.generation.get();
        let delay = self.inner.config.delay();
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.generation.get() != generation || inner.destroyed.get() {
                return;
            }
            inner.timer.borrow_mut().take();
            AutoSaveCoordinator { inner }.attempt_save().await;
        });
        *self.inner.timer.borrow_mut() = Some(handle);
    }

    async fn attempt_save(&self) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.dirty || state.saving {
                return true;
            }
            state.saving = true;
        }
        self.notify();

        let revision = self.inner.revision.get();
        let result = (self.inner.save)().await;

        let saved = {
            let mut state = self.inner.state.borrow_mut();
            state.saving = false;
            match &result {
                Ok(()) => {
                    // Edits made while saving are not covered by this save.
                    state.dirty = self.inner.revision.get() != revision;
                    state.last_saved = Some(Utc::now());
                    state.error = None;
                    true
                }
                Err(e) => {
                    state.error = Some(e.to_string());
                    false
                }
            }
        };

        match result {
            Ok(()) => tracing::debug!("auto-save completed"),
            Err(e) => tracing::warn!(error = %e, "auto-save failed; changes remain dirty"),
        }
        self.notify();

        // A timer that fired mid-save bailed out; edits it covered need a new one.
        if saved && self.get_state().dirty && !self.has_pending_save() && !self.is_destroyed() {
            self.schedule();
        }
        saved
    }

    fn notify(&self) {
        if self.is_destroyed() {
            return;
        }
        let snapshot = self.get_state();
        self.inner.listeners.notify(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShelfError;
    use std::time::Duration;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    /// Counts save calls; fails while `fail` is set; takes `delay` per save.
    #[derive(Clone, Default)]
    struct Saver {
        calls: Rc<Cell<usize>>,
        fail: Rc<Cell<bool>>,
        delay: Duration,
    }

    impl Saver {
        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn coordinator(&self, config: AutoSaveConfig) -> AutoSaveCoordinator {
            let saver = self.clone();
            AutoSaveCoordinator::new(config, move || {
                let saver = saver.clone();
                async move {
                    saver.calls.set(saver.calls.get() + 1);
                    if !saver.delay.is_zero() {
                        sleep(saver.delay).await;
                    }
                    if saver.fail.get() {
                        Err(ShelfError::Save("disk full".to_string()))
                    } else {
                        Ok(())
                    }
                }
            })
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn repeated_mark_dirty_saves_once() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::default();
                let coordinator = saver.coordinator(AutoSaveConfig::default());

                for _ in 0..5 {
                    coordinator.mark_dirty();
                    sleep(Duration::from_millis(200)).await;
                }
                assert_eq!(saver.calls.get(), 0);

                // Last edit was 200ms ago; the timer fires 800ms from now.
                sleep(Duration::from_millis(799)).await;
                assert_eq!(saver.calls.get(), 0);

                sleep(Duration::from_millis(2)).await;
                assert_eq!(saver.calls.get(), 1);
                let state = coordinator.get_state();
                assert!(!state.dirty);
                assert!(state.last_saved.is_some());

                sleep(Duration::from_secs(5)).await;
                assert_eq!(saver.calls.get(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn force_save_bypasses_timer() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::default();
                let coordinator = saver.coordinator(AutoSaveConfig::default());

                coordinator.mark_dirty();
                assert!(coordinator.has_pending_save());
                assert!(coordinator.force_save().await);
                assert_eq!(saver.calls.get(), 1);
                assert!(!coordinator.has_pending_save());

                sleep(Duration::from_secs(3)).await;
                assert_eq!(saver.calls.get(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn failed_save_stays_dirty_and_retries() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::default();
                saver.fail.set(true);
                let coordinator = saver.coordinator(AutoSaveConfig::default());

                coordinator.mark_dirty();
                assert!(!coordinator.force_save().await);
                let state = coordinator.get_state();
                assert!(state.dirty);
                assert!(!state.saving);
                assert!(state.error.as_deref().unwrap().contains("disk full"));
                assert!(state.last_saved.is_none());

                saver.fail.set(false);
                assert!(coordinator.force_save().await);
                let state = coordinator.get_state();
                assert!(!state.dirty);
                assert_eq!(state.error, None);
                assert_eq!(saver.calls.get(), 2);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn timer_failure_is_recorded() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::default();
                saver.fail.set(true);
                let coordinator = saver.coordinator(AutoSaveConfig::default());

                coordinator.mark_dirty();
                sleep(Duration::from_millis(1500)).await;
                assert_eq!(saver.calls.get(), 1);
                assert!(coordinator.get_state().error.is_some());

                // A new edit clears the error and schedules the retry.
                saver.fail.set(false);
                coordinator.mark_dirty();
                assert_eq!(coordinator.get_state().error, None);
                sleep(Duration::from_millis(1500)).await;
                assert!(!coordinator.get_state().dirty);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn mark_clean_is_idempotent() {
        LocalSet::new()
            .run_until(async {
                let coordinator = Saver::default().coordinator(AutoSaveConfig::default());

                coordinator.mark_clean();
                assert_eq!(coordinator.get_state().last_saved, None);

                coordinator.mark_dirty();
                coordinator.mark_clean();
                let first = coordinator.get_state().last_saved;
                assert!(first.is_some());
                assert!(!coordinator.has_pending_save());

                coordinator.mark_clean();
                assert_eq!(coordinator.get_state().last_saved, first);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn saves_never_overlap() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::slow(Duration::from_millis(100));
                let coordinator = saver.coordinator(AutoSaveConfig::default());
                coordinator.mark_dirty();

                let background = coordinator.clone();
                let first = tokio::task::spawn_local(async move { background.force_save().await });
                sleep(Duration::from_millis(10)).await;
                assert!(coordinator.get_state().saving);

                // Re-entrant attempt returns at once without calling save.
                assert!(coordinator.force_save().await);
                assert_eq!(saver.calls.get(), 1);

                // mark_clean cannot override the in-flight save.
                coordinator.mark_clean();
                assert!(coordinator.get_state().dirty);

                assert!(first.await.unwrap());
                let state = coordinator.get_state();
                assert!(!state.dirty);
                assert!(!state.saving);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn edit_during_save_stays_dirty() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::slow(Duration::from_millis(100));
                let coordinator = saver.coordinator(AutoSaveConfig::default());
                coordinator.mark_dirty();

                let background = coordinator.clone();
                let first = tokio::task::spawn_local(async move { background.force_save().await });
                sleep(Duration::from_millis(10)).await;
                coordinator.mark_dirty();

                assert!(first.await.unwrap());
                assert!(coordinator.get_state().dirty);

                sleep(Duration::from_millis(1500)).await;
                assert_eq!(saver.calls.get(), 2);
                assert!(!coordinator.get_state().dirty);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn edit_during_save_longer_than_debounce_is_saved() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::slow(Duration::from_millis(1000));
                let coordinator = saver.coordinator(AutoSaveConfig::with_debounce_ms(100));
                coordinator.mark_dirty();

                let background = coordinator.clone();
                let first = tokio::task::spawn_local(async move { background.force_save().await });
                sleep(Duration::from_millis(10)).await;
                coordinator.mark_dirty();

                // The timer for the second edit fires while the first save runs.
                sleep(Duration::from_millis(200)).await;
                assert_eq!(saver.calls.get(), 1);
                assert!(coordinator.get_state().saving);

                assert!(first.await.unwrap());
                sleep(Duration::from_secs(30)).await;
                assert_eq!(saver.calls.get(), 2);
                let state = coordinator.get_state();
                assert!(!state.dirty);
                assert!(!state.saving);
                assert!(!coordinator.has_pending_save());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn listeners_see_each_transition() {
        LocalSet::new()
            .run_until(async {
                let coordinator = Saver::default().coordinator(AutoSaveConfig::default());
                let seen = Rc::new(RefCell::new(Vec::new()));

                coordinator.add_listener(|_| panic!("broken listener"));
                let log = Rc::clone(&seen);
                let id = coordinator.add_listener(move |s| log.borrow_mut().push((s.dirty, s.saving)));

                coordinator.mark_dirty();
                coordinator.force_save().await;
                assert_eq!(
                    *seen.borrow(),
                    vec![(true, false), (true, true), (false, false)]
                );

                assert!(coordinator.remove_listener(id));
                coordinator.mark_dirty();
                assert_eq!(seen.borrow().len(), 3);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn destroy_is_terminal() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::default();
                let coordinator = saver.coordinator(AutoSaveConfig::default());
                let hits = Rc::new(Cell::new(0));
                let counter = Rc::clone(&hits);
                coordinator.add_listener(move |_| counter.set(counter.get() + 1));

                coordinator.mark_dirty();
                coordinator.destroy();
                assert!(coordinator.is_destroyed());

                sleep(Duration::from_secs(5)).await;
                assert_eq!(saver.calls.get(), 0);

                coordinator.mark_dirty();
                assert!(!coordinator.force_save().await);
                assert_eq!(hits.get(), 1);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn disabled_config_never_schedules() {
        LocalSet::new()
            .run_until(async {
                let saver = Saver::default();
                let coordinator = saver.coordinator(AutoSaveConfig::disabled());

                coordinator.mark_dirty();
                assert!(coordinator.get_state().dirty);
                assert!(!coordinator.has_pending_save());
                sleep(Duration::from_secs(10)).await;
                assert_eq!(saver.calls.get(), 0);

                assert!(coordinator.force_save().await);
                assert_eq!(saver.calls.get(), 1);
            })
            .await;
    }
}
