//! Debounced draft autosave.
//!
//! Each form gets one [`DraftAutosave`] task. Every
//! [`schedule`](AutosaveHandle::schedule) call replaces the pending snapshot
//! and restarts the quiet-period timer, so at most one write is pending and
//! only the last snapshot inside a burst of edits reaches storage.
//!
//! Write failures (storage unavailable, quota exceeded) are logged and
//! dropped: losing a draft never interrupts the edit in progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use crate::draft::store::DraftStore;
use crate::models::field::FieldValues;

/// Messages from the handle to the timer task.
#[derive(Debug)]
enum AutosaveCommand {
    /// Replace the pending snapshot and restart the timer.
    Schedule(FieldValues),
    /// Drop the pending snapshot without writing.
    Cancel,
    /// Drop the pending snapshot and remove the stored draft. Handled after
    /// any write already in progress.
    Discard,
}

/// Builder for a per-form autosave timer.
///
/// Call [`spawn`](Self::spawn) to start the background task.
pub struct DraftAutosave {
    key: String,
    delay: Duration,
    store: Arc<dyn DraftStore>,
    cancel: CancellationToken,
}

impl DraftAutosave {
    /// Construct a new autosave timer (does not start it yet).
    #[must_use]
    pub fn new(key: String, delay: Duration, store: Arc<dyn DraftStore>) -> Self {
        Self {
            key,
            delay,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn the background timer task and return a handle for controlling it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(self) -> AutosaveHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let writes = Arc::new(AtomicU64::new(0));
        let cancel_for_handle = self.cancel.clone();

        let task_handle = tokio::spawn(
            Self::run(
                self.key.clone(),
                self.delay,
                self.store,
                command_rx,
                self.cancel,
                Arc::clone(&writes),
            )
            .instrument(info_span!("draft_autosave")),
        );

        AutosaveHandle {
            command_tx,
            writes,
            key: self.key,
            join_handle: Some(task_handle),
            cancel: cancel_for_handle,
        }
    }

    /// Core timer loop.
    async fn run(
        key: String,
        delay: Duration,
        store: Arc<dyn DraftStore>,
        mut command_rx: mpsc::UnboundedReceiver<AutosaveCommand>,
        cancel: CancellationToken,
        writes: Arc<AtomicU64>,
    ) {
        let mut pending: Option<FieldValues> = None;

        loop {
            let Some(snapshot) = pending.take() else {
                // ── Idle: wait for the next edit ─────────────
                tokio::select! {
                    biased;
                    command = command_rx.recv() => match command {
                        Some(AutosaveCommand::Schedule(values)) => pending = Some(values),
                        Some(AutosaveCommand::Cancel) => {}
                        Some(AutosaveCommand::Discard) => Self::clear(&key, &store).await,
                        None => return,
                    },
                    () = cancel.cancelled() => return,
                }
                continue;
            };

            // ── Pending: a fresh sleep per iteration restarts the window ──
            // Commands come first so a queued cancel or discard beats an
            // elapsed timer.
            tokio::select! {
                biased;
                command = command_rx.recv() => match command {
                    Some(AutosaveCommand::Schedule(values)) => pending = Some(values),
                    Some(AutosaveCommand::Cancel) => debug!(key, "pending draft discarded"),
                    Some(AutosaveCommand::Discard) => Self::clear(&key, &store).await,
                    None => return,
                },
                () = cancel.cancelled() => {
                    debug!(key, "autosave cancelled with pending draft");
                    return;
                }
                () = tokio::time::sleep(delay) => {
                    Self::write(&key, &store, snapshot).await;
                    writes.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }

    async fn write(key: &str, store: &Arc<dyn DraftStore>, snapshot: FieldValues) {
        let store = Arc::clone(store);
        let owned_key = key.to_owned();
        let fields = snapshot.len();

        let result =
            tokio::task::spawn_blocking(move || store.save(&owned_key, &snapshot)).await;

        match result {
            Ok(Ok(())) => debug!(key, fields, "draft autosaved"),
            Ok(Err(err)) => warn!(key, %err, "draft autosave failed, continuing without draft"),
            Err(err) => warn!(key, %err, "draft autosave task failed"),
        }
    }

    async fn clear(key: &str, store: &Arc<dyn DraftStore>) {
        let store = Arc::clone(store);
        let owned_key = key.to_owned();

        let result = tokio::task::spawn_blocking(move || store.clear(&owned_key)).await;

        match result {
            Ok(Ok(())) => debug!(key, "stored draft discarded"),
            Ok(Err(err)) => warn!(key, %err, "failed to discard draft"),
            Err(err) => warn!(key, %err, "draft discard task failed"),
        }
    }
}

/// Handle returned from [`DraftAutosave::spawn`] for controlling the timer.
pub struct AutosaveHandle {
    command_tx: mpsc::UnboundedSender<AutosaveCommand>,
    writes: Arc<AtomicU64>,
    key: String,
    /// Task handle for the background timer loop.
    join_handle: Option<JoinHandle<()>>,
    /// Cancelled when the handle is dropped.
    cancel: CancellationToken,
}

impl Drop for AutosaveHandle {
    /// Cancel the background task when the handle is dropped, discarding any
    /// pending write.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl AutosaveHandle {
    /// Replace the pending snapshot and restart the quiet-period timer.
    pub fn schedule(&self, values: FieldValues) {
        if self.command_tx.send(AutosaveCommand::Schedule(values)).is_err() {
            debug!(key = %self.key, "autosave task already stopped");
        }
    }

    /// Discard the pending snapshot, if any, without writing it.
    pub fn cancel_pending(&self) {
        if self.command_tx.send(AutosaveCommand::Cancel).is_err() {
            debug!(key = %self.key, "autosave task already stopped");
        }
    }

    /// Drop the pending snapshot and remove the stored draft. Runs on the
    /// timer task after any write already in progress, so a write that
    /// started before this call cannot outlive it.
    pub fn discard(&self) {
        if self.command_tx.send(AutosaveCommand::Discard).is_err() {
            debug!(key = %self.key, "autosave task already stopped");
        }
    }

    /// Number of timer firings so far, successful or not.
    #[must_use]
    pub fn write_attempts(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Storage key this handle writes to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Stop the timer task and wait for it to exit. Pending writes are dropped.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}
