//! Debounced autosave scheduler.
//!
//! Bounds the rate of remote writes while guaranteeing the last edit is
//! eventually persisted. Query edits (re)arm a quiet-period timer; when it
//! expires the upsert client runs once from a fresh snapshot. Writes are
//! serialized through an async mutex, so a timer that fires during an
//! in-flight save waits and then issues exactly one follow-up write.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::errors::AppError;
use crate::session::SessionProvider;
use crate::store::LocalDraftStore;

use super::upsert::{RemoteUpsertClient, SaveOutcome};

pub struct AutosaveScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    quiet_period: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    save_lock: tokio::sync::Mutex<()>,
    client: Arc<RemoteUpsertClient>,
    local: Arc<LocalDraftStore>,
    sessions: Arc<dyn SessionProvider>,
}

impl AutosaveScheduler {
    pub fn new(
        quiet_period: Duration,
        client: Arc<RemoteUpsertClient>,
        local: Arc<LocalDraftStore>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                quiet_period,
                timer: Mutex::new(None),
                save_lock: tokio::sync::Mutex::new(()),
                client,
                local,
                sessions,
            }),
        }
    }

    /// (Re)arm the quiet-period timer. A timer still sleeping is cancelled
    /// and replaced; rapid edits therefore collapse into one write.
    pub fn schedule(&self) {
        let mut timer = self.inner.timer.lock().unwrap();
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let inner = Arc::clone(&self.inner);
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.quiet_period).await;
            // Detach the save from the timer handle: a re-arm may only
            // cancel the sleep, never a write that already started.
            tokio::spawn(async move {
                match inner.run_save().await {
                    Ok(_) => {}
                    Err(AppError::Validation(msg)) => {
                        tracing::debug!("Autosave skipped: {}", msg);
                    }
                    Err(e) => {
                        tracing::warn!("Autosave failed: {}", e);
                    }
                }
            });
        }));
    }

    /// Cancel a pending (not yet fired) timer. An edit below the quiet
    /// period is an accepted data-loss window on teardown.
    pub fn cancel(&self) {
        if let Some(handle) = self.inner.timer.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Force an immediate save, bypassing the debounce.
    pub async fn flush_now(&self) -> Result<SaveOutcome, AppError> {
        self.cancel();
        self.inner.run_save().await
    }
}

impl Inner {
    /// One serialized save attempt from a fresh snapshot.
    async fn run_save(&self) -> Result<SaveOutcome, AppError> {
        let _guard = self.save_lock.lock().await;

        let snapshot = self.local.snapshot();
        if snapshot.draft.query.trim().is_empty() {
            return Ok(SaveOutcome::Skipped);
        }

        let user = self.sessions.ensure_user_ref().await.map_err(|e| {
            AppError::AuthResolution(format!(
                "Could not establish a user reference: {}",
                e.message()
            ))
        })?;

        self.client.save(snapshot, &user).await
    }
}
