//! Draft synchronization core.
//!
//! Keeps a user's in-progress application consistent between ephemeral
//! edits, locally persisted state, and the remote record, while tolerating
//! unauthenticated users, rapid keystrokes, and remote failures.
//!
//! Control flow: an edit mutates the [`LocalDraftStore`] synchronously, the
//! [`AutosaveScheduler`] is re-armed, and after the quiet period the
//! [`RemoteUpsertClient`] performs exactly one create-or-update; a newly
//! assigned identity flows back into the store.

mod autosave;
mod loader;
mod upsert;

pub use autosave::AutosaveScheduler;
pub use loader::DraftLoader;
pub use upsert::{RemoteUpsertClient, SaveOutcome};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::cache::TtlCache;
use crate::db::ApplicationStore;
use crate::errors::AppError;
use crate::models::{Draft, DraftPatch};
use crate::session::SessionProvider;
use crate::store::LocalDraftStore;

/// Per-client composition of the sync core, exposing the surface the
/// surrounding application uses: update, clear, load, save-now, and a
/// read-only accessor with change notification.
pub struct DraftSession {
    local: Arc<LocalDraftStore>,
    scheduler: Arc<AutosaveScheduler>,
    loader: DraftLoader,
}

impl DraftSession {
    pub fn new(
        local: Arc<LocalDraftStore>,
        store: Arc<dyn ApplicationStore>,
        sessions: Arc<dyn SessionProvider>,
        departments: Arc<TtlCache<String, String>>,
        quiet_period: Duration,
    ) -> Self {
        let client = Arc::new(RemoteUpsertClient::new(
            store.clone(),
            local.clone(),
            departments,
        ));
        let scheduler = Arc::new(AutosaveScheduler::new(
            quiet_period,
            client,
            local.clone(),
            sessions,
        ));
        let loader = DraftLoader::new(store, local.clone());

        Self {
            local,
            scheduler,
            loader,
        }
    }

    /// Merge a partial edit into the draft. A change to the query text
    /// (re)arms the autosave timer.
    pub fn update(&self, patch: &DraftPatch) -> Draft {
        let query_changed = self.local.update(patch);
        if query_changed {
            self.scheduler.schedule();
        }
        self.local.draft()
    }

    /// Reset to the empty draft. Cancels any pending autosave; the next
    /// saved draft is a new remote record.
    pub fn clear(&self) {
        self.scheduler.cancel();
        self.local.clear();
    }

    /// Force an immediate save, bypassing the debounce.
    pub async fn save_now(&self) -> Result<SaveOutcome, AppError> {
        self.scheduler.flush_now().await
    }

    /// Hydrate the draft from a remote record.
    pub async fn load(&self, id: &str) -> Result<Draft, AppError> {
        self.loader.load(id).await
    }

    /// Current draft value.
    pub fn draft(&self) -> Draft {
        self.local.draft()
    }

    /// Change notification for UI binding.
    #[allow(dead_code)]
    pub fn subscribe(&self) -> watch::Receiver<Draft> {
        self.local.subscribe()
    }
}

impl Drop for DraftSession {
    fn drop(&mut self) {
        // Tearing down the editing context cancels a pending timer; an
        // in-flight write completes and the epoch guard discards its result
        // if the draft was cleared.
        self.scheduler.cancel();
    }
}
