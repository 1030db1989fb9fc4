//! User reference resolution.
//!
//! The sync core only needs two operations from the surrounding auth system:
//! read the current user reference, or establish one (minting an anonymous
//! guest if needed). Real session issuance is outside this crate; the
//! bundled provider records guests in the locally persisted state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::store::LocalDraftStore;

/// Stable reference to the acting user, used as the owner of created records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef(String);

impl UserRef {
    pub fn guest(session_id: &str) -> Self {
        Self(format!("guest:{}", session_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Seam to the authentication/session system.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current user reference, if one is already established.
    async fn current_user_ref(&self) -> Option<UserRef>;

    /// Establish a user reference, minting an anonymous one if needed.
    async fn ensure_user_ref(&self) -> Result<UserRef, AppError>;
}

/// Anonymous-session provider: mints a guest id once and keeps it in the
/// client's persisted local state.
pub struct GuestSessionProvider {
    local: Arc<LocalDraftStore>,
}

impl GuestSessionProvider {
    pub fn new(local: Arc<LocalDraftStore>) -> Self {
        Self { local }
    }
}

#[async_trait]
impl SessionProvider for GuestSessionProvider {
    async fn current_user_ref(&self) -> Option<UserRef> {
        self.local.guest_session_id().map(|id| UserRef::guest(&id))
    }

    async fn ensure_user_ref(&self) -> Result<UserRef, AppError> {
        if let Some(user) = self.current_user_ref().await {
            return Ok(user);
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        self.local.set_guest_session(&session_id);
        tracing::debug!("Established anonymous session {}", session_id);
        Ok(UserRef::guest(&session_id))
    }
}
