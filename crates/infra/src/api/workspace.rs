//! Dev-workspace duplicate connections
//!
//! Some operations must run against the principal's `dev` workspace while
//! the primary connection stays where it is. The primary lazily derives a
//! second connection for that: same principal, independent impersonation
//! token, session pinned to `dev`.
//!
//! ## States
//! - `Absent`: no duplicate yet, or the last attempt failed
//! - `Creating`: a caller holds the slot lock and is running the handshake
//! - `Present`: the duplicate exists and its session reported `dev`
//!
//! Concurrent callers serialize on the slot lock. The first one performs
//! the handshake; the rest wait and then observe its result, so at most one
//! duplicate is ever created per primary.

use std::sync::Arc;

use lookerkit_domain::Workspace;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::client::Client;
use super::errors::{ApiError, ApiResult};

/// Holder for a primary connection's duplicate
pub(crate) type DuplicateSlot = Mutex<Option<Arc<Client>>>;

/// Lifecycle of a primary connection's duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateState {
    Absent,
    Creating,
    Present,
}

impl Client {
    /// Current duplicate lifecycle state; never blocks
    pub fn duplicate_state(&self) -> DuplicateState {
        match self.duplicate.try_lock() {
            Err(_) => DuplicateState::Creating,
            Ok(slot) if slot.is_some() => DuplicateState::Present,
            Ok(_) => DuplicateState::Absent,
        }
    }

    /// The dev-workspace duplicate, if one has been created
    ///
    /// Waits for an in-flight creation to finish.
    pub async fn dev_client(&self) -> Option<Arc<Client>> {
        self.duplicate.lock().await.clone()
    }

    /// Create, at most once, a connection impersonating `principal_id` with
    /// its session pinned to the `dev` workspace
    ///
    /// An existing duplicate is returned as-is. The duplicate shares this
    /// connection's base URL, user agent, static headers, completion
    /// callback and rate limiter, and authenticates with a static
    /// impersonation token.
    ///
    /// # Errors
    ///
    /// - Any error from the impersonation or workspace-switch calls
    /// - `ApiError::WorkspaceNotHonored` if the server reports `production`
    ///   or no workspace after the switch
    ///
    /// On failure nothing is recorded: the state returns to `Absent` and a
    /// later call starts over. This connection stays usable either way.
    #[instrument(skip(self), fields(base_url = %self.base_url()))]
    pub async fn ensure_duplicate(&self, principal_id: &str) -> ApiResult<Arc<Client>> {
        let mut slot = self.duplicate.lock().await;
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }

        self.create_duplicate(&mut slot, principal_id).await
    }

    /// [`Client::ensure_duplicate`] for the principal behind this
    /// connection's own token
    ///
    /// The principal is resolved while the slot lock is held, so concurrent
    /// callers share one `GET 4.0/user` along with the rest of the handshake.
    #[instrument(skip(self), fields(base_url = %self.base_url()))]
    pub async fn ensure_dev_connection(&self) -> ApiResult<Arc<Client>> {
        let mut slot = self.duplicate.lock().await;
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }

        let (user, _) = self.current_user().await?;
        self.create_duplicate(&mut slot, &user.id).await
    }

    /// Run the impersonation handshake and record the result in `slot`
    async fn create_duplicate(
        &self,
        slot: &mut Option<Arc<Client>>,
        principal_id: &str,
    ) -> ApiResult<Arc<Client>> {
        let (token, _) = self.login_user_token(principal_id).await?;
        let mut duplicate = self.derived_builder().static_token(token.access_token).build()?;

        let (session, _) = duplicate.set_workspace(&Workspace::Dev).await?;
        match session.workspace() {
            None | Some(Workspace::Production) => {
                warn!(workspace_id = %session.workspace_id, "server did not honor dev workspace");
                return Err(ApiError::WorkspaceNotHonored(session.workspace_id));
            }
            Some(workspace) => duplicate.workspace = workspace,
        }

        info!(principal_id, workspace = %duplicate.workspace, "created duplicate connection");
        let duplicate = Arc::new(duplicate);
        *slot = Some(Arc::clone(&duplicate));
        Ok(duplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_client_has_no_duplicate() {
        let client = Client::new("https://x.example.com/api/").unwrap();
        assert_eq!(client.duplicate_state(), DuplicateState::Absent);
        assert!(client.dev_client().await.is_none());
    }

    #[tokio::test]
    async fn test_held_slot_reports_creating() {
        let client = Client::new("https://x.example.com/api/").unwrap();
        let _guard = client.duplicate.lock().await;
        assert_eq!(client.duplicate_state(), DuplicateState::Creating);
    }

    #[tokio::test]
    async fn test_empty_principal_is_rejected_without_io() {
        let client = Client::new("http://127.0.0.1:9/api/").unwrap();
        let err = client.ensure_duplicate("").await.unwrap_err();
        assert!(err.is_argument_error());
        assert_eq!(client.duplicate_state(), DuplicateState::Absent);
    }
}
