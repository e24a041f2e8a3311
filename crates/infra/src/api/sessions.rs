//! Session endpoints
//!
//! The handful of calls the duplication manager needs: reading and
//! switching the session workspace, resolving the current principal, and
//! issuing an impersonation token.

use lookerkit_common::auth::AuthToken;
use lookerkit_domain::constants::{CURRENT_USER_PATH, LOGIN_PATH, SESSION_PATH};
use lookerkit_domain::{ArgError, CurrentUser, Session, Workspace};
use reqwest::Method;
use tracing::{debug, info};

use super::client::{ApiResponse, Client};
use super::crud::join_path;
use super::errors::{ApiError, ApiResult};

impl Client {
    /// `GET 4.0/session`
    pub async fn session(&self) -> ApiResult<(Session, ApiResponse)> {
        let (session, response) = self.get::<Session>(SESSION_PATH, &[]).await?;
        Ok((session.unwrap_or_default(), response))
    }

    /// `PATCH 4.0/session` with `{"workspace_id": ...}`
    ///
    /// Returns the session the server reports after the switch; callers
    /// must check it, since a server may silently keep the old workspace.
    pub async fn set_workspace(&self, workspace: &Workspace) -> ApiResult<(Session, ApiResponse)> {
        debug!(workspace = %workspace, "switching session workspace");
        let request =
            self.new_request(Method::PATCH, SESSION_PATH, Some(&Session::switch_to(workspace)))?;
        let (session, response) = self.execute::<Session>(request).await?;
        Ok((session.unwrap_or_default(), response))
    }

    /// `GET 4.0/user`: the principal behind this connection's token
    ///
    /// # Errors
    ///
    /// A reply without a body fails with [`ApiError::EmptyBody`]; there is
    /// no principal to fall back to.
    pub async fn current_user(&self) -> ApiResult<(CurrentUser, ApiResponse)> {
        let (user, response) = self.get::<CurrentUser>(CURRENT_USER_PATH, &[]).await?;
        let user = user.ok_or(ApiError::EmptyBody(response.status))?;
        Ok((user, response))
    }

    /// `POST 4.0/login/<user_id>`: a fresh token impersonating `user_id`
    ///
    /// The token is independent of this connection's own credentials and is
    /// meant to be installed as a static credential on another client.
    ///
    /// # Errors
    ///
    /// An empty `user_id` fails with an argument error before any request
    /// is sent
    pub async fn login_user_token(&self, user_id: &str) -> ApiResult<(AuthToken, ApiResponse)> {
        if user_id.trim().is_empty() {
            return Err(ArgError::new("user_id", "cannot be empty").into());
        }

        let segment = urlencoding::encode(user_id);
        let path = join_path(LOGIN_PATH, &[segment.as_ref()]);
        let request = self.new_request::<()>(Method::POST, &path, None)?;

        let (token, response) = self.execute::<AuthToken>(request).await?;
        let mut token = token.ok_or(ApiError::EmptyBody(response.status))?;
        token.stamp_expiry();

        info!(user_id, expires_in = token.expires_in, "issued impersonation token");
        Ok((token, response))
    }
}
