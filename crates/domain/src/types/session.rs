//! Session and workspace types
//!
//! A session's workspace decides which configuration version the server
//! evaluates requests against: the deployed `production` version or the
//! principal's `dev` branch.

use std::fmt;

use lookerkit_common::{optional_string_or_number, string_or_number};
use serde::{Deserialize, Serialize};

/// Named execution context on the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Workspace {
    #[default]
    Production,
    Dev,
    Other(String),
}

impl Workspace {
    /// Parse a server-reported workspace id; an empty id yields `None`.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "" => None,
            "production" => Some(Self::Production),
            "dev" => Some(Self::Dev),
            other => Some(Self::Other(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Production => "production",
            Self::Dev => "dev",
            Self::Other(id) => id.as_str(),
        }
    }

    #[must_use]
    pub const fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET`/`PATCH 4.0/session`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub workspace_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_string_or_number"
    )]
    pub sudo_user_id: Option<String>,
}

impl Session {
    /// Request body switching the session to `workspace`
    #[must_use]
    pub fn switch_to(workspace: &Workspace) -> Self {
        Self { workspace_id: workspace.as_str().to_string(), sudo_user_id: None }
    }

    #[must_use]
    pub fn workspace(&self) -> Option<Workspace> {
        Workspace::parse(&self.workspace_id)
    }
}

/// The principal behind the current token (`GET 4.0/user`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
