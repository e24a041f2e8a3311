//! Resource identifiers
//!
//! Some resources are addressed by numeric ids, others by string slugs.
//! [`Identifier`] keeps the two apart so path building can branch on the
//! variant instead of inspecting values at runtime.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::ArgError;

/// Identifier of a single API resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(i64),
    Slug(String),
}

impl Identifier {
    /// Reject identifiers that can never name a resource.
    ///
    /// Numeric ids must be at least 1. Slugs must not be empty; their
    /// content is otherwise passed through unchecked.
    ///
    /// # Errors
    /// Returns an [`ArgError`] naming `arg`.
    pub fn validate(&self, arg: &str) -> Result<(), ArgError> {
        match self {
            Self::Numeric(n) if *n < 1 => Err(ArgError::new(arg, "cannot be less than 1")),
            Self::Slug(slug) if slug.is_empty() => Err(ArgError::new(arg, "cannot be empty")),
            _ => Ok(()),
        }
    }

    /// Render the identifier as a single URL path segment
    ///
    /// Slugs are percent-encoded so a `/` inside a slug cannot add a
    /// segment.
    #[must_use]
    pub fn path_segment(&self) -> Cow<'_, str> {
        match self {
            Self::Numeric(n) => Cow::Owned(n.to_string()),
            Self::Slug(slug) => urlencoding::encode(slug),
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Slug(slug) => f.write_str(slug),
        }
    }
}

/// Numeric ids serialize as JSON numbers, slugs as JSON strings.
impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(n) => serializer.serialize_i64(*n),
            Self::Slug(slug) => serializer.serialize_str(slug),
        }
    }
}

impl From<i64> for Identifier {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<i32> for Identifier {
    fn from(id: i32) -> Self {
        Self::Numeric(i64::from(id))
    }
}

impl From<u32> for Identifier {
    fn from(id: u32) -> Self {
        Self::Numeric(i64::from(id))
    }
}

impl From<&str> for Identifier {
    fn from(slug: &str) -> Self {
        Self::Slug(slug.to_string())
    }
}

impl From<String> for Identifier {
    fn from(slug: String) -> Self {
        Self::Slug(slug)
    }
}

impl From<&String> for Identifier {
    fn from(slug: &String) -> Self {
        Self::Slug(slug.clone())
    }
}
