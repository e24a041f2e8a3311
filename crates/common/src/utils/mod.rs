//! Common utility functions
//!
//! - **[`serde`]**: Serialization helpers for wire and configuration formats

pub mod serde;

// Re-export commonly used items for convenience
pub use self::serde::{
    duration_millis, null_as_default, optional_string_or_number, string_or_number,
};
