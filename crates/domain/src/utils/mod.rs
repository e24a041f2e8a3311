//! Domain utilities

pub mod base_url;
