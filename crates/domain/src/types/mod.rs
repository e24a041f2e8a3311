//! Domain types and models

pub mod identifier;
pub mod list;
pub mod rate;
pub mod session;

pub use identifier::Identifier;
pub use list::ListOptions;
pub use rate::Rate;
pub use session::{CurrentUser, Session, Workspace};
