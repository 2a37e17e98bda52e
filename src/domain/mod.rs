//! Domain logic - pure release rules independent of git and the terminal

pub mod identity;
pub mod message;
pub mod version;

pub use identity::{Identity, IdentitySource};
pub use message::CommitDraft;
pub use version::Version;
