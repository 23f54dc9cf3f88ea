//! State management module.
//!
//! Contains the Directory (shared registry), group actors, users and
//! session handles.

pub mod actor;
mod dashmap_ext;
mod directory;
mod session;
mod user;

pub use actor::GroupSnapshot;
pub use directory::{Directory, GroupHandle};
pub use session::{Frame, FrameKind, SessionHandle, SessionId, SessionOutlet};
pub use user::{User, UserId};
