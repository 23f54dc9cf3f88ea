//! Group actor event handlers.
//!
//! Each submodule handles a category of [`GroupEvent`](super::GroupEvent)
//! messages processed by [`GroupActor`](super::GroupActor).

use super::*;

pub mod attach;
pub mod broadcast;
pub mod membership;
