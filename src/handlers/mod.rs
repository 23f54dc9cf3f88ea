//! HTTP handlers for the directory API.
//!
//! Thin adapters between axum extractors and the [`Directory`](crate::state::Directory).
//! Body parse failures are folded into `MalformedInput` so every client error
//! shares one JSON shape.

mod groups;
mod health;
mod users;

pub use groups::{add_member, create_group, get_group};
pub use health::health;
pub use users::{get_user, register_user};

use crate::error::{RelayError, RelayResult};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

/// Body of `POST /groups` and `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Unwrap a JSON body and reject blank ids.
fn parse_entity(payload: Result<Json<CreateEntity>, JsonRejection>) -> RelayResult<CreateEntity> {
    let Json(entity) = payload.map_err(|rejection| RelayError::MalformedInput(rejection.body_text()))?;
    if entity.id.trim().is_empty() {
        return Err(RelayError::MalformedInput("id must not be empty".to_string()));
    }
    Ok(entity)
}
