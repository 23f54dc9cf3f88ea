use super::{CreateEntity, parse_entity};
use crate::error::{RelayError, RelayResult};
use crate::network::AppState;
use crate::state::User;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

/// `POST /users`
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntity>, JsonRejection>,
) -> RelayResult<(StatusCode, Json<User>)> {
    let CreateEntity { id, name } = parse_entity(payload)?;
    let user = state.directory.register_user(id, name)?;
    Ok((StatusCode::CREATED, Json(User::clone(&user))))
}

/// `GET /users/{userId}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> RelayResult<Json<User>> {
    let user = state
        .directory
        .lookup_user(&user_id)
        .ok_or_else(|| RelayError::user_not_found(&user_id))?;
    Ok(Json(User::clone(&user)))
}
