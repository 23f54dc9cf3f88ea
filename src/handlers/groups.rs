use super::{CreateEntity, parse_entity};
use crate::error::RelayResult;
use crate::network::AppState;
use crate::state::GroupSnapshot;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

/// `POST /groups`
pub async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntity>, JsonRejection>,
) -> RelayResult<(StatusCode, Json<GroupSnapshot>)> {
    let CreateEntity { id, name } = parse_entity(payload)?;
    let group = state.directory.create_group(id, name)?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/{groupId}`
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> RelayResult<Json<GroupSnapshot>> {
    Ok(Json(state.directory.group_snapshot(&group_id).await?))
}

/// `POST /groups/{groupId}/users/{userId}`
pub async fn add_member(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> RelayResult<Json<GroupSnapshot>> {
    Ok(Json(state.directory.add_member(&group_id, &user_id).await?))
}
