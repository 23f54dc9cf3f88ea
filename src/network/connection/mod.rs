//! Session supervisor.
//!
//! Drives one connection attempt through its states:
//! - Validating: group and user must exist (and, by policy, membership)
//! - Upgrading: the HTTP request must be a WebSocket upgrade
//! - Live: the session is registered in the group actor and the event loop runs
//! - Terminated: the session is deregistered and the socket is dropped

mod event_loop;
mod lifecycle;

use super::gateway::{AppState, SessionSettings};
use crate::error::{RelayError, RelayResult};
use crate::state::{Frame, FrameKind, GroupHandle, SessionHandle, User};
use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use lifecycle::DetachGuard;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{Instrument, info, warn};

/// Query parameters of the upgrade endpoint.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(rename = "userId", alias = "userID")]
    pub user_id: Option<String>,
}

/// `GET /groups/{groupId}/ws?userId={userId}`
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    params: Result<Query<ConnectParams>, QueryRejection>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> RelayResult<Response> {
    let Query(params) = params.map_err(|rejection| RelayError::MalformedInput(rejection.body_text()))?;
    let (group, user) = validate(&state, &group_id, params.user_id.as_deref()).await?;

    let upgrade = upgrade.map_err(|rejection| {
        warn!(group = %group.id, user = %user.id, error = %rejection, "Upgrade rejected");
        RelayError::UpgradeFailed(rejection.body_text())
    })?;

    let settings = Arc::clone(&state.settings);
    Ok(upgrade
        .on_failed_upgrade(|e: axum::Error| warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| Connection::new(group, user, settings).run(socket)))
}

/// Validating state: nothing is created unless every check passes.
async fn validate(
    state: &AppState,
    group_id: &str,
    user_id: Option<&str>,
) -> RelayResult<(GroupHandle, Arc<User>)> {
    let group = state
        .directory
        .lookup_group(group_id)
        .ok_or_else(|| RelayError::group_not_found(group_id))?;

    let user_id = user_id.unwrap_or_default();
    let user = state
        .directory
        .lookup_user(user_id)
        .ok_or_else(|| RelayError::user_not_found(user_id))?;

    if state.settings.require_membership && !group.is_member(user.id.clone()).await? {
        return Err(RelayError::NotMember {
            group: group.id.clone(),
            user: user.id.clone(),
        });
    }

    Ok((group, user))
}

/// One upgraded connection bound to a user within a group.
pub struct Connection {
    group: GroupHandle,
    user: Arc<User>,
    settings: Arc<SessionSettings>,
}

impl Connection {
    pub fn new(group: GroupHandle, user: Arc<User>, settings: Arc<SessionSettings>) -> Self {
        Self {
            group,
            user,
            settings,
        }
    }

    /// Run the session to completion. The socket is owned here and dropped on
    /// every exit path.
    pub async fn run(self, socket: WebSocket) {
        let (session, outlet) = SessionHandle::new(self.user.id.clone(), self.settings.send_queue);
        let span = crate::telemetry::spans::session(&self.group.id, &self.user.id, &session.id);

        async move {
            match self.group.attach(session.clone()).await {
                Ok(outcome) => {
                    info!(
                        replaced = outcome.replaced.is_some(),
                        live = outcome.live_sessions,
                        "Session live"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Could not register session");
                    return;
                }
            }

            let _guard = DetachGuard::new(self.group.clone(), session.clone());
            let reason = event_loop::run(socket, &self.group, &session, outlet, &self.settings.keepalive).await;
            let lifetime_secs = chrono::Utc::now().timestamp() - session.connected_at;
            info!(reason = %reason, lifetime_secs, "Session terminated");
        }
        .instrument(span)
        .await
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame.kind {
            FrameKind::Text => match String::from_utf8(frame.payload.to_vec()) {
                Ok(text) => Message::Text(text),
                Err(e) => Message::Text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
            FrameKind::Binary => Message::Binary(frame.payload.to_vec()),
        }
    }
}
