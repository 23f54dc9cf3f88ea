//! Unified error handling for relayd.
//!
//! Directory and session-supervisor failures are expressed as [`RelayError`],
//! which maps onto client-visible HTTP status codes. Per-recipient delivery
//! failures during fan-out are [`DeliveryError`]s; they never leave the group
//! actor and are only logged and counted.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Kind of directory entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Group,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("group"),
            Self::User => f.write_str("user"),
        }
    }
}

// ============================================================================
// Relay Errors (directory + session supervisor)
// ============================================================================

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{kind} already exists: {id}")]
    DuplicateKey { kind: EntityKind, id: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),

    #[error("user {user} is not a member of group {group}")]
    NotMember { group: String, user: String },

    /// The group actor stopped (directory reset or shutdown in progress).
    #[error("group unavailable: {0}")]
    GroupUnavailable(String),
}

impl RelayError {
    pub fn group_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::Group,
            id: id.into(),
        }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: EntityKind::User,
            id: id.into(),
        }
    }

    /// Get a static error code string for metrics labeling and response bodies.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::NotFound { .. } => "not_found",
            Self::MalformedInput(_) => "malformed_input",
            Self::UpgradeFailed(_) => "upgrade_failed",
            Self::NotMember { .. } => "not_member",
            Self::GroupUnavailable(_) => "group_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateKey { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MalformedInput(_) | Self::UpgradeFailed(_) => StatusCode::BAD_REQUEST,
            Self::NotMember { .. } => StatusCode::FORBIDDEN,
            Self::GroupUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        crate::metrics::record_request_error(self.error_code());
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type RelayResult<T> = Result<T, RelayError>;

// ============================================================================
// Delivery Errors (broadcast fan-out)
// ============================================================================

/// Why a frame could not be handed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The session's writer is gone; the socket is already broken.
    #[error("session closed")]
    Closed,

    /// The bounded outbound queue is full.
    #[error("send queue exceeded")]
    QueueFull,
}

impl DeliveryError {
    /// Eviction reason label for metrics.
    #[inline]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::QueueFull => "send_queue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        let dup = RelayError::DuplicateKey {
            kind: EntityKind::Group,
            id: "g1".into(),
        };
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert_eq!(RelayError::group_not_found("ghost").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RelayError::MalformedInput("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::UpgradeFailed("no upgrade header".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::NotMember {
                group: "g1".into(),
                user: "u1".into()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_display_names_entity() {
        let err = RelayError::user_not_found("u9");
        assert_eq!(err.to_string(), "user not found: u9");
        assert_eq!(err.error_code(), "not_found");
    }

    #[test]
    fn test_delivery_reason_labels() {
        assert_eq!(DeliveryError::Closed.reason(), "closed");
        assert_eq!(DeliveryError::QueueFull.reason(), "send_queue");
        assert_eq!(DeliveryError::QueueFull.to_string(), "send queue exceeded");
    }
}
