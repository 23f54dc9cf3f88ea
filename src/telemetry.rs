//! Standardized span constructors for relay observability.

pub mod spans {
    use tracing::{Span, info_span};

    /// Span covering one live session.
    pub fn session(group: &str, user: &str, session: &uuid::Uuid) -> Span {
        info_span!("session", group = %group, user = %user, session = %session)
    }
}
