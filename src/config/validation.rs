//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Longest keepalive interval or timeout accepted, in seconds.
pub const MAX_KEEPALIVE_SECS: u64 = 86_400;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("session.send_queue must be at least 1")]
    ZeroSendQueue,
    #[error("session.group_queue must be at least 1")]
    ZeroGroupQueue,
    #[error("keepalive.timeout must be at least 1 when keepalive.ping_interval is set")]
    ZeroKeepaliveTimeout,
    #[error("keepalive.{field} = {value} exceeds the {max} second limit", max = MAX_KEEPALIVE_SECS)]
    KeepaliveTooLong { field: &'static str, value: u64 },
    #[error("server.metrics_port {0} collides with listen.address")]
    MetricsPortConflict(u16),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if config.session.send_queue == 0 {
        errors.push(ValidationError::ZeroSendQueue);
    }
    if config.session.group_queue == 0 {
        errors.push(ValidationError::ZeroGroupQueue);
    }

    if config.keepalive.ping_interval > 0 && config.keepalive.timeout == 0 {
        errors.push(ValidationError::ZeroKeepaliveTimeout);
    }
    for (field, value) in [
        ("ping_interval", config.keepalive.ping_interval),
        ("timeout", config.keepalive.timeout),
    ] {
        if value > MAX_KEEPALIVE_SECS {
            errors.push(ValidationError::KeepaliveTooLong { field, value });
        }
    }

    if let Some(port) = config.server.metrics_port
        && port != 0
        && port == config.listen.address.port()
    {
        errors.push(ValidationError::MetricsPortConflict(port));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
