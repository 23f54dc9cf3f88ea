//! Prometheus metrics collection for relayd.
//!
//! - `relay_live_sessions` - Currently registered sessions (gauge)
//! - `relay_active_groups` - Groups with a running actor (gauge)
//! - `relay_frames_relayed_total` - Frames accepted for fan-out
//! - `relay_message_fanout` - Recipients per broadcast (histogram)
//! - `relay_sessions_evicted_total{reason}` - Sessions closed by the relay
//! - `relay_request_errors_total{error}` - Client-visible errors by code
//!
//! Every helper is a no-op until [`init`] has run, so unit tests and embedded
//! use never need a registry.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub static LIVE_SESSIONS: OnceLock<IntGauge> = OnceLock::new();
pub static ACTIVE_GROUPS: OnceLock<IntGauge> = OnceLock::new();
pub static FRAMES_RELAYED: OnceLock<IntCounter> = OnceLock::new();
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();
pub static SESSIONS_EVICTED: OnceLock<IntCounterVec> = OnceLock::new();
pub static REQUEST_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Called once at startup. Repeated calls log a registration warning and
/// keep the first set of collectors.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(LIVE_SESSIONS, IntGauge::new("relay_live_sessions", "Currently registered sessions"));
    register!(ACTIVE_GROUPS, IntGauge::new("relay_active_groups", "Groups with a running actor"));
    register!(FRAMES_RELAYED, IntCounter::new("relay_frames_relayed_total", "Frames accepted for fan-out"));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("relay_message_fanout", "Recipients per broadcast")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])));
    register!(SESSIONS_EVICTED, IntCounterVec::new(
        Opts::new("relay_sessions_evicted_total", "Sessions closed by the relay"), &["reason"]));
    register!(REQUEST_ERRORS, IntCounterVec::new(
        Opts::new("relay_request_errors_total", "Client-visible errors by code"), &["error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
        String::new()
    })
}

#[inline]
pub fn session_attached() {
    if let Some(g) = LIVE_SESSIONS.get() {
        g.inc();
    }
}

#[inline]
pub fn session_detached() {
    if let Some(g) = LIVE_SESSIONS.get() {
        g.dec();
    }
}

#[inline]
pub fn group_created() {
    if let Some(g) = ACTIVE_GROUPS.get() {
        g.inc();
    }
}

#[inline]
pub fn groups_removed(count: usize) {
    if let Some(g) = ACTIVE_GROUPS.get() {
        g.sub(count as i64);
    }
}

/// Record one broadcast and how many sessions it reached.
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(c) = FRAMES_RELAYED.get() {
        c.inc();
    }
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn record_eviction(reason: &str) {
    if let Some(c) = SESSIONS_EVICTED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_request_error(code: &str) {
    if let Some(c) = REQUEST_ERRORS.get() {
        c.with_label_values(&[code]).inc();
    }
}
