use std::net::SocketAddr;
use tracing::{info, warn};

pub const CONTACT_ACCEPTED: &str = "folio_contact_messages_total";
pub const CONTACT_SPAM: &str = "folio_contact_honeypot_total";
pub const RATE_LIMITED: &str = "folio_rate_limited_total";
pub const UPLOADS: &str = "folio_uploads_total";
pub const UPLOAD_BYTES: &str = "folio_upload_bytes";
pub const AUTH_FAILURES: &str = "folio_auth_failures_total";

/// Install the Prometheus exporter on `0.0.0.0:{port}`.
pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => info!("Prometheus exporter listening on http://{}/metrics", addr),
        Err(e) => warn!("Prometheus exporter install failed (possibly already installed): {}", e),
    }
}

pub fn record_rate_limited(scope: &'static str) {
    metrics::counter!(RATE_LIMITED, "scope" => scope).increment(1);
}

pub fn record_auth_failure(reason: &'static str) {
    metrics::counter!(AUTH_FAILURES, "reason" => reason).increment(1);
}

pub fn record_upload(folder: &str, bytes: usize) {
    metrics::counter!(UPLOADS, "folder" => folder.to_string()).increment(1);
    metrics::histogram!(UPLOAD_BYTES).record(bytes as f64);
}

pub fn record_contact(spam: bool) {
    if spam {
        metrics::counter!(CONTACT_SPAM).increment(1);
    } else {
        metrics::counter!(CONTACT_ACCEPTED).increment(1);
    }
}
