//! Metrics collection for the webhook bot using Prometheus
//!
//! Tracks:
//! - Webhook outcomes (processed, duplicate, ignored, rejected)
//! - Outbound message delivery
//! - Payment submissions and completed registrations

// Collector registration only fails on duplicate names, and these are static.
#![allow(clippy::unwrap_used)]

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

/// Webhook calls by outcome
/// Labels: outcome (success/duplicate/ignored/rejected/delivery_failed/config_error)
pub static UPDATES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketbot_updates_total",
        "Webhook updates received, by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// sendMessage attempts
/// Labels: result (ok/failed)
pub static MESSAGES_SENT_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketbot_messages_sent_total",
        "Outbound sendMessage attempts, by result",
        &["result"]
    )
    .unwrap()
});

/// Payment submissions
/// Labels: result (submitted/no_wallet/chain_unavailable/failed)
pub static PAYMENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketbot_payments_total",
        "Payment submissions, by result",
        &["result"]
    )
    .unwrap()
});

pub static REGISTRATIONS_COMPLETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "marketbot_registrations_completed_total",
        "Product registrations that reached the final step"
    )
    .unwrap()
});

/// Forces registration of every collector so `/metrics` lists them from the start.
pub fn init_metrics() {
    Lazy::force(&UPDATES_TOTAL);
    Lazy::force(&MESSAGES_SENT_TOTAL);
    Lazy::force(&PAYMENTS_TOTAL);
    Lazy::force(&REGISTRATIONS_COMPLETED_TOTAL);
}

pub fn record_update(outcome: &str) {
    UPDATES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_message_sent(ok: bool) {
    MESSAGES_SENT_TOTAL
        .with_label_values(&[if ok { "ok" } else { "failed" }])
        .inc();
}

pub fn record_payment(result: &str) {
    PAYMENTS_TOTAL.with_label_values(&[result]).inc();
}

pub fn record_registration_completed() {
    REGISTRATIONS_COMPLETED_TOTAL.inc();
}

/// Renders the default registry in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        log::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
