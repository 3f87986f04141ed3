use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};

static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("collab_active_sessions", "Live authenticated sessions")
        .expect("failed to register collab_active_sessions")
});

static ACTIVE_ROOMS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("collab_active_rooms", "Rooms currently held in memory")
        .expect("failed to register collab_active_rooms")
});

static EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "collab_events_total",
        "Inbound WebSocket events processed",
        &["type"]
    )
    .expect("failed to register collab_events_total")
});

static DELIVERIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "collab_deliveries_total",
        "Outbound events queued to client connections"
    )
    .expect("failed to register collab_deliveries_total")
});

static EVICTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "collab_evictions_total",
        "Sessions removed, by disconnect reason",
        &["reason"]
    )
    .expect("failed to register collab_evictions_total")
});

pub fn set_active_sessions(count: i64) {
    ACTIVE_SESSIONS.set(count);
}

pub fn set_active_rooms(count: i64) {
    ACTIVE_ROOMS.set(count);
}

pub fn record_event(event_type: &str) {
    EVENTS_TOTAL.with_label_values(&[event_type]).inc();
}

pub fn record_delivery() {
    DELIVERIES_TOTAL.inc();
}

pub fn record_eviction(reason: &str) {
    EVICTIONS_TOTAL.with_label_values(&[reason]).inc();
}

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(axum::http::header::CONTENT_TYPE, encoder.format_type())
        .body(buffer.into())
        .unwrap_or_else(|err| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(err.to_string().into())
                .expect("failed to build metrics error response")
        })
}
