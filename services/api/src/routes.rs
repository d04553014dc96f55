use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Serialize;
use staykeeper::booking::{
    booking_router, AvailabilityLedger, BookingRepository, BookingService, EventPublisher,
    UnitCatalog,
};
use std::sync::Arc;

pub(crate) fn with_booking_routes<C, R, L, E>(
    service: Arc<BookingService<C, R, L, E>>,
) -> axum::Router
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    booking_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusPayload {
    status: &'static str,
}

pub(crate) async fn healthcheck() -> Json<StatusPayload> {
    Json(StatusPayload { status: "ok" })
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = StatusPayload {
        status: if ready { "ready" } else { "initializing" },
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        let value = serde_json::to_value(&body).expect("payload serializes");
        assert_eq!(value.get("status").and_then(|v| v.as_str()), Some("ok"));
    }
}
