use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::catalog::UnitCatalog;
use super::domain::{BookingId, GuestCount, UnitId};
use super::events::EventPublisher;
use super::ledger::{AvailabilityLedger, LedgerError};
use super::repository::BookingRepository;
use super::service::{BookingRequest, BookingService, BookingServiceError};

/// Router builder exposing the quote, booking lifecycle, and calendar
/// endpoints.
pub fn booking_router<C, R, L, E>(service: Arc<BookingService<C, R, L, E>>) -> Router
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    Router::new()
        .route("/api/v1/quotes", post(quote_handler::<C, R, L, E>))
        .route("/api/v1/bookings", post(create_handler::<C, R, L, E>))
        .route(
            "/api/v1/bookings/:booking_id",
            get(status_handler::<C, R, L, E>),
        )
        .route(
            "/api/v1/bookings/:booking_id/approve",
            post(approve_handler::<C, R, L, E>),
        )
        .route(
            "/api/v1/bookings/:booking_id/reject",
            post(reject_handler::<C, R, L, E>),
        )
        .route(
            "/api/v1/bookings/:booking_id/cancel",
            post(cancel_handler::<C, R, L, E>),
        )
        .route(
            "/api/v1/bookings/:booking_id/complete",
            post(complete_handler::<C, R, L, E>),
        )
        .route(
            "/api/v1/bookings/:booking_id/payment",
            post(payment_handler::<C, R, L, E>),
        )
        .route(
            "/api/v1/units/:unit_id/calendar",
            get(calendar_handler::<C, R, L, E>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteRequest {
    pub(crate) unit_id: UnitId,
    pub(crate) check_in: NaiveDate,
    pub(crate) check_out: NaiveDate,
    pub(crate) guests: GuestCount,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveRequest {
    #[serde(default)]
    pub(crate) mark_paid: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompleteRequest {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarQuery {
    pub(crate) from: NaiveDate,
    pub(crate) to: NaiveDate,
}

fn error_response(error: BookingServiceError) -> Response {
    let status = match &error {
        BookingServiceError::UnknownUnit(_) | BookingServiceError::UnknownBooking(_) => {
            StatusCode::NOT_FOUND
        }
        BookingServiceError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BookingServiceError::InvalidTransition { .. }
        | BookingServiceError::Ledger(LedgerError::Conflict { .. }) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn quote_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.quote(
        &request.unit_id,
        request.check_in,
        request.check_out,
        request.guests,
    ) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    axum::Json(request): axum::Json<BookingRequest>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.create(request) {
        Ok(outcome) => {
            let payload = json!({
                "booking_id": outcome.record.booking_id,
                "status": outcome.record.status.label(),
                "dates_held": outcome.dates_held,
                "total": outcome.record.price.total(),
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(booking_id): Path<String>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.get(&BookingId(booking_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(booking_id): Path<String>,
    axum::Json(request): axum::Json<ApproveRequest>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.approve(&BookingId(booking_id), request.mark_paid) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(booking_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.reject(&BookingId(booking_id), request.reason) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(booking_id): Path<String>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.cancel(&BookingId(booking_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(booking_id): Path<String>,
    axum::Json(request): axum::Json<CompleteRequest>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    match service.complete(&BookingId(booking_id), today) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(booking_id): Path<String>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.mark_paid(&BookingId(booking_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calendar_handler<C, R, L, E>(
    State(service): State<Arc<BookingService<C, R, L, E>>>,
    Path(unit_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Response
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    match service.calendar(&UnitId(unit_id), query.from, query.to) {
        Ok(days) => (StatusCode::OK, axum::Json(days)).into_response(),
        Err(error) => error_response(error),
    }
}
