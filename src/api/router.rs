use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, change_booking_status, create_booking, delete_bike, get_bike, get_booking,
    list_bikes, list_my_bookings, list_rental_service_bookings, register_bike, update_bike,
};

/// Creates the API router with all catalog and booking endpoints
///
/// Catalog endpoints:
/// - GET /bikes - Search the catalog (filters + optional near-point search)
/// - GET /bikes/:id - Get a single bike
/// - POST /bikes - Register a bike (rental service only)
/// - PUT /bikes/:id - Update a bike (owning rental service only)
/// - DELETE /bikes/:id - Remove a bike (owning rental service only)
///
/// Booking endpoints:
/// - POST /bookings - Create a booking (customer only)
/// - GET /bookings/my - Customer's own bookings
/// - GET /bookings/rental-service - Bookings on the caller's bikes
/// - GET /bookings/:id - Get a booking
/// - PATCH /bookings/:id/status - Transition the booking status
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Catalog endpoints
        .route("/bikes", get(list_bikes).post(register_bike))
        .route(
            "/bikes/:id",
            get(get_bike).put(update_bike).delete(delete_bike),
        )
        // Booking endpoints
        .route("/bookings", post(create_booking))
        .route("/bookings/my", get(list_my_bookings))
        .route("/bookings/rental-service", get(list_rental_service_bookings))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/status", patch(change_booking_status))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
