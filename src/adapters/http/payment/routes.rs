//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_payment, gateway_callback, gateway_redirect, gateway_return_get, gateway_return_post,
    get_payment, list_all_payments, list_business_payments, list_my_payments, PaymentAppState,
};

/// Create the payment API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /` - Create payment, returns hosted payment page URL
/// - `GET /my-payments` - Own payments, paginated and filterable
/// - `GET /business/:business_id` - Payments for a business
/// - `GET /:id` - Single payment
///
/// ## Admin Endpoints (require admin role)
/// - `GET /admin/all` - All payments
///
/// ## Gateway Endpoints (no user auth, trust by re-verification)
/// - `POST /gateway/callback` - Server-to-server status callback
/// - `GET|POST /gateway/return` - Browser return (bridge hop 1)
/// - `GET /gateway/redirect` - Browser result resolution (bridge hop 2)
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        // User endpoints
        .route("/", post(create_payment))
        .route("/my-payments", get(list_my_payments))
        .route("/business/:business_id", get(list_business_payments))
        // Admin endpoints
        .route("/admin/all", get(list_all_payments))
        // Gateway endpoints
        .route("/gateway/callback", post(gateway_callback))
        .route(
            "/gateway/return",
            get(gateway_return_get).post(gateway_return_post),
        )
        .route("/gateway/redirect", get(gateway_redirect))
        // Parameterized route last
        .route("/:id", get(get_payment))
}

/// Create the complete payment module router, mounted at `/payments`.
pub fn payment_router() -> Router<PaymentAppState> {
    Router::new().nest("/payments", payment_routes())
}
