//! Payment HTTP adapter - routes, handlers, and DTOs.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, PaymentAppState, ResultPages};
pub use routes::{payment_router, payment_routes};
