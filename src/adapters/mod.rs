//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `paytabs` - Payment gateway client
//! - `postgres` - sqlx persistence implementations
//! - `email` - Resend email sender
//! - `http` - axum REST endpoints

pub mod email;
pub mod http;
pub mod paytabs;
pub mod postgres;
