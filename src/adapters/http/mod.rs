//! HTTP adapters - REST API implementations.

pub mod payment;

// Re-export key types for convenience
pub use payment::payment_router;
pub use payment::PaymentAppState;
