//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (writes) are kept separate from query handlers (reads).

pub mod handlers;

pub use handlers::payment::{
    CallbackOutcome, CreatePaymentCommand, CreatePaymentHandler, CreatePaymentResult,
    GatewayUrls, GetPaymentHandler, GetPaymentQuery, HandleGatewayCallbackCommand,
    HandleGatewayCallbackHandler, ListAllPaymentsQuery, ListBusinessPaymentsQuery,
    ListMyPaymentsQuery, ListPaymentsHandler, PaymentSettlement, RedirectPollPolicy,
    ResolvePaymentReturnHandler, ResolveReturnCommand, ReturnDestination, SettlementOutcome,
};
pub use handlers::subscription::{ActivationOutcome, SubscriptionActivator};
