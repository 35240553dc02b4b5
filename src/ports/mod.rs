//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Payment Ports
//!
//! - `PaymentGateway` - Hosted payment pages and transaction verification
//! - `PaymentRepository` - Ledger writes, including the guarded transition
//! - `PaymentReader` - Paginated/filterable ledger reads
//!
//! ## Subscription Ports
//!
//! - `SubscriptionRepository` - Subscription persistence and the
//!   latest-pending lookup
//! - `PlanReader` - Read-only plan reference data
//! - `BusinessDirectory` - Entitlement snapshots onto business records
//!
//! ## Dispatch Ports
//!
//! - `NotificationSender` - In-app notification creation
//! - `EmailSender` - Transactional email
//! - `UserDirectory` - Email lookup for dispatch targets

mod business_directory;
mod email_sender;
mod notification_sender;
mod payment_gateway;
mod payment_reader;
mod payment_repository;
mod plan_reader;
mod subscription_repository;
mod user_directory;

pub use business_directory::BusinessDirectory;
pub use email_sender::{EmailMessage, EmailSender};
pub use notification_sender::{NewNotification, NotificationKind, NotificationSender};
pub use payment_gateway::{
    CustomerDetails, GatewayError, GatewayErrorCode, GatewayPaymentResult, HostedPayment,
    HostedPaymentRequest, PaymentGateway,
};
pub use payment_reader::{PageRequest, PaymentFilter, PaymentPage, PaymentReader, MAX_PAGE_LIMIT};
pub use payment_repository::{PaymentRepository, TransitionOutcome};
pub use plan_reader::PlanReader;
pub use subscription_repository::SubscriptionRepository;
pub use user_directory::UserDirectory;
