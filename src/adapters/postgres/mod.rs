//! PostgreSQL adapters - sqlx implementations of the persistence ports.

mod business_directory;
mod notification_store;
mod payment_reader;
mod payment_repository;
mod plan_reader;
mod subscription_repository;
mod user_directory;

pub use business_directory::PostgresBusinessDirectory;
pub use notification_store::PostgresNotificationStore;
pub use payment_reader::PostgresPaymentReader;
pub use payment_repository::PostgresPaymentRepository;
pub use plan_reader::PostgresPlanReader;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use user_directory::PostgresUserDirectory;
