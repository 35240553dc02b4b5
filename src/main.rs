//! Dalil backend server binary.
//!
//! Composition root: loads configuration, connects the database, wires the
//! adapters to the application handlers, and serves the payment API.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dalil_backend::adapters::email::ResendEmailSender;
use dalil_backend::adapters::http::payment::{PaymentAppState, ResultPages};
use dalil_backend::adapters::paytabs::{PayTabsConfig, PayTabsGatewayAdapter};
use dalil_backend::adapters::postgres::{
    PostgresBusinessDirectory, PostgresNotificationStore, PostgresPaymentReader,
    PostgresPaymentRepository, PostgresPlanReader, PostgresSubscriptionRepository,
    PostgresUserDirectory,
};
use dalil_backend::application::handlers::payment::{
    GatewayUrls, PaymentSettlement, RedirectPollPolicy,
};
use dalil_backend::application::handlers::subscription::SubscriptionActivator;
use dalil_backend::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.server.log_level)
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        "Starting dalil-backend"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Adapters
    let payment_repository = Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let payment_reader = Arc::new(PostgresPaymentReader::new(pool.clone()));
    let subscriptions = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let plans = Arc::new(PostgresPlanReader::new(pool.clone()));
    let directory = Arc::new(PostgresBusinessDirectory::new(pool.clone()));
    let notifications = Arc::new(PostgresNotificationStore::new(pool.clone()));
    let users = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let email = Arc::new(ResendEmailSender::new(&config.email));

    let gateway = Arc::new(PayTabsGatewayAdapter::new(
        PayTabsConfig::new(
            config.payment.paytabs_profile_id.clone(),
            config.payment.paytabs_server_key.clone(),
        )
        .with_base_url(config.payment.api_base_url.clone()),
    ));

    // Application wiring
    let activator = Arc::new(SubscriptionActivator::new(
        subscriptions,
        plans,
        directory,
        notifications.clone(),
        users.clone(),
        email.clone(),
        "paytabs",
    ));
    let settlement = Arc::new(PaymentSettlement::new(
        payment_repository.clone(),
        activator,
        notifications,
        users,
        email,
    ));

    let state = PaymentAppState {
        payment_repository,
        payment_reader,
        gateway,
        settlement,
        gateway_urls: GatewayUrls {
            callback_url: config.payment.callback_url.clone(),
            return_url: config.payment.return_url.clone(),
        },
        result_pages: ResultPages::from_base(&config.payment.result_base_url),
        poll_policy: RedirectPollPolicy::new(
            config.payment.redirect_poll_attempts,
            config.payment.redirect_poll_interval(),
        ),
    };

    let cors = if config.server.cors_origins_list().is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .server
            .cors_origins_list()
            .into_iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let app = Router::new()
        .merge(dalil_backend::adapters::http::payment_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .with_state(state);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
