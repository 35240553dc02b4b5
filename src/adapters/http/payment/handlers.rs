//! HTTP handlers for payment endpoints.
//!
//! These handlers connect axum routes to the application layer, including
//! the gateway-facing callback and the two-hop return/redirect bridge.

use std::sync::Arc;

use axum::extract::{Form, Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};

use crate::application::handlers::payment::{
    CallbackOutcome, CreatePaymentCommand, CreatePaymentHandler, GatewayUrls, GetPaymentHandler,
    GetPaymentQuery, HandleGatewayCallbackCommand, HandleGatewayCallbackHandler,
    ListAllPaymentsQuery, ListBusinessPaymentsQuery, ListMyPaymentsQuery, ListPaymentsHandler,
    PaymentSettlement, RedirectPollPolicy, ResolvePaymentReturnHandler, ResolveReturnCommand,
    ReturnDestination,
};
use crate::domain::foundation::{BusinessId, PaymentId, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::{PaymentGateway, PaymentReader, PaymentRepository};

use super::dto::{
    CallbackAck, CallbackRequest, CreatePaymentRequest, CreatePaymentResponse, ErrorResponse,
    ListPaymentsParams, PaymentListResponse, PaymentResponse, RedirectParams, ReturnParams,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Browser destinations the redirect bridge terminates in.
#[derive(Debug, Clone)]
pub struct ResultPages {
    pub success_url: String,
    pub failed_url: String,
    pub pending_url: String,
}

impl ResultPages {
    /// Builds the three destinations under a frontend base URL.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            success_url: format!("{}/payment/success", base),
            failed_url: format!("{}/payment/failed", base),
            pending_url: format!("{}/payment/pending", base),
        }
    }

    /// Full destination URL for a resolved return, with the payment id and
    /// transaction reference echoed in the query string.
    pub fn url_for(&self, destination: &ReturnDestination) -> String {
        let (base, payment_id, transaction_ref) = match destination {
            ReturnDestination::Success {
                payment_id,
                transaction_ref,
            } => (&self.success_url, Some(payment_id.as_str()), transaction_ref),
            ReturnDestination::Failed {
                payment_id,
                transaction_ref,
            } => (&self.failed_url, payment_id.as_deref(), transaction_ref),
            ReturnDestination::Pending {
                payment_id,
                transaction_ref,
            } => (&self.pending_url, Some(payment_id.as_str()), transaction_ref),
        };

        let mut url = base.clone();
        let mut separator = '?';
        if let Some(id) = payment_id {
            url.push(separator);
            url.push_str("paymentId=");
            url.push_str(id);
            separator = '&';
        }
        if let Some(tran_ref) = transaction_ref {
            url.push(separator);
            url.push_str("tranRef=");
            url.push_str(tran_ref);
        }
        url
    }
}

/// Shared application state containing all payment dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct PaymentAppState {
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub payment_reader: Arc<dyn PaymentReader>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub settlement: Arc<PaymentSettlement>,
    pub gateway_urls: GatewayUrls,
    pub result_pages: ResultPages,
    pub poll_policy: RedirectPollPolicy,
}

impl PaymentAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_payment_handler(&self) -> CreatePaymentHandler {
        CreatePaymentHandler::new(
            self.payment_repository.clone(),
            self.gateway.clone(),
            self.gateway_urls.clone(),
        )
    }

    pub fn callback_handler(&self) -> HandleGatewayCallbackHandler {
        HandleGatewayCallbackHandler::new(
            self.gateway.clone(),
            self.payment_repository.clone(),
            self.settlement.clone(),
        )
    }

    pub fn return_handler(&self) -> ResolvePaymentReturnHandler {
        ResolvePaymentReturnHandler::new(
            self.payment_repository.clone(),
            self.gateway.clone(),
            self.settlement.clone(),
            self.poll_policy,
        )
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.payment_repository.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.payment_reader.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (extracted by auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the request.
///
/// In production this comes from the JWT-validating middleware; for
/// development and tests an X-User-Id header is accepted.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// CRUD Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payments - Create a payment and hosted payment page
pub async fn create_payment(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let business_id: BusinessId = request
        .business_id
        .parse()
        .map_err(|_| PaymentError::validation("business_id", "not a valid id"))?;

    let handler = state.create_payment_handler();
    let cmd = CreatePaymentCommand {
        user_id: user.user_id,
        business_id,
        amount_minor: request.amount_minor,
        currency: request.currency,
        description: request.description,
        customer_name: request.customer_name,
        customer_email: request.customer_email,
    };

    let result = handler.handle(cmd).await?;

    let response = CreatePaymentResponse {
        payment: PaymentResponse::from(result.payment),
        redirect_url: result.redirect_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /payments/:id - Get a single payment
pub async fn get_payment(
    State(state): State<PaymentAppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| PaymentError::validation("id", "not a valid payment id"))?;

    let handler = state.get_payment_handler();
    let payment = handler.handle(GetPaymentQuery { payment_id }).await?;

    Ok(Json(PaymentResponse::from(payment)))
}

/// GET /payments/my-payments - List the authenticated user's payments
pub async fn list_my_payments(
    State(state): State<PaymentAppState>,
    user: AuthenticatedUser,
    Query(params): Query<ListPaymentsParams>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let (filter, page) = params.into_filter_and_page();
    let handler = state.list_payments_handler();

    let result = handler
        .list_mine(ListMyPaymentsQuery {
            user_id: user.user_id,
            filter,
            page,
        })
        .await?;

    Ok(Json(PaymentListResponse {
        items: result.items.into_iter().map(PaymentResponse::from).collect(),
        total: result.total,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// GET /payments/business/:business_id - List a business's payments
pub async fn list_business_payments(
    State(state): State<PaymentAppState>,
    _user: AuthenticatedUser,
    Path(business_id): Path<String>,
    Query(params): Query<ListPaymentsParams>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let business_id: BusinessId = business_id
        .parse()
        .map_err(|_| PaymentError::validation("business_id", "not a valid id"))?;

    let (filter, page) = params.into_filter_and_page();
    let handler = state.list_payments_handler();

    let result = handler
        .list_for_business(ListBusinessPaymentsQuery {
            business_id,
            filter,
            page,
        })
        .await?;

    Ok(Json(PaymentListResponse {
        items: result.items.into_iter().map(PaymentResponse::from).collect(),
        total: result.total,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// GET /payments/admin/all - List all payments
pub async fn list_all_payments(
    State(state): State<PaymentAppState>,
    _user: AuthenticatedUser, // Admin role enforced by middleware in production
    Query(params): Query<ListPaymentsParams>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let (filter, page) = params.into_filter_and_page();
    let handler = state.list_payments_handler();

    let result = handler.list_all(ListAllPaymentsQuery { filter, page }).await?;

    Ok(Json(PaymentListResponse {
        items: result.items.into_iter().map(PaymentResponse::from).collect(),
        total: result.total,
        limit: page.limit,
        offset: page.offset,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Gateway-facing Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payments/gateway/callback - server-to-server status callback
///
/// No user auth: trust is established by re-verifying the transaction with
/// the gateway, never by believing this payload.
pub async fn gateway_callback(
    State(state): State<PaymentAppState>,
    Json(request): Json<CallbackRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let handler = state.callback_handler();
    let cmd = HandleGatewayCallbackCommand {
        transaction_ref: request.tran_ref,
        correlation_id: request.cart_id,
    };

    let outcome = handler.handle(cmd).await?;

    let result = match outcome {
        CallbackOutcome::Completed { .. } => "completed",
        CallbackOutcome::Failed { .. } => "failed",
        CallbackOutcome::AlreadyProcessed { .. } => "already_processed",
        CallbackOutcome::Pending { .. } => "pending",
    };

    Ok(Json(CallbackAck::new(result)))
}

/// Builds the hop-2 URI from hop-1 parameters.
///
/// Hop 1 performs no verification and no state mutation, so reloading or
/// revisiting the return URL can never duplicate side effects.
pub fn bridge_redirect_uri(params: &ReturnParams) -> String {
    let mut uri = "/payments/gateway/redirect".to_string();
    let mut separator = '?';
    if let Some(cart_id) = params.cart_id.as_deref().filter(|s| !s.is_empty()) {
        uri.push(separator);
        uri.push_str("paymentId=");
        uri.push_str(cart_id);
        separator = '&';
    }
    if let Some(tran_ref) = params.tran_ref.as_deref().filter(|s| !s.is_empty()) {
        uri.push(separator);
        uri.push_str("tranRef=");
        uri.push_str(tran_ref);
        separator = '&';
    }
    if let Some(error) = params.error.as_deref().filter(|s| !s.is_empty()) {
        uri.push(separator);
        uri.push_str("error=");
        uri.push_str(error);
    }
    uri
}

/// GET /payments/gateway/return - browser return (bridge hop 1)
pub async fn gateway_return_get(Query(query): Query<ReturnParams>) -> Redirect {
    Redirect::to(&bridge_redirect_uri(&query))
}

/// POST /payments/gateway/return - browser return via cross-origin POST
///
/// Form body takes precedence over query parameters; some gateways send
/// both with the body being authoritative.
pub async fn gateway_return_post(
    Query(query): Query<ReturnParams>,
    body: Option<Form<ReturnParams>>,
) -> Redirect {
    let body = body.map(|Form(params)| params).unwrap_or_default();
    let merged = ReturnParams {
        tran_ref: body.tran_ref.or(query.tran_ref),
        cart_id: body.cart_id.or(query.cart_id),
        error: body.error.or(query.error),
    };
    Redirect::to(&bridge_redirect_uri(&merged))
}

/// GET /payments/gateway/redirect - browser result resolution (bridge hop 2)
pub async fn gateway_redirect(
    State(state): State<PaymentAppState>,
    Query(params): Query<RedirectParams>,
) -> Redirect {
    let handler = state.return_handler();
    let destination = handler
        .handle(ResolveReturnCommand {
            payment_id: params.payment_id,
            transaction_ref: params.tran_ref,
            error: params.error.as_deref().is_some_and(|e| !e.is_empty()),
        })
        .await;

    Redirect::to(&state.result_pages.url_for(&destination))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            PaymentError::NotFound(_) => (StatusCode::NOT_FOUND, "PAYMENT_NOT_FOUND"),
            PaymentError::ValidationFailed { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            PaymentError::InvalidState { .. } => (StatusCode::CONFLICT, "INVALID_STATE"),
            // 5xx so the gateway's own retry policy redelivers the callback.
            PaymentError::Gateway { retryable: true, .. } => {
                (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR")
            }
            PaymentError::Gateway { retryable: false, .. } => {
                (StatusCode::PAYMENT_REQUIRED, "GATEWAY_ERROR")
            }
            PaymentError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse::new(error_code, self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentId;

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_not_found_to_404() {
        let err = PaymentApiError(PaymentError::not_found(PaymentId::new()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = PaymentApiError(PaymentError::validation("cart_id", "missing"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_invalid_state_to_409() {
        let err = PaymentApiError(PaymentError::invalid_state("completed", "settle"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_retryable_gateway_error_to_502() {
        let err = PaymentApiError(PaymentError::gateway_retryable("verify timeout"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_maps_terminal_gateway_error_to_402() {
        let err = PaymentApiError(PaymentError::gateway_terminal("page rejected"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn api_error_maps_infrastructure_to_500() {
        let err = PaymentApiError(PaymentError::infrastructure("db down"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Bridge Hop 1 Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn bridge_uri_carries_both_identifiers() {
        let params = ReturnParams {
            tran_ref: Some("TST123".to_string()),
            cart_id: Some("abc".to_string()),
            error: None,
        };
        assert_eq!(
            bridge_redirect_uri(&params),
            "/payments/gateway/redirect?paymentId=abc&tranRef=TST123"
        );
    }

    #[test]
    fn bridge_uri_forwards_error_flag() {
        let params = ReturnParams {
            tran_ref: None,
            cart_id: Some("abc".to_string()),
            error: Some("declined".to_string()),
        };
        assert_eq!(
            bridge_redirect_uri(&params),
            "/payments/gateway/redirect?paymentId=abc&error=declined"
        );
    }

    #[test]
    fn bridge_uri_with_no_params_is_bare() {
        assert_eq!(
            bridge_redirect_uri(&ReturnParams::default()),
            "/payments/gateway/redirect"
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Result Page Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn result_pages_build_from_base() {
        let pages = ResultPages::from_base("https://dalil.example/");
        assert_eq!(pages.success_url, "https://dalil.example/payment/success");
        assert_eq!(pages.failed_url, "https://dalil.example/payment/failed");
        assert_eq!(pages.pending_url, "https://dalil.example/payment/pending");
    }

    #[test]
    fn success_destination_echoes_identifiers() {
        let pages = ResultPages::from_base("https://dalil.example");
        let url = pages.url_for(&ReturnDestination::Success {
            payment_id: "abc".to_string(),
            transaction_ref: Some("TST123".to_string()),
        });
        assert_eq!(
            url,
            "https://dalil.example/payment/success?paymentId=abc&tranRef=TST123"
        );
    }

    #[test]
    fn failed_destination_without_id_has_no_query() {
        let pages = ResultPages::from_base("https://dalil.example");
        let url = pages.url_for(&ReturnDestination::Failed {
            payment_id: None,
            transaction_ref: None,
        });
        assert_eq!(url, "https://dalil.example/payment/failed");
    }
}
