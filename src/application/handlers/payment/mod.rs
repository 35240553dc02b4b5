//! Payment command and query handlers.

mod create_payment;
mod get_payment;
mod handle_gateway_callback;
mod list_payments;
mod resolve_payment_return;
mod settle_payment;

pub use create_payment::{
    CreatePaymentCommand, CreatePaymentHandler, CreatePaymentResult, GatewayUrls,
};
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
pub use handle_gateway_callback::{
    CallbackOutcome, HandleGatewayCallbackCommand, HandleGatewayCallbackHandler,
};
pub use list_payments::{
    ListAllPaymentsQuery, ListBusinessPaymentsQuery, ListMyPaymentsQuery, ListPaymentsHandler,
};
pub use resolve_payment_return::{
    RedirectPollPolicy, ResolvePaymentReturnHandler, ResolveReturnCommand, ReturnDestination,
};
pub use settle_payment::{PaymentSettlement, SettlementOutcome};

/// Shared in-memory port implementations for handler tests.
///
/// The ledger reproduces the storage-level compare-and-set the Postgres
/// adapter performs, so idempotence tests exercise the real guard semantics.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::application::handlers::subscription::SubscriptionActivator;
    use crate::domain::foundation::{
        BusinessId, DomainError, ErrorCode, Money, PaymentId, PlanId, SubscriptionId, UserId,
    };
    use crate::domain::payment::{Payment, PaymentStatus};
    use crate::domain::subscription::{
        BusinessSubscription, EntitlementGrant, PlanEntitlements, SubscriptionPlan,
        SubscriptionStatus,
    };
    use crate::ports::{
        BusinessDirectory, EmailMessage, EmailSender, GatewayError, GatewayPaymentResult,
        HostedPayment, HostedPaymentRequest, NewNotification, NotificationSender, PaymentGateway,
        PaymentRepository, PlanReader, SubscriptionRepository, TransitionOutcome, UserDirectory,
    };

    use super::PaymentSettlement;

    /// In-memory payment ledger with the same terminal-state guard the
    /// Postgres adapter enforces with a conditional UPDATE.
    pub struct InMemoryLedger {
        payments: Mutex<Vec<Payment>>,
    }

    impl InMemoryLedger {
        pub fn new() -> Self {
            Self {
                payments: Mutex::new(Vec::new()),
            }
        }

        pub fn with_payment(payment: Payment) -> Self {
            Self {
                payments: Mutex::new(vec![payment]),
            }
        }

        pub fn payments(&self) -> Vec<Payment> {
            self.payments.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentRepository for InMemoryLedger {
        async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
            self.payments.lock().unwrap().push(payment.clone());
            Ok(())
        }

        async fn record_transaction_ref(
            &self,
            id: &PaymentId,
            transaction_ref: &str,
        ) -> Result<(), DomainError> {
            let mut payments = self.payments.lock().unwrap();
            let payment = payments
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| DomainError::new(ErrorCode::PaymentNotFound, "missing"))?;
            payment.record_transaction_ref(transaction_ref)
        }

        async fn transition(
            &self,
            id: &PaymentId,
            new_status: PaymentStatus,
            transaction_ref: Option<&str>,
        ) -> Result<TransitionOutcome, DomainError> {
            let mut payments = self.payments.lock().unwrap();
            let payment = payments
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| DomainError::new(ErrorCode::PaymentNotFound, "missing"))?;
            if payment.is_terminal() {
                return Ok(TransitionOutcome {
                    payment: payment.clone(),
                    changed: false,
                });
            }
            payment.settle(new_status, transaction_ref.map(String::from))?;
            Ok(TransitionOutcome {
                payment: payment.clone(),
                changed: true,
            })
        }

        async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| &p.id == id)
                .cloned())
        }
    }

    /// Stub gateway with a scripted verification answer and call counter.
    pub struct StubGateway {
        verify_result: Mutex<Option<Result<GatewayPaymentResult, GatewayError>>>,
        pub verify_calls: Mutex<u32>,
    }

    impl StubGateway {
        pub fn verifying(result: GatewayPaymentResult) -> Self {
            Self {
                verify_result: Mutex::new(Some(Ok(result))),
                verify_calls: Mutex::new(0),
            }
        }

        pub fn failing_verification(error: GatewayError) -> Self {
            Self {
                verify_result: Mutex::new(Some(Err(error))),
                verify_calls: Mutex::new(0),
            }
        }

        pub fn verify_call_count(&self) -> u32 {
            *self.verify_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_hosted_payment(
            &self,
            request: HostedPaymentRequest,
        ) -> Result<HostedPayment, GatewayError> {
            Ok(HostedPayment {
                redirect_url: format!("https://gateway.test/pay/{}", request.correlation_id),
                transaction_ref: "TST2208200000123".to_string(),
            })
        }

        async fn verify_payment(
            &self,
            _transaction_ref: &str,
        ) -> Result<GatewayPaymentResult, GatewayError> {
            *self.verify_calls.lock().unwrap() += 1;
            self.verify_result
                .lock()
                .unwrap()
                .clone()
                .expect("verify result not scripted")
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifications {
        sent: Mutex<Vec<NewNotification>>,
    }

    impl RecordingNotifications {
        pub fn sent(&self) -> Vec<NewNotification> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSender for RecordingNotifications {
        async fn notify(&self, notification: NewNotification) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingEmail {
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl RecordingEmail {
        pub fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for RecordingEmail {
        async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    pub struct StaticUsers;

    #[async_trait]
    impl UserDirectory for StaticUsers {
        async fn email_of(&self, _user_id: &UserId) -> Result<Option<String>, DomainError> {
            Ok(Some("owner@example.com".to_string()))
        }
    }

    pub struct InMemorySubscriptions {
        subscriptions: Mutex<Vec<BusinessSubscription>>,
    }

    impl InMemorySubscriptions {
        pub fn new() -> Self {
            Self {
                subscriptions: Mutex::new(Vec::new()),
            }
        }

        pub fn with_subscription(subscription: BusinessSubscription) -> Self {
            Self {
                subscriptions: Mutex::new(vec![subscription]),
            }
        }

        pub fn subscriptions(&self) -> Vec<BusinessSubscription> {
            self.subscriptions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for InMemorySubscriptions {
        async fn save(&self, subscription: &BusinessSubscription) -> Result<(), DomainError> {
            self.subscriptions.lock().unwrap().push(subscription.clone());
            Ok(())
        }

        async fn update(&self, subscription: &BusinessSubscription) -> Result<(), DomainError> {
            let mut subs = self.subscriptions.lock().unwrap();
            if let Some(s) = subs.iter_mut().find(|s| s.id == subscription.id) {
                *s = subscription.clone();
            }
            Ok(())
        }

        async fn find_by_id(
            &self,
            id: &SubscriptionId,
        ) -> Result<Option<BusinessSubscription>, DomainError> {
            Ok(self
                .subscriptions
                .lock()
                .unwrap()
                .iter()
                .find(|s| &s.id == id)
                .cloned())
        }

        async fn find_latest_pending_by_business(
            &self,
            business_id: &BusinessId,
        ) -> Result<Option<BusinessSubscription>, DomainError> {
            let subs = self.subscriptions.lock().unwrap();
            Ok(subs
                .iter()
                .filter(|s| {
                    &s.business_id == business_id && s.status == SubscriptionStatus::Pending
                })
                .max_by_key(|s| s.created_at)
                .cloned())
        }
    }

    pub struct StaticPlans {
        plan: SubscriptionPlan,
    }

    impl StaticPlans {
        pub fn new(plan: SubscriptionPlan) -> Self {
            Self { plan }
        }
    }

    #[async_trait]
    impl PlanReader for StaticPlans {
        async fn find_by_id(&self, _id: &PlanId) -> Result<Option<SubscriptionPlan>, DomainError> {
            Ok(Some(self.plan.clone()))
        }
    }

    #[derive(Default)]
    pub struct RecordingDirectory {
        grants: Mutex<Vec<(BusinessId, EntitlementGrant)>>,
    }

    impl RecordingDirectory {
        pub fn grants(&self) -> Vec<(BusinessId, EntitlementGrant)> {
            self.grants.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BusinessDirectory for RecordingDirectory {
        async fn apply_entitlements(
            &self,
            business_id: &BusinessId,
            grant: &EntitlementGrant,
        ) -> Result<(), DomainError> {
            self.grants.lock().unwrap().push((*business_id, grant.clone()));
            Ok(())
        }
    }

    /// Everything the pipeline handlers need, wired over in-memory ports.
    pub struct PipelineFixture {
        pub ledger: Arc<InMemoryLedger>,
        pub subscriptions: Arc<InMemorySubscriptions>,
        pub notifications: Arc<RecordingNotifications>,
        pub emails: Arc<RecordingEmail>,
        pub directory: Arc<RecordingDirectory>,
        pub settlement: Arc<PaymentSettlement>,
    }

    pub fn default_plan() -> SubscriptionPlan {
        SubscriptionPlan {
            id: PlanId::new(),
            name: "Premium Annual".to_string(),
            duration_days: 365,
            entitlements: PlanEntitlements {
                allow_advertisements: true,
                top_placement: true,
                verified_badge: true,
                priority_support: true,
            },
        }
    }

    pub fn pipeline(ledger: InMemoryLedger, subscriptions: InMemorySubscriptions) -> PipelineFixture {
        let ledger = Arc::new(ledger);
        let subscriptions = Arc::new(subscriptions);
        let notifications = Arc::new(RecordingNotifications::default());
        let emails = Arc::new(RecordingEmail::default());
        let directory = Arc::new(RecordingDirectory::default());

        let activator = Arc::new(SubscriptionActivator::new(
            subscriptions.clone(),
            Arc::new(StaticPlans::new(default_plan())),
            directory.clone(),
            notifications.clone(),
            Arc::new(StaticUsers),
            emails.clone(),
            "paytabs",
        ));

        let settlement = Arc::new(PaymentSettlement::new(
            ledger.clone(),
            activator,
            notifications.clone(),
            Arc::new(StaticUsers),
            emails.clone(),
        ));

        PipelineFixture {
            ledger,
            subscriptions,
            notifications,
            emails,
            directory,
            settlement,
        }
    }

    pub fn pending_payment_with_ref() -> Payment {
        let mut payment = Payment::create(
            UserId::new("user-123").unwrap(),
            BusinessId::new(),
            Money::new(10_000, "SAR").unwrap(),
            "Premium Annual subscription",
        );
        payment.record_transaction_ref("TST2208200000123").unwrap();
        payment
    }

    pub fn authorized_result(payment: &Payment) -> GatewayPaymentResult {
        GatewayPaymentResult {
            transaction_ref: payment
                .transaction_ref
                .clone()
                .unwrap_or_else(|| "TST2208200000123".to_string()),
            correlation_id: Some(payment.id.to_string()),
            status: PaymentStatus::Completed,
            response_code: "A".to_string(),
            message: "Authorised".to_string(),
        }
    }

    pub fn declined_result(payment: &Payment) -> GatewayPaymentResult {
        GatewayPaymentResult {
            transaction_ref: payment
                .transaction_ref
                .clone()
                .unwrap_or_else(|| "TST2208200000123".to_string()),
            correlation_id: Some(payment.id.to_string()),
            status: PaymentStatus::Failed,
            response_code: "D".to_string(),
            message: "Declined".to_string(),
        }
    }
}
