//! SubscriptionActivator - subscription side effects of payment settlement.
//!
//! This is the only code path allowed to set a subscription Active. It is
//! invoked by payment settlement exactly once per payment, on the first
//! transition into a terminal state.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::payment::Payment;
use crate::domain::subscription::EntitlementGrant;
use crate::ports::{
    BusinessDirectory, EmailMessage, EmailSender, NewNotification, NotificationKind,
    NotificationSender, PlanReader, SubscriptionRepository, UserDirectory,
};

/// Outcome of running the activator for a completed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// A pending subscription was activated.
    Activated {
        subscription_id: SubscriptionId,
        plan_name: String,
    },

    /// The business had no pending subscription; the payment stands alone.
    NoPendingSubscription,
}

/// Applies subscription side effects when a payment settles.
pub struct SubscriptionActivator {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanReader>,
    directory: Arc<dyn BusinessDirectory>,
    notifications: Arc<dyn NotificationSender>,
    users: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailSender>,
    provider_tag: String,
}

impl SubscriptionActivator {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanReader>,
        directory: Arc<dyn BusinessDirectory>,
        notifications: Arc<dyn NotificationSender>,
        users: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailSender>,
        provider_tag: impl Into<String>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            directory,
            notifications,
            users,
            email,
            provider_tag: provider_tag.into(),
        }
    }

    /// Activate the business's pending subscription, if one exists.
    ///
    /// Activation is atomic with respect to the subscription row: the status
    /// change, period, and payment reference are one update. The entitlement
    /// snapshot, notification, and email follow; their failures are logged
    /// and swallowed because the subscription is already committed.
    pub async fn on_payment_completed(
        &self,
        payment: &Payment,
    ) -> Result<ActivationOutcome, DomainError> {
        let Some(mut subscription) = self
            .subscriptions
            .find_latest_pending_by_business(&payment.business_id)
            .await?
        else {
            return Ok(ActivationOutcome::NoPendingSubscription);
        };

        let plan = self
            .plans
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PlanNotFound,
                    format!("Plan {} not found for subscription", subscription.plan_id),
                )
            })?;

        let starts_at = Timestamp::now();
        let ends_at = starts_at.add_days(i64::from(plan.duration_days));
        let transaction_ref = payment.transaction_ref.clone().unwrap_or_default();

        subscription.activate(starts_at, ends_at, transaction_ref, &self.provider_tag)?;
        self.subscriptions.update(&subscription).await?;

        let grant = EntitlementGrant::from_plan(&plan, ends_at);
        if let Err(err) = self
            .directory
            .apply_entitlements(&payment.business_id, &grant)
            .await
        {
            tracing::error!(
                business_id = %payment.business_id,
                subscription_id = %subscription.id,
                error = %err,
                "Failed to apply entitlement snapshot after activation"
            );
        }

        let features = plan.entitlements.feature_list().join(", ");
        let notification = NewNotification {
            user_id: payment.user_id.clone(),
            kind: NotificationKind::SubscriptionActivated,
            title: "Subscription activated".to_string(),
            message: format!(
                "Your {} subscription is active until {}",
                plan.name, ends_at
            ),
            link: Some(format!("/businesses/{}/subscription", payment.business_id)),
        };
        if let Err(err) = self.notifications.notify(notification).await {
            tracing::warn!(
                user_id = %payment.user_id,
                error = %err,
                "Failed to create subscription-activated notification"
            );
        }

        self.send_activation_email(payment, &plan.name, &features, starts_at, ends_at)
            .await;

        Ok(ActivationOutcome::Activated {
            subscription_id: subscription.id,
            plan_name: plan.name,
        })
    }

    /// Mark the business's pending subscription failed, if one exists.
    ///
    /// No entitlement changes and no email on the failure path.
    pub async fn on_payment_failed(&self, payment: &Payment) -> Result<(), DomainError> {
        let Some(mut subscription) = self
            .subscriptions
            .find_latest_pending_by_business(&payment.business_id)
            .await?
        else {
            return Ok(());
        };

        subscription.mark_failed()?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            business_id = %payment.business_id,
            "Marked pending subscription failed after payment failure"
        );
        Ok(())
    }

    async fn send_activation_email(
        &self,
        payment: &Payment,
        plan_name: &str,
        features: &str,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) {
        let to = match self.users.email_of(&payment.user_id).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                tracing::debug!(user_id = %payment.user_id, "No email on file, skipping activation email");
                return;
            }
            Err(err) => {
                tracing::warn!(user_id = %payment.user_id, error = %err, "Email lookup failed");
                return;
            }
        };

        let message = EmailMessage {
            to,
            subject: format!("Your {} subscription is active", plan_name),
            html_body: format!(
                "<h1>Subscription activated</h1>\
                 <p>Plan: <strong>{}</strong></p>\
                 <p>Valid: {} to {}</p>\
                 <p>Included features: {}</p>",
                plan_name, starts_at, ends_at, features
            ),
        };

        if let Err(err) = self.email.send(message).await {
            tracing::warn!(
                user_id = %payment.user_id,
                error = %err,
                "Failed to send activation email"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BusinessId, Money, PlanId, UserId};
    use crate::domain::payment::PaymentStatus;
    use crate::domain::subscription::{
        BusinessSubscription, PlanEntitlements, SubscriptionPlan, SubscriptionStatus,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockSubscriptionRepository {
        subscriptions: Mutex<Vec<BusinessSubscription>>,
    }

    impl MockSubscriptionRepository {
        fn new() -> Self {
            Self {
                subscriptions: Mutex::new(Vec::new()),
            }
        }

        fn with_subscription(subscription: BusinessSubscription) -> Self {
            Self {
                subscriptions: Mutex::new(vec![subscription]),
            }
        }

        fn subscriptions(&self) -> Vec<BusinessSubscription> {
            self.subscriptions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
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

    struct MockPlanReader {
        plan: Option<SubscriptionPlan>,
    }

    #[async_trait]
    impl PlanReader for MockPlanReader {
        async fn find_by_id(
            &self,
            _id: &PlanId,
        ) -> Result<Option<SubscriptionPlan>, DomainError> {
            Ok(self.plan.clone())
        }
    }

    #[derive(Default)]
    struct MockBusinessDirectory {
        grants: Mutex<Vec<(BusinessId, EntitlementGrant)>>,
        verified: Mutex<bool>,
    }

    impl MockBusinessDirectory {
        fn grants(&self) -> Vec<(BusinessId, EntitlementGrant)> {
            self.grants.lock().unwrap().clone()
        }

        fn is_verified(&self) -> bool {
            *self.verified.lock().unwrap()
        }
    }

    #[async_trait]
    impl BusinessDirectory for MockBusinessDirectory {
        async fn apply_entitlements(
            &self,
            business_id: &BusinessId,
            grant: &EntitlementGrant,
        ) -> Result<(), DomainError> {
            // Monotone verified flag, mirroring the storage contract.
            let mut verified = self.verified.lock().unwrap();
            *verified = *verified || grant.grant_verified_badge;
            self.grants.lock().unwrap().push((*business_id, grant.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockNotificationSender {
        sent: Mutex<Vec<NewNotification>>,
    }

    impl MockNotificationSender {
        fn sent(&self) -> Vec<NewNotification> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSender for MockNotificationSender {
        async fn notify(&self, notification: NewNotification) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    struct MockUserDirectory;

    #[async_trait]
    impl UserDirectory for MockUserDirectory {
        async fn email_of(&self, _user_id: &UserId) -> Result<Option<String>, DomainError> {
            Ok(Some("owner@example.com".to_string()))
        }
    }

    #[derive(Default)]
    struct MockEmailSender {
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl MockEmailSender {
        fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for MockEmailSender {
        async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn premium_plan() -> SubscriptionPlan {
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

    fn completed_payment(business_id: BusinessId) -> Payment {
        let mut payment = Payment::create(
            UserId::new("user-123").unwrap(),
            business_id,
            Money::new(10_000, "SAR").unwrap(),
            "Premium Annual subscription",
        );
        payment
            .settle(PaymentStatus::Completed, Some("TST123".to_string()))
            .unwrap();
        payment
    }

    struct Fixture {
        subscriptions: Arc<MockSubscriptionRepository>,
        directory: Arc<MockBusinessDirectory>,
        notifications: Arc<MockNotificationSender>,
        emails: Arc<MockEmailSender>,
        activator: SubscriptionActivator,
    }

    fn fixture(subscriptions: MockSubscriptionRepository, plan: Option<SubscriptionPlan>) -> Fixture {
        let subscriptions = Arc::new(subscriptions);
        let directory = Arc::new(MockBusinessDirectory::default());
        let notifications = Arc::new(MockNotificationSender::default());
        let emails = Arc::new(MockEmailSender::default());
        let activator = SubscriptionActivator::new(
            subscriptions.clone(),
            Arc::new(MockPlanReader { plan }),
            directory.clone(),
            notifications.clone(),
            Arc::new(MockUserDirectory),
            emails.clone(),
            "paytabs",
        );
        Fixture {
            subscriptions,
            directory,
            notifications,
            emails,
            activator,
        }
    }

    #[tokio::test]
    async fn completed_payment_activates_pending_subscription() {
        let business_id = BusinessId::new();
        let subscription = BusinessSubscription::create(business_id, PlanId::new());
        let subscription_id = subscription.id;
        let fx = fixture(
            MockSubscriptionRepository::with_subscription(subscription),
            Some(premium_plan()),
        );

        let payment = completed_payment(business_id);
        let outcome = fx.activator.on_payment_completed(&payment).await.unwrap();

        assert!(matches!(
            outcome,
            ActivationOutcome::Activated { subscription_id: id, .. } if id == subscription_id
        ));

        let stored = fx.subscriptions.subscriptions();
        assert_eq!(stored[0].status, SubscriptionStatus::Active);
        assert_eq!(stored[0].payment_ref.as_deref(), Some("TST123"));
        assert_eq!(stored[0].payment_provider.as_deref(), Some("paytabs"));
        assert!(stored[0].ends_at.is_some());
    }

    #[tokio::test]
    async fn activation_snapshots_entitlements_onto_business() {
        let business_id = BusinessId::new();
        let subscription = BusinessSubscription::create(business_id, PlanId::new());
        let fx = fixture(
            MockSubscriptionRepository::with_subscription(subscription),
            Some(premium_plan()),
        );

        fx.activator
            .on_payment_completed(&completed_payment(business_id))
            .await
            .unwrap();

        let grants = fx.directory.grants();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].0, business_id);
        assert!(grants[0].1.allow_advertisements);
        assert!(grants[0].1.promoted_until.is_some());
        assert!(grants[0].1.grant_verified_badge);
        assert!(fx.directory.is_verified());
    }

    #[tokio::test]
    async fn activation_emits_notification_and_email() {
        let business_id = BusinessId::new();
        let subscription = BusinessSubscription::create(business_id, PlanId::new());
        let fx = fixture(
            MockSubscriptionRepository::with_subscription(subscription),
            Some(premium_plan()),
        );

        fx.activator
            .on_payment_completed(&completed_payment(business_id))
            .await
            .unwrap();

        let sent = fx.notifications.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::SubscriptionActivated);
        assert!(sent[0].message.contains("Premium Annual"));

        let emails = fx.emails.sent();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "owner@example.com");
        assert!(emails[0].html_body.contains("Top placement"));
    }

    #[tokio::test]
    async fn no_pending_subscription_means_no_side_effects() {
        let business_id = BusinessId::new();
        let fx = fixture(MockSubscriptionRepository::new(), Some(premium_plan()));

        let outcome = fx
            .activator
            .on_payment_completed(&completed_payment(business_id))
            .await
            .unwrap();

        assert_eq!(outcome, ActivationOutcome::NoPendingSubscription);
        assert!(fx.directory.grants().is_empty());
        assert!(fx.notifications.sent().is_empty());
        assert!(fx.emails.sent().is_empty());
    }

    #[tokio::test]
    async fn pending_subscription_of_other_business_is_untouched() {
        let business_id = BusinessId::new();
        let other_subscription = BusinessSubscription::create(BusinessId::new(), PlanId::new());
        let fx = fixture(
            MockSubscriptionRepository::with_subscription(other_subscription),
            Some(premium_plan()),
        );

        let outcome = fx
            .activator
            .on_payment_completed(&completed_payment(business_id))
            .await
            .unwrap();

        assert_eq!(outcome, ActivationOutcome::NoPendingSubscription);
        assert_eq!(
            fx.subscriptions.subscriptions()[0].status,
            SubscriptionStatus::Pending
        );
    }

    #[tokio::test]
    async fn failed_payment_marks_pending_subscription_failed() {
        let business_id = BusinessId::new();
        let subscription = BusinessSubscription::create(business_id, PlanId::new());
        let fx = fixture(
            MockSubscriptionRepository::with_subscription(subscription),
            Some(premium_plan()),
        );

        let mut payment = Payment::create(
            UserId::new("user-123").unwrap(),
            business_id,
            Money::new(10_000, "SAR").unwrap(),
            "Premium Annual subscription",
        );
        payment.settle(PaymentStatus::Failed, None).unwrap();

        fx.activator.on_payment_failed(&payment).await.unwrap();

        let stored = fx.subscriptions.subscriptions();
        assert_eq!(stored[0].status, SubscriptionStatus::Failed);
        assert!(fx.directory.grants().is_empty());
        assert!(fx.emails.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_payment_without_pending_subscription_is_noop() {
        let fx = fixture(MockSubscriptionRepository::new(), Some(premium_plan()));

        let mut payment = Payment::create(
            UserId::new("user-123").unwrap(),
            BusinessId::new(),
            Money::new(10_000, "SAR").unwrap(),
            "one-off service",
        );
        payment.settle(PaymentStatus::Failed, None).unwrap();

        assert!(fx.activator.on_payment_failed(&payment).await.is_ok());
    }

    #[tokio::test]
    async fn missing_plan_is_an_error_and_leaves_subscription_pending() {
        let business_id = BusinessId::new();
        let subscription = BusinessSubscription::create(business_id, PlanId::new());
        let fx = fixture(
            MockSubscriptionRepository::with_subscription(subscription),
            None,
        );

        let result = fx
            .activator
            .on_payment_completed(&completed_payment(business_id))
            .await;

        assert!(result.is_err());
        assert_eq!(
            fx.subscriptions.subscriptions()[0].status,
            SubscriptionStatus::Pending
        );
    }
}
