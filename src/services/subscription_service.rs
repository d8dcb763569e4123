use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::signature;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::notification::NotificationKind;
use crate::domain::ports::PaymentGateway;
use crate::domain::repositories::{PaymentRepository, PlanRepository, SubscriptionRepository};
use crate::domain::subscription::payment::WebhookStatus;
use crate::domain::subscription::{
    BenefitReport, GatewayStatus, Payment, PaymentStatus, SettlementOutcome, SubscriptionStatus,
    WebhookEvent,
};
use crate::services::NotificationService;

/// Rows handled per background tick
const BATCH_SIZE: i64 = 100;

/// The caller's plan, status and remaining credits
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionOverview {
    pub subscription_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub is_default_plan: bool,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub usage: Vec<BenefitReport>,
}

/// Counters from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub activated: usize,
    pub cancelled: usize,
    pub expired: usize,
}

/// Checkout, webhook settlement and subscription lifecycle
#[derive(Clone)]
pub struct SubscriptionService {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationService,
    webhook_secret: String,
    link_ttl: Duration,
}

impl SubscriptionService {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationService,
        webhook_secret: impl Into<String>,
        link_ttl: Duration,
    ) -> Self {
        Self {
            plans,
            subscriptions,
            payments,
            gateway,
            notifications,
            webhook_secret: webhook_secret.into(),
            link_ttl,
        }
    }

    pub async fn my_subscription(&self, user_id: Uuid) -> AppResult<SubscriptionOverview> {
        let (sub, plan) = self.subscriptions.current(user_id).await?;
        Ok(SubscriptionOverview {
            subscription_id: sub.id,
            plan_id: plan.id,
            plan_name: plan.name.clone(),
            is_default_plan: plan.is_default,
            status: sub.status,
            start_date: sub.start_date,
            end_date: sub.end_date,
            usage: sub.benefit_usage.report(&plan.benefits),
        })
    }

    /// Opens (or reuses) a checkout for `plan_id`
    pub async fn purchase(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Payment> {
        let plan = self
            .plans
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan not found"))?;
        if !plan.is_purchasable() {
            return Err(AppError::bad_request("This plan cannot be purchased"));
        }

        let open = self.payments.find_open(user_id, plan.id, now).await?;
        if let Some(open) = open.filter(|p| p.is_open(now) && !p.checkout_url.is_empty()) {
            return Ok(open);
        }

        // Nothing is stored until the gateway has handed out a link
        let mut payment = Payment::open(user_id, &plan, self.link_ttl, now);
        payment.checkout_url = self.gateway.create_checkout(&payment, &plan).await?;
        if let Err(err) = self.payments.create(&payment).await {
            self.cancel_checkout(payment.order_code).await;
            return Err(err);
        }

        tracing::info!(
            payment_id = %payment.id,
            order_code = payment.order_code,
            %user_id,
            plan = %plan.name,
            "checkout opened"
        );
        Ok(payment)
    }

    pub async fn cancel_payment(&self, user_id: Uuid, payment_id: Uuid) -> AppResult<Payment> {
        let mut payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .filter(|p| p.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Payment not found"))?;

        if payment.status != PaymentStatus::Pending
            || !self.payments.mark(payment.id, PaymentStatus::Cancelled).await?
        {
            return Err(AppError::bad_request("Only pending payments can be cancelled"));
        }
        payment.status = PaymentStatus::Cancelled;
        self.cancel_checkout(payment.order_code).await;
        Ok(payment)
    }

    /// Applies a signed gateway callback
    ///
    /// `signature` is the hex HMAC-SHA256 of `body`. Replays are no-ops.
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let valid = signature
            .map(|sig| signature::verify(&self.webhook_secret, body, sig))
            .unwrap_or(false);
        if !valid {
            tracing::warn!("webhook rejected: bad signature");
            return Err(AppError::unauthorized("Invalid webhook signature"));
        }

        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|e| AppError::bad_request(format!("Invalid webhook payload: {}", e)))?;
        let payment = self
            .payments
            .find_by_order_code(event.order_code)
            .await?
            .ok_or_else(|| AppError::not_found("Payment not found"))?;

        match event.status {
            WebhookStatus::Paid => {
                if event.amount != payment.amount {
                    tracing::warn!(
                        order_code = event.order_code,
                        expected = %payment.amount,
                        received = %event.amount,
                        "webhook amount mismatch"
                    );
                    return Err(AppError::bad_request("Amount does not match payment"));
                }
                self.activate(event.order_code, now).await?;
            }
            WebhookStatus::Cancelled => {
                if self.payments.mark(payment.id, PaymentStatus::Cancelled).await? {
                    tracing::info!(order_code = event.order_code, "payment cancelled by gateway");
                }
            }
        }
        Ok(())
    }

    /// Settles a paid order and tells the user
    async fn activate(&self, order_code: i64, now: DateTime<Utc>) -> AppResult<SettlementOutcome> {
        let outcome = self.payments.settle(order_code, now).await?;
        match &outcome {
            SettlementOutcome::Activated { user_id, plan_id } => {
                let plan_name = self
                    .plans
                    .find_by_id(*plan_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|p| p.name)
                    .unwrap_or_else(|| "your plan".to_string());
                tracing::info!(order_code, %user_id, %plan_id, "subscription activated");
                self.notifications
                    .notify_quietly(
                        *user_id,
                        NotificationKind::Subscription,
                        "Subscription activated",
                        format!("Your payment was received and {} is now active.", plan_name),
                        Some(*plan_id),
                    )
                    .await;
            }
            SettlementOutcome::AlreadySettled => {
                tracing::debug!(order_code, "payment already settled");
            }
        }
        Ok(outcome)
    }

    /// Moves every lapsed subscription back to the default plan
    ///
    /// Returns how many rows were expired. A failing row is logged and skipped.
    pub async fn expire_lapsed(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let lapsed = self.subscriptions.lapsed(now, BATCH_SIZE).await?;
        let mut expired = 0;
        for sub in lapsed {
            match self.subscriptions.expire(sub.id, now).await {
                Ok(true) => {
                    expired += 1;
                    self.notifications
                        .notify_quietly(
                            sub.user_id,
                            NotificationKind::Subscription,
                            "Subscription expired",
                            "Your subscription has ended and you are back on the free plan.",
                            Some(sub.plan_id),
                        )
                        .await;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(subscription_id = %sub.id, error = %e, "failed to expire subscription");
                }
            }
        }
        Ok(expired)
    }

    /// Brings pending payments in line with the gateway
    pub async fn reconcile_payments(&self, now: DateTime<Utc>) -> AppResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for payment in self.payments.list_pending(BATCH_SIZE).await? {
            if let Err(e) = self.reconcile_one(&payment, now, &mut report).await {
                tracing::error!(
                    order_code = payment.order_code,
                    error = %e,
                    "failed to reconcile payment"
                );
            }
        }
        Ok(report)
    }

    async fn reconcile_one(
        &self,
        payment: &Payment,
        now: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) -> AppResult<()> {
        if payment.is_stale(now) {
            if self.payments.mark(payment.id, PaymentStatus::Expired).await? {
                report.expired += 1;
                self.cancel_checkout(payment.order_code).await;
            }
            return Ok(());
        }

        match self.gateway.fetch_status(payment.order_code).await? {
            GatewayStatus::Paid => {
                if let SettlementOutcome::Activated { .. } =
                    self.activate(payment.order_code, now).await?
                {
                    report.activated += 1;
                }
            }
            GatewayStatus::Cancelled => {
                if self.payments.mark(payment.id, PaymentStatus::Cancelled).await? {
                    report.cancelled += 1;
                }
            }
            GatewayStatus::Expired => {
                if self.payments.mark(payment.id, PaymentStatus::Expired).await? {
                    report.expired += 1;
                }
            }
            GatewayStatus::Pending => {}
        }
        Ok(())
    }

    async fn cancel_checkout(&self, order_code: i64) {
        if let Err(e) = self.gateway.cancel_checkout(order_code).await {
            tracing::warn!(order_code, error = %e, "could not cancel checkout link");
        }
    }
}
