use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::Plan;

/// Payment status
///
/// # Status Transitions
/// ```text
/// Pending -> Paid
///         -> Cancelled
///         -> Expired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
    Expired,
}

impl PaymentStatus {
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Pending, Expired)
        )
    }
}

/// A checkout attempt for a plan
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub order_code: i64,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub checkout_url: String,
    pub expires_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Opens a pending payment for `plan` whose link lives for `ttl`
    pub fn open(user_id: Uuid, plan: &Plan, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            order_code: generate_order_code(now),
            amount: plan.price,
            status: PaymentStatus::Pending,
            checkout_url: String::new(),
            expires_at: now + ttl,
            paid_at: None,
            created_at: now,
        }
    }

    /// Pending and the checkout link is still usable
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == PaymentStatus::Pending && self.expires_at > now
    }

    /// Pending but the checkout link has run out
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.status == PaymentStatus::Pending && self.expires_at <= now
    }
}

/// Numeric order code accepted by hosted checkout pages
///
/// Millisecond timestamp with three random digits appended, which stays
/// below 2^53 for the foreseeable future.
pub fn generate_order_code(now: DateTime<Utc>) -> i64 {
    let suffix: i64 = rand::thread_rng().gen_range(0..1000);
    now.timestamp_millis() * 1000 + suffix
}

/// Status reported by the payment gateway for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Pending,
    Paid,
    Cancelled,
    Expired,
}

/// Status carried by a webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookStatus {
    Paid,
    Cancelled,
}

/// Webhook body sent by the payment gateway
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub order_code: i64,
    pub status: WebhookStatus,
    pub amount: Decimal,
}

/// Result of applying a gateway confirmation to a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The payment moved to paid and the plan is now active
    Activated { user_id: Uuid, plan_id: Uuid },
    /// The payment had already been settled; nothing changed
    AlreadySettled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::benefit::{BenefitLimit, Feature};

    fn premium() -> Plan {
        let now = Utc::now();
        Plan {
            id: Uuid::new_v4(),
            name: "Premium".to_string(),
            description: None,
            price: Decimal::new(4900, 2),
            duration_days: 30,
            benefits: vec![BenefitLimit::new(Feature::WardrobeItems, 500)],
            is_default: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn open_payment_copies_plan_price() {
        let plan = premium();
        let now = Utc::now();
        let payment = Payment::open(Uuid::new_v4(), &plan, Duration::minutes(15), now);
        assert_eq!(payment.amount, plan.price);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.expires_at, now + Duration::minutes(15));
    }

    #[test]
    fn open_and_stale_depend_on_expiry() {
        let now = Utc::now();
        let payment = Payment::open(Uuid::new_v4(), &premium(), Duration::minutes(15), now);
        assert!(payment.is_open(now));
        assert!(!payment.is_stale(now));
        let later = now + Duration::minutes(16);
        assert!(!payment.is_open(later));
        assert!(payment.is_stale(later));
    }

    #[test]
    fn settled_payment_is_neither_open_nor_stale() {
        let now = Utc::now();
        let mut payment = Payment::open(Uuid::new_v4(), &premium(), Duration::minutes(15), now);
        payment.status = PaymentStatus::Paid;
        assert!(!payment.is_open(now));
        assert!(!payment.is_stale(now + Duration::hours(1)));
    }

    #[test]
    fn order_codes_embed_timestamp_and_fit_in_safe_integer() {
        let now = Utc::now();
        let code = generate_order_code(now);
        assert_eq!(code / 1000, now.timestamp_millis());
        assert!(code < 9_007_199_254_740_991);
    }

    #[test]
    fn only_pending_payments_transition() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Expired));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Expired.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn webhook_event_parses_uppercase_status() {
        let event: WebhookEvent =
            serde_json::from_str(r#"{"order_code": 42, "status": "PAID", "amount": "49.00"}"#)
                .unwrap();
        assert_eq!(event.status, WebhookStatus::Paid);
        assert_eq!(event.amount, Decimal::new(4900, 2));
    }
}
