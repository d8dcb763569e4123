// Subscription domain module
// Plans, per-user subscriptions with their benefit ledger, and payments

#![allow(clippy::module_inception)]

pub mod benefit;
pub mod payment;
pub mod plan;
pub mod subscription;

pub use benefit::{BenefitLedger, BenefitLimit, BenefitReport, Feature, UsageType};
pub use payment::{GatewayStatus, Payment, PaymentStatus, SettlementOutcome, WebhookEvent};
pub use plan::{Plan, PlanDraft};
pub use subscription::{plan_activation, Activation, SubscriptionStatus, UserSubscription};
