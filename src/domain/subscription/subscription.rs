use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::benefit::BenefitLedger;
use super::plan::Plan;

/// Lifecycle status of a user subscription
///
/// # Status Transitions
/// ```text
/// Active -> Expired    (end date passed, sweep)
/// Active -> Cancelled  (replaced by another plan)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

/// A user's subscription to a plan, carrying the benefit ledger
#[derive(Debug, Clone)]
pub struct UserSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    /// `None` for open-ended subscriptions on the default plan
    pub end_date: Option<DateTime<Utc>>,
    pub benefit_usage: BenefitLedger,
}

impl UserSubscription {
    /// Starts a subscription on `plan` at `now`
    ///
    /// The default plan never ends; paid plans end after `duration_days`.
    pub fn start(user_id: Uuid, plan: &Plan, ledger: BenefitLedger, now: DateTime<Utc>) -> Self {
        let end_date = if plan.is_default {
            None
        } else {
            Some(now + Duration::days(plan.duration_days as i64))
        };
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date,
            benefit_usage: ledger,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Active but past its end date
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.end_date.map_or(false, |end| end <= now)
    }
}

/// What a confirmed payment (or an expiry) does to a user's subscriptions
#[derive(Debug, Clone)]
pub enum Activation {
    /// Same plan bought again: push the end date out
    Extend {
        subscription_id: Uuid,
        end_date: DateTime<Utc>,
    },
    /// Different plan: close the current row and open a new one
    Replace {
        close: Option<Uuid>,
        open: UserSubscription,
    },
}

/// Decides how `target` takes effect for a user given their current subscription
///
/// `current` is paired with the plan it belongs to.
pub fn plan_activation(
    user_id: Uuid,
    current: Option<(&UserSubscription, &Plan)>,
    target: &Plan,
    now: DateTime<Utc>,
) -> Activation {
    match current {
        Some((sub, _)) if sub.is_active() && sub.plan_id == target.id && !target.is_default => {
            let base = sub.end_date.map_or(now, |end| end.max(now));
            Activation::Extend {
                subscription_id: sub.id,
                end_date: base + Duration::days(target.duration_days as i64),
            }
        }
        Some((sub, plan)) => {
            let ledger = sub.benefit_usage.rebase(&plan.benefits, &target.benefits);
            Activation::Replace {
                close: sub.is_active().then_some(sub.id),
                open: UserSubscription::start(user_id, target, ledger, now),
            }
        }
        None => Activation::Replace {
            close: None,
            open: UserSubscription::start(
                user_id,
                target,
                BenefitLedger::from_limits(&target.benefits),
                now,
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::benefit::{BenefitLimit, Feature};
    use rust_decimal::Decimal;

    fn plan(is_default: bool, wardrobe: i32) -> Plan {
        let now = Utc::now();
        Plan {
            id: Uuid::new_v4(),
            name: if is_default { "Free" } else { "Premium" }.to_string(),
            description: None,
            price: if is_default { Decimal::ZERO } else { Decimal::new(99, 0) },
            duration_days: 30,
            benefits: vec![
                BenefitLimit::new(Feature::WardrobeItems, wardrobe),
                BenefitLimit::new(Feature::AiSuggestions, 5),
            ],
            is_default,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn default_plan_subscription_is_open_ended() {
        let free = plan(true, 10);
        let sub = UserSubscription::start(
            Uuid::new_v4(),
            &free,
            BenefitLedger::from_limits(&free.benefits),
            Utc::now(),
        );
        assert!(sub.end_date.is_none());
        assert!(!sub.is_lapsed(Utc::now() + Duration::days(10_000)));
    }

    #[test]
    fn paid_subscription_lapses_after_duration() {
        let premium = plan(false, 100);
        let now = Utc::now();
        let sub = UserSubscription::start(
            Uuid::new_v4(),
            &premium,
            BenefitLedger::from_limits(&premium.benefits),
            now,
        );
        assert_eq!(sub.end_date, Some(now + Duration::days(30)));
        assert!(!sub.is_lapsed(now + Duration::days(29)));
        assert!(sub.is_lapsed(now + Duration::days(30)));
    }

    #[test]
    fn first_activation_opens_fresh_ledger() {
        let premium = plan(false, 100);
        let user = Uuid::new_v4();
        match plan_activation(user, None, &premium, Utc::now()) {
            Activation::Replace { close, open } => {
                assert!(close.is_none());
                assert_eq!(open.user_id, user);
                assert_eq!(open.benefit_usage.credit(Feature::WardrobeItems), Some(100));
            }
            other => panic!("unexpected activation: {:?}", other),
        }
    }

    #[test]
    fn upgrade_replaces_and_rebases() {
        let free = plan(true, 10);
        let premium = plan(false, 100);
        let user = Uuid::new_v4();
        let now = Utc::now();
        let mut ledger = BenefitLedger::from_limits(&free.benefits);
        ledger.consume(Feature::WardrobeItems).unwrap();
        ledger.consume(Feature::WardrobeItems).unwrap();
        let current = UserSubscription::start(user, &free, ledger, now);

        match plan_activation(user, Some((&current, &free)), &premium, now) {
            Activation::Replace { close, open } => {
                assert_eq!(close, Some(current.id));
                assert_eq!(open.plan_id, premium.id);
                assert_eq!(open.benefit_usage.credit(Feature::WardrobeItems), Some(98));
                assert_eq!(open.end_date, Some(now + Duration::days(30)));
            }
            other => panic!("unexpected activation: {:?}", other),
        }
    }

    #[test]
    fn renewal_extends_from_current_end() {
        let premium = plan(false, 100);
        let user = Uuid::new_v4();
        let now = Utc::now();
        let current = UserSubscription::start(
            user,
            &premium,
            BenefitLedger::from_limits(&premium.benefits),
            now - Duration::days(10),
        );

        match plan_activation(user, Some((&current, &premium)), &premium, now) {
            Activation::Extend {
                subscription_id,
                end_date,
            } => {
                assert_eq!(subscription_id, current.id);
                assert_eq!(end_date, now + Duration::days(50));
            }
            other => panic!("unexpected activation: {:?}", other),
        }
    }

    #[test]
    fn renewal_of_lapsed_subscription_extends_from_now() {
        let premium = plan(false, 100);
        let user = Uuid::new_v4();
        let now = Utc::now();
        let current = UserSubscription::start(
            user,
            &premium,
            BenefitLedger::from_limits(&premium.benefits),
            now - Duration::days(40),
        );

        match plan_activation(user, Some((&current, &premium)), &premium, now) {
            Activation::Extend { end_date, .. } => {
                assert_eq!(end_date, now + Duration::days(30));
            }
            other => panic!("unexpected activation: {:?}", other),
        }
    }

    #[test]
    fn downgrade_to_default_is_open_ended() {
        let free = plan(true, 10);
        let premium = plan(false, 100);
        let user = Uuid::new_v4();
        let now = Utc::now();
        let current = UserSubscription::start(
            user,
            &premium,
            BenefitLedger::from_limits(&premium.benefits),
            now - Duration::days(31),
        );

        match plan_activation(user, Some((&current, &premium)), &free, now) {
            Activation::Replace { close, open } => {
                assert_eq!(close, Some(current.id));
                assert!(open.end_date.is_none());
                assert_eq!(open.benefit_usage.credit(Feature::WardrobeItems), Some(10));
            }
            other => panic!("unexpected activation: {:?}", other),
        }
    }
}
