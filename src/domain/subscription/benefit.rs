use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::errors::AppError;

/// A metered feature gated by the subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    WardrobeItems,
    AiSuggestions,
    Collections,
}

impl Feature {
    /// How credits for this feature behave over time
    pub fn usage_type(&self) -> UsageType {
        match self {
            Feature::WardrobeItems | Feature::Collections => UsageType::Persistent,
            Feature::AiSuggestions => UsageType::Consumable,
        }
    }

    fn exhausted_message(&self) -> &'static str {
        match self {
            Feature::WardrobeItems => "Wardrobe item limit reached for your plan",
            Feature::AiSuggestions => "AI suggestion limit reached for your plan",
            Feature::Collections => "Collection limit reached for your plan",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::WardrobeItems => write!(f, "wardrobe_items"),
            Feature::AiSuggestions => write!(f, "ai_suggestions"),
            Feature::Collections => write!(f, "collections"),
        }
    }
}

/// Persistent credits come back when the thing that used them is deleted;
/// consumable credits are spent for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    Persistent,
    Consumable,
}

/// Plan-side cap for one feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitLimit {
    pub feature: Feature,
    pub usage_type: UsageType,
    pub limit: i32,
}

impl BenefitLimit {
    pub fn new(feature: Feature, limit: i32) -> Self {
        Self {
            feature,
            usage_type: feature.usage_type(),
            limit,
        }
    }
}

/// Subscription-side remaining credit for one feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitUsage {
    pub feature: Feature,
    pub usage_type: UsageType,
    pub credit: i32,
}

/// Usage row as shown to the account owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BenefitReport {
    pub feature: Feature,
    pub usage_type: UsageType,
    pub limit: i32,
    pub used: i32,
    pub remaining: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// The plan does not include the feature at all
    NoAccess(Feature),
    /// No credit left
    Exhausted(Feature),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NoAccess(feature) => AppError::forbidden(format!(
                "Your plan does not include {}",
                feature
            )),
            LedgerError::Exhausted(feature) => AppError::forbidden(feature.exhausted_message()),
        }
    }
}

/// Validates a plan's benefit list
///
/// # Rules
/// - Limits are non-negative
/// - Each feature appears at most once
/// - The usage type matches the feature
pub fn validate_limits(limits: &[BenefitLimit]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for limit in limits {
        if limit.limit < 0 {
            return Err(format!("Limit for {} must not be negative", limit.feature));
        }
        if limit.usage_type != limit.feature.usage_type() {
            return Err(format!("Invalid usage type for {}", limit.feature));
        }
        if !seen.insert(limit.feature) {
            return Err(format!("Duplicate benefit: {}", limit.feature));
        }
    }
    Ok(())
}

/// The per-feature credit list stored as JSON on a user subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenefitLedger(Vec<BenefitUsage>);

impl BenefitLedger {
    /// Fresh ledger with every credit at its limit
    pub fn from_limits(limits: &[BenefitLimit]) -> Self {
        Self(
            limits
                .iter()
                .map(|l| BenefitUsage {
                    feature: l.feature,
                    usage_type: l.usage_type,
                    credit: l.limit,
                })
                .collect(),
        )
    }

    pub fn credit(&self, feature: Feature) -> Option<i32> {
        self.0.iter().find(|u| u.feature == feature).map(|u| u.credit)
    }

    /// Spends one credit, returning what remains
    pub fn consume(&mut self, feature: Feature) -> Result<i32, LedgerError> {
        let usage = self
            .0
            .iter_mut()
            .find(|u| u.feature == feature)
            .ok_or(LedgerError::NoAccess(feature))?;
        if usage.credit <= 0 {
            return Err(LedgerError::Exhausted(feature));
        }
        usage.credit -= 1;
        Ok(usage.credit)
    }

    /// Gives one persistent credit back, never exceeding the plan limit
    ///
    /// Returns the new credit, or `None` when nothing changed.
    pub fn release(&mut self, feature: Feature, limits: &[BenefitLimit]) -> Option<i32> {
        let limit = limits.iter().find(|l| l.feature == feature)?.limit;
        let usage = self.0.iter_mut().find(|u| u.feature == feature)?;
        if usage.usage_type != UsageType::Persistent || usage.credit >= limit {
            return None;
        }
        usage.credit += 1;
        Some(usage.credit)
    }

    /// Builds the ledger for a new plan from the ledger held under the old one
    ///
    /// Persistent features keep their used amount (`limit - credit`);
    /// consumable features restart at the new limit.
    pub fn rebase(&self, old_limits: &[BenefitLimit], new_limits: &[BenefitLimit]) -> Self {
        Self(
            new_limits
                .iter()
                .map(|new| {
                    let credit = match new.usage_type {
                        UsageType::Consumable => new.limit,
                        UsageType::Persistent => {
                            let used = match (
                                old_limits.iter().find(|l| l.feature == new.feature),
                                self.credit(new.feature),
                            ) {
                                (Some(old), Some(credit)) => (old.limit - credit).max(0),
                                _ => 0,
                            };
                            (new.limit - used).max(0)
                        }
                    };
                    BenefitUsage {
                        feature: new.feature,
                        usage_type: new.usage_type,
                        credit,
                    }
                })
                .collect(),
        )
    }

    /// Joins the ledger with the plan limits for display
    pub fn report(&self, limits: &[BenefitLimit]) -> Vec<BenefitReport> {
        limits
            .iter()
            .map(|l| {
                let remaining = self.credit(l.feature).unwrap_or(0).clamp(0, l.limit.max(0));
                BenefitReport {
                    feature: l.feature,
                    usage_type: l.usage_type,
                    limit: l.limit,
                    used: l.limit - remaining,
                    remaining,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_limits() -> Vec<BenefitLimit> {
        vec![
            BenefitLimit::new(Feature::WardrobeItems, 2),
            BenefitLimit::new(Feature::AiSuggestions, 1),
        ]
    }

    #[test]
    fn consume_decrements_until_exhausted() {
        let mut ledger = BenefitLedger::from_limits(&free_limits());
        assert_eq!(ledger.consume(Feature::WardrobeItems), Ok(1));
        assert_eq!(ledger.consume(Feature::WardrobeItems), Ok(0));
        assert_eq!(
            ledger.consume(Feature::WardrobeItems),
            Err(LedgerError::Exhausted(Feature::WardrobeItems))
        );
        assert_eq!(ledger.credit(Feature::WardrobeItems), Some(0));
    }

    #[test]
    fn consume_missing_feature_has_no_access() {
        let mut ledger = BenefitLedger::from_limits(&free_limits());
        assert_eq!(
            ledger.consume(Feature::Collections),
            Err(LedgerError::NoAccess(Feature::Collections))
        );
    }

    #[test]
    fn release_caps_at_limit() {
        let limits = free_limits();
        let mut ledger = BenefitLedger::from_limits(&limits);
        assert_eq!(ledger.release(Feature::WardrobeItems, &limits), None);
        ledger.consume(Feature::WardrobeItems).unwrap();
        assert_eq!(ledger.release(Feature::WardrobeItems, &limits), Some(2));
        assert_eq!(ledger.release(Feature::WardrobeItems, &limits), None);
    }

    #[test]
    fn release_ignores_consumable_features() {
        let limits = free_limits();
        let mut ledger = BenefitLedger::from_limits(&limits);
        ledger.consume(Feature::AiSuggestions).unwrap();
        assert_eq!(ledger.release(Feature::AiSuggestions, &limits), None);
        assert_eq!(ledger.credit(Feature::AiSuggestions), Some(0));
    }

    #[test]
    fn rebase_carries_persistent_usage_and_resets_consumables() {
        let old = vec![
            BenefitLimit::new(Feature::WardrobeItems, 10),
            BenefitLimit::new(Feature::AiSuggestions, 5),
        ];
        let mut ledger = BenefitLedger::from_limits(&old);
        for _ in 0..4 {
            ledger.consume(Feature::WardrobeItems).unwrap();
        }
        ledger.consume(Feature::AiSuggestions).unwrap();

        let new = vec![
            BenefitLimit::new(Feature::WardrobeItems, 100),
            BenefitLimit::new(Feature::AiSuggestions, 50),
            BenefitLimit::new(Feature::Collections, 10),
        ];
        let rebased = ledger.rebase(&old, &new);
        assert_eq!(rebased.credit(Feature::WardrobeItems), Some(96));
        assert_eq!(rebased.credit(Feature::AiSuggestions), Some(50));
        assert_eq!(rebased.credit(Feature::Collections), Some(10));
    }

    #[test]
    fn rebase_to_smaller_plan_floors_at_zero() {
        let old = vec![BenefitLimit::new(Feature::WardrobeItems, 100)];
        let mut ledger = BenefitLedger::from_limits(&old);
        for _ in 0..80 {
            ledger.consume(Feature::WardrobeItems).unwrap();
        }
        let new = vec![BenefitLimit::new(Feature::WardrobeItems, 50)];
        let rebased = ledger.rebase(&old, &new);
        assert_eq!(rebased.credit(Feature::WardrobeItems), Some(0));
    }

    #[test]
    fn rebase_drops_features_missing_from_new_plan() {
        let old = free_limits();
        let ledger = BenefitLedger::from_limits(&old);
        let new = vec![BenefitLimit::new(Feature::WardrobeItems, 5)];
        let rebased = ledger.rebase(&old, &new);
        assert_eq!(rebased, BenefitLedger::from_limits(&new));
        assert_eq!(rebased.credit(Feature::AiSuggestions), None);
    }

    #[test]
    fn report_joins_limits() {
        let limits = free_limits();
        let mut ledger = BenefitLedger::from_limits(&limits);
        ledger.consume(Feature::WardrobeItems).unwrap();
        let report = ledger.report(&limits);
        assert_eq!(report[0].used, 1);
        assert_eq!(report[0].remaining, 1);
        assert_eq!(report[1].used, 0);
    }

    #[test]
    fn validate_rejects_duplicates_and_negatives() {
        assert!(validate_limits(&free_limits()).is_ok());
        assert!(validate_limits(&[
            BenefitLimit::new(Feature::Collections, 1),
            BenefitLimit::new(Feature::Collections, 2),
        ])
        .is_err());
        assert!(validate_limits(&[BenefitLimit::new(Feature::Collections, -1)]).is_err());
    }

    #[test]
    fn validate_rejects_mismatched_usage_type() {
        let limit = BenefitLimit {
            feature: Feature::AiSuggestions,
            usage_type: UsageType::Persistent,
            limit: 3,
        };
        assert!(validate_limits(&[limit]).is_err());
    }

    #[test]
    fn ledger_serializes_as_plain_list() {
        let ledger = BenefitLedger::from_limits(&[BenefitLimit::new(Feature::AiSuggestions, 3)]);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"feature": "ai_suggestions", "usage_type": "consumable", "credit": 3}])
        );
    }

    #[test]
    fn exhausted_error_maps_to_forbidden() {
        let err: AppError = LedgerError::Exhausted(Feature::WardrobeItems).into();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.to_string(), "Wardrobe item limit reached for your plan");
    }
}
