use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::benefit::{validate_limits, BenefitLimit, Feature};
use crate::domain::errors::validate_length;
use crate::domain::errors::{AppError, AppResult};

/// A purchasable subscription plan
#[derive(Debug, Clone)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_days: i32,
    pub benefits: Vec<BenefitLimit>,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn limit_for(&self, feature: Feature) -> Option<i32> {
        self.benefits
            .iter()
            .find(|b| b.feature == feature)
            .map(|b| b.limit)
    }

    /// Whether the plan can be bought through checkout
    pub fn is_purchasable(&self) -> bool {
        self.is_active && !self.is_default && self.price > Decimal::ZERO
    }
}

/// Admin input for creating or replacing a plan
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_days: i32,
    pub benefits: Vec<BenefitLimit>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl PlanDraft {
    /// # Business Rules Enforced
    /// - Name is 1..=100 characters
    /// - Price is not negative
    /// - Duration is at least one day
    /// - Benefits pass `validate_limits`
    pub fn validate(&self) -> AppResult<()> {
        validate_length("Plan name", &self.name, 1, 100)?;
        if self.price < Decimal::ZERO {
            return Err(AppError::bad_request("Price must not be negative"));
        }
        if self.duration_days <= 0 {
            return Err(AppError::bad_request("Duration must be at least one day"));
        }
        validate_limits(&self.benefits).map_err(AppError::BadRequest)
    }

    pub fn into_plan(self, now: DateTime<Utc>) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            duration_days: self.duration_days,
            benefits: self.benefits,
            is_default: false,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PlanDraft {
        PlanDraft {
            name: "Premium".to_string(),
            description: None,
            price: Decimal::new(9900, 2),
            duration_days: 30,
            benefits: vec![BenefitLimit::new(Feature::WardrobeItems, 500)],
            is_active: true,
        }
    }

    #[test]
    fn valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn negative_price_rejected() {
        let mut d = draft();
        d.price = Decimal::new(-1, 0);
        assert!(d.validate().is_err());
    }

    #[test]
    fn zero_duration_rejected() {
        let mut d = draft();
        d.duration_days = 0;
        assert!(d.validate().is_err());
    }

    #[test]
    fn empty_name_rejected() {
        let mut d = draft();
        d.name = "  ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn plan_limit_lookup() {
        let plan = draft().into_plan(Utc::now());
        assert_eq!(plan.limit_for(Feature::WardrobeItems), Some(500));
        assert_eq!(plan.limit_for(Feature::AiSuggestions), None);
        assert!(!plan.is_default);
    }

    #[test]
    fn default_and_free_plans_are_not_purchasable() {
        let mut plan = draft().into_plan(Utc::now());
        assert!(plan.is_purchasable());
        plan.is_default = true;
        assert!(!plan.is_purchasable());
        plan.is_default = false;
        plan.price = Decimal::ZERO;
        assert!(!plan.is_purchasable());
        plan.price = Decimal::ONE;
        plan.is_active = false;
        assert!(!plan.is_purchasable());
    }

    #[test]
    fn draft_deserializes_with_default_active() {
        let json = r#"{
            "name": "Pro",
            "price": "49.00",
            "duration_days": 30,
            "benefits": [{"feature": "ai_suggestions", "usage_type": "consumable", "limit": 100}]
        }"#;
        let d: PlanDraft = serde_json::from_str(json).unwrap();
        assert!(d.is_active);
        assert_eq!(d.benefits[0].limit, 100);
    }
}
