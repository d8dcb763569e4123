//! In-memory fakes for service tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::moderation::{Report, ReportStatus, ReportTarget, Suspension, Violation};
use crate::domain::notification::{DevicePlatform, Notification};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::{PaymentGateway, PushSender};
use crate::domain::repositories::{
    ModerationRepository, NotificationRepository, PaymentRepository, PlanRepository,
    ResolutionEffects, SubscriptionRepository,
};
use crate::domain::subscription::{
    plan_activation, Activation, BenefitLedger, BenefitLimit, Feature, GatewayStatus, Payment,
    PaymentStatus, Plan, SettlementOutcome, SubscriptionStatus, UserSubscription,
};

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let slice = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(slice, items.len() as i64, page)
}

#[derive(Default)]
pub struct MemoryNotifications {
    notifications: Mutex<Vec<Notification>>,
    devices: Mutex<HashMap<String, Uuid>>,
}

impl MemoryNotifications {
    pub fn stored(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotifications {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Notification>> {
        let mine: Vec<_> = self
            .stored()
            .into_iter()
            .rev()
            .filter(|n| n.user_id.map_or(true, |u| u == user_id))
            .collect();
        Ok(page_of(&mine, page))
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .stored()
            .iter()
            .filter(|n| n.user_id == Some(user_id) && !n.is_read)
            .count() as i64)
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut all = self.notifications.lock().unwrap();
        let n = all
            .iter_mut()
            .find(|n| n.id == id && n.user_id == Some(user_id))
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        n.is_read = true;
        Ok(())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut all = self.notifications.lock().unwrap();
        let mut count = 0;
        for n in all.iter_mut().filter(|n| n.user_id == Some(user_id) && !n.is_read) {
            n.is_read = true;
            count += 1;
        }
        Ok(count)
    }

    async fn upsert_device(&self, user_id: Uuid, token: &str, _platform: DevicePlatform) -> AppResult<()> {
        self.devices.lock().unwrap().insert(token.to_string(), user_id);
        Ok(())
    }

    async fn remove_device(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let mut devices = self.devices.lock().unwrap();
        if devices.get(token) == Some(&user_id) {
            devices.remove(token);
        }
        Ok(())
    }

    async fn device_tokens(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, owner)| **owner == user_id)
            .map(|(token, _)| token.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingPush {
    sent: Mutex<Vec<(Vec<String>, String)>>,
    fail: bool,
}

impl RecordingPush {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(Vec<String>, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, device_tokens: &[String], title: &str, _body: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::internal("push provider unavailable"));
        }
        if !device_tokens.is_empty() {
            self.sent
                .lock()
                .unwrap()
                .push((device_tokens.to_vec(), title.to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct BillingState {
    plans: Vec<Plan>,
    subscriptions: Vec<UserSubscription>,
    payments: Vec<Payment>,
    premium: HashSet<Uuid>,
}

impl BillingState {
    fn plan(&self, id: Uuid) -> AppResult<Plan> {
        self.plans
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Plan not found"))
    }

    fn default_plan(&self) -> AppResult<Plan> {
        self.plans
            .iter()
            .find(|p| p.is_default)
            .cloned()
            .ok_or_else(|| AppError::internal("Default plan is missing"))
    }

    /// Index of the user's active subscription, provisioning the default plan
    fn active(&mut self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<usize> {
        if let Some(i) = self
            .subscriptions
            .iter()
            .position(|s| s.user_id == user_id && s.is_active())
        {
            return Ok(i);
        }
        let plan = self.default_plan()?;
        let ledger = BenefitLedger::from_limits(&plan.benefits);
        self.subscriptions
            .push(UserSubscription::start(user_id, &plan, ledger, now));
        Ok(self.subscriptions.len() - 1)
    }

    fn apply(&mut self, activation: Activation) {
        match activation {
            Activation::Extend {
                subscription_id,
                end_date,
            } => {
                if let Some(sub) = self.subscriptions.iter_mut().find(|s| s.id == subscription_id) {
                    sub.end_date = Some(end_date);
                }
            }
            Activation::Replace { close, open } => {
                if let Some(id) = close {
                    if let Some(sub) = self.subscriptions.iter_mut().find(|s| s.id == id) {
                        sub.status = SubscriptionStatus::Cancelled;
                    }
                }
                self.subscriptions.push(open);
            }
        }
    }
}

/// Plans, subscriptions and payments sharing one store, as they share one database
pub struct MemoryBilling {
    state: Mutex<BillingState>,
    default_id: Uuid,
    premium_id: Uuid,
}

impl MemoryBilling {
    pub fn with_plans(
        free: Vec<BenefitLimit>,
        premium: Vec<BenefitLimit>,
        premium_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        let plan = |name: &str, benefits: Vec<BenefitLimit>, price: Decimal, is_default: bool| Plan {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price,
            duration_days: 30,
            benefits,
            is_default,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let free = plan("Free", free, Decimal::ZERO, true);
        let premium = plan("Premium", premium, premium_price, false);
        Self {
            default_id: free.id,
            premium_id: premium.id,
            state: Mutex::new(BillingState {
                plans: vec![free, premium],
                ..BillingState::default()
            }),
        }
    }

    pub fn default_id(&self) -> Uuid {
        self.default_id
    }

    pub fn premium_id(&self) -> Uuid {
        self.premium_id
    }

    pub fn is_premium(&self, user_id: Uuid) -> bool {
        self.state.lock().unwrap().premium.contains(&user_id)
    }
}

#[async_trait]
impl PlanRepository for MemoryBilling {
    async fn list_active(&self) -> AppResult<Vec<Plan>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .plans
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        Ok(self.state.lock().unwrap().plan(id).ok())
    }

    async fn default_plan(&self) -> AppResult<Plan> {
        self.state.lock().unwrap().default_plan()
    }

    async fn create(&self, plan: &Plan) -> AppResult<()> {
        self.state.lock().unwrap().plans.push(plan.clone());
        Ok(())
    }

    async fn update(&self, plan: &Plan) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .plans
            .iter_mut()
            .find(|p| p.id == plan.id)
            .ok_or_else(|| AppError::not_found("Plan not found"))?;
        *slot = plan.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.plans.len();
        state.plans.retain(|p| p.id != id || p.is_default);
        if state.plans.len() == before {
            return Err(AppError::not_found("Plan not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryBilling {
    async fn current(&self, user_id: Uuid) -> AppResult<(UserSubscription, Plan)> {
        let mut state = self.state.lock().unwrap();
        let i = state.active(user_id, Utc::now())?;
        let sub = state.subscriptions[i].clone();
        let plan = state.plan(sub.plan_id)?;
        Ok((sub, plan))
    }

    async fn consume(&self, user_id: Uuid, feature: Feature) -> AppResult<i32> {
        let mut state = self.state.lock().unwrap();
        let i = state.active(user_id, Utc::now())?;
        Ok(state.subscriptions[i].benefit_usage.consume(feature)?)
    }

    async fn release(&self, user_id: Uuid, feature: Feature) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let i = state.active(user_id, Utc::now())?;
        let plan = state.plan(state.subscriptions[i].plan_id)?;
        state.subscriptions[i]
            .benefit_usage
            .release(feature, &plan.benefits);
        Ok(())
    }

    async fn lapsed(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<UserSubscription>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|s| s.is_lapsed(now))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn expire(&self, subscription_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(i) = state
            .subscriptions
            .iter()
            .position(|s| s.id == subscription_id && s.is_lapsed(now))
        else {
            return Ok(false);
        };
        let old_plan = state.plan(state.subscriptions[i].plan_id)?;
        let default = state.default_plan()?;
        let ledger = state.subscriptions[i]
            .benefit_usage
            .rebase(&old_plan.benefits, &default.benefits);
        let user_id = state.subscriptions[i].user_id;
        state.subscriptions[i].status = SubscriptionStatus::Expired;
        state
            .subscriptions
            .push(UserSubscription::start(user_id, &default, ledger, now));
        state.premium.remove(&user_id);
        Ok(true)
    }
}

#[async_trait]
impl PaymentRepository for MemoryBilling {
    async fn create(&self, payment: &Payment) -> AppResult<()> {
        self.state.lock().unwrap().payments.push(payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_order_code(&self, order_code: i64) -> AppResult<Option<Payment>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.order_code == order_code)
            .cloned())
    }

    async fn find_open(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Payment>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.user_id == user_id && p.plan_id == plan_id && p.is_open(now))
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Payment>> {
        let mine: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(&mine, page))
    }

    async fn list_pending(&self, limit: i64) -> AppResult<Vec<Payment>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark(&self, id: Uuid, status: PaymentStatus) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.payments.iter_mut().find(|p| p.id == id) {
            Some(p) if p.status.can_transition_to(status) => {
                p.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn settle(&self, order_code: i64, now: DateTime<Utc>) -> AppResult<SettlementOutcome> {
        let mut state = self.state.lock().unwrap();
        let p = state
            .payments
            .iter()
            .position(|p| p.order_code == order_code)
            .ok_or_else(|| AppError::not_found("Payment not found"))?;
        match state.payments[p].status {
            PaymentStatus::Paid => return Ok(SettlementOutcome::AlreadySettled),
            PaymentStatus::Cancelled => return Err(AppError::bad_request("Payment was cancelled")),
            PaymentStatus::Pending | PaymentStatus::Expired => {}
        }

        let (user_id, plan_id) = (state.payments[p].user_id, state.payments[p].plan_id);
        let s = state.active(user_id, now)?;
        let current = state.subscriptions[s].clone();
        let current_plan = state.plan(current.plan_id)?;
        let target = state.plan(plan_id)?;
        let activation = plan_activation(user_id, Some((&current, &current_plan)), &target, now);
        state.apply(activation);
        state.premium.insert(user_id);
        state.payments[p].status = PaymentStatus::Paid;
        state.payments[p].paid_at = Some(now);
        Ok(SettlementOutcome::Activated { user_id, plan_id })
    }
}

#[derive(Default)]
pub struct StubGateway {
    statuses: Mutex<HashMap<i64, GatewayStatus>>,
    cancelled: Mutex<Vec<i64>>,
    down: Mutex<bool>,
}

impl StubGateway {
    /// Makes checkout creation fail until called again with `false`
    pub fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }

    pub fn set_status(&self, order_code: i64, status: GatewayStatus) {
        self.statuses.lock().unwrap().insert(order_code, status);
    }

    pub fn cancelled(&self) -> Vec<i64> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout(&self, payment: &Payment, _plan: &Plan) -> AppResult<String> {
        if *self.down.lock().unwrap() {
            return Err(AppError::internal("Payment provider unavailable"));
        }
        Ok(format!("https://pay.test/checkout/{}", payment.order_code))
    }

    async fn fetch_status(&self, order_code: i64) -> AppResult<GatewayStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&order_code)
            .copied()
            .unwrap_or(GatewayStatus::Pending))
    }

    async fn cancel_checkout(&self, order_code: i64) -> AppResult<()> {
        self.cancelled.lock().unwrap().push(order_code);
        Ok(())
    }
}

#[derive(Default)]
struct ModerationState {
    content: HashMap<Uuid, (ReportTarget, Uuid)>,
    hidden: HashSet<Uuid>,
    reports: Vec<Report>,
    violations: Vec<Violation>,
    suspensions: Vec<Suspension>,
}

#[derive(Default)]
pub struct MemoryModeration {
    state: Mutex<ModerationState>,
}

impl MemoryModeration {
    /// Registers reportable content; a user is its own owner
    pub fn add_content(&self, target: ReportTarget, owner: Uuid) -> Uuid {
        let id = if target == ReportTarget::User {
            owner
        } else {
            Uuid::new_v4()
        };
        self.state.lock().unwrap().content.insert(id, (target, owner));
        id
    }

    pub fn is_hidden(&self, id: Uuid) -> bool {
        self.state.lock().unwrap().hidden.contains(&id)
    }

    pub fn violations(&self, user_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .violations
            .iter()
            .filter(|v| v.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl ModerationRepository for MemoryModeration {
    async fn content_owner(&self, target: ReportTarget, id: Uuid) -> AppResult<Option<Uuid>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .content
            .get(&id)
            .filter(|(t, _)| *t == target)
            .map(|(_, owner)| *owner))
    }

    async fn create_report(&self, report: &Report) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let duplicate = state.reports.iter().any(|r| {
            r.reporter_id == report.reporter_id
                && r.target_id == report.target_id
                && r.status == ReportStatus::Pending
        });
        if duplicate {
            return Err(AppError::conflict(
                "You already have a pending report for this content",
            ));
        }
        state.reports.push(report.clone());
        Ok(())
    }

    async fn find_report(&self, id: Uuid) -> AppResult<Option<Report>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> AppResult<Page<Report>> {
        let matching: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .reports
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(page_of(&matching, page))
    }

    async fn close_report(&self, report: &Report, effects: &ResolutionEffects) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(idx) = state
            .reports
            .iter()
            .position(|r| r.id == report.id && r.status == ReportStatus::Pending)
        else {
            return Ok(false);
        };
        if let Some((_, id)) = effects.hide {
            if !state.content.contains_key(&id) {
                return Err(AppError::not_found("Reported content no longer exists"));
            }
            state.hidden.insert(id);
        }
        if let Some(suspension) = &effects.suspension {
            state.suspensions.push(suspension.clone());
        }
        if let Some(violation) = &effects.violation {
            state.violations.push(violation.clone());
        }
        state.reports[idx] = report.clone();
        Ok(true)
    }

    async fn set_hidden(&self, target: ReportTarget, id: Uuid, hidden: bool) -> AppResult<bool> {
        if target == ReportTarget::User {
            return Err(AppError::bad_request("Users cannot be hidden"));
        }
        let mut state = self.state.lock().unwrap();
        if !state.content.contains_key(&id) {
            return Ok(false);
        }
        if hidden {
            state.hidden.insert(id);
        } else {
            state.hidden.remove(&id);
        }
        Ok(true)
    }

    async fn count_violations_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .violations
            .iter()
            .filter(|v| v.user_id == user_id && v.created_at >= since)
            .count() as i64)
    }

    async fn create_suspension(&self, suspension: &Suspension) -> AppResult<()> {
        self.state.lock().unwrap().suspensions.push(suspension.clone());
        Ok(())
    }

    async fn active_suspension(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Suspension>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .suspensions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active(now))
            .max_by_key(|s| s.end_date)
            .cloned())
    }

    async fn list_active_suspensions(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> AppResult<Page<Suspension>> {
        let active: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .suspensions
            .iter()
            .filter(|s| s.is_active(now))
            .cloned()
            .collect();
        Ok(page_of(&active, page))
    }

    async fn lift_suspension(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state
            .suspensions
            .iter_mut()
            .find(|s| s.id == id && s.lifted_at.is_none())
        {
            Some(s) => {
                s.lifted_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
