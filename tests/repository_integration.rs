//! Integration tests for repository layer
//!
//! These tests verify that repository implementations correctly interact
//! with PostgreSQL: unique emails, the benefit ledger under row locks,
//! idempotent payment settlement, the expiry sweep, per-user broadcast read
//! state and single-shot report resolution. Skipped when `DATABASE_URL` is unset.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use wardrobe_api::auth::password::hash_password;
use wardrobe_api::domain::errors::AppError;
use wardrobe_api::domain::moderation::{
    ReportDraft, ReportTarget, ResolutionAction, Suspension, Violation,
};
use wardrobe_api::domain::notification::{Notification, NotificationKind};
use wardrobe_api::domain::pagination::PageRequest;
use wardrobe_api::domain::repositories::{
    ModerationRepository, NotificationRepository, PaymentRepository, PlanRepository,
    ResolutionEffects, SubscriptionRepository, User, UserRepository,
};
use wardrobe_api::domain::subscription::{
    BenefitLimit, Feature, Payment, PaymentStatus, Plan, PlanDraft, SettlementOutcome,
};
use wardrobe_api::domain::user::{Email, Role};
use wardrobe_api::infrastructure::repositories::{
    PostgresModerationRepository, PostgresNotificationRepository, PostgresPaymentRepository,
    PostgresPlanRepository, PostgresSubscriptionRepository, PostgresUserRepository,
};

/// Set up a migrated test database, or None when DATABASE_URL is unset
async fn setup_test_db() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping repository test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

fn test_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: Email::new(email).expect("valid email"),
        password_hash: hash_password("testpass123").expect("hash password"),
        display_name: "Test User".to_string(),
        bio: None,
        avatar_url: None,
        role: Role::User,
        is_premium: false,
        job_id: None,
        style_ids: vec![],
        created_at: now,
        updated_at: now,
    }
}

/// Create a stored test user
async fn create_test_user(pool: &PgPool) -> User {
    let user = test_user(&format!("repo-{}@test.com", Uuid::new_v4()));
    PostgresUserRepository::new(pool.clone())
        .create(&user)
        .await
        .expect("Failed to create test user");
    user
}

/// Store an active paid plan with a unique name
async fn create_paid_plan(pool: &PgPool, duration_days: i32) -> Plan {
    let plan = PlanDraft {
        name: format!("Premium {}", Uuid::new_v4()),
        description: None,
        price: Decimal::new(2500, 2),
        duration_days,
        benefits: vec![BenefitLimit::new(Feature::WardrobeItems, 200)],
        is_active: true,
    }
    .into_plan(Utc::now());
    PostgresPlanRepository::new(pool.clone())
        .create(&plan)
        .await
        .expect("create plan");
    plan
}

#[tokio::test]
async fn test_user_repository_create_and_find_by_email() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let user_repo = PostgresUserRepository::new(pool.clone());
    let user = create_test_user(&pool).await;

    let found = user_repo
        .find_by_email(&user.email)
        .await
        .expect("Failed to find user")
        .expect("User not found");
    assert_eq!(found.id, user.id);
    assert_eq!(found.display_name, "Test User");
    assert_eq!(found.role, Role::User);

    let missing = user_repo
        .find_by_email(&Email::new("nobody-here@test.com").unwrap())
        .await
        .expect("lookup");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_user_repository_rejects_duplicate_email() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let user_repo = PostgresUserRepository::new(pool.clone());
    let user = create_test_user(&pool).await;

    let duplicate = test_user(user.email.as_str());
    let result = user_repo.create(&duplicate).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_free_plan_is_provisioned_and_metered() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let subscriptions = PostgresSubscriptionRepository::new(pool.clone());
    let user = create_test_user(&pool).await;

    let (subscription, plan) = subscriptions.current(user.id).await.expect("provision");
    assert!(plan.is_default);
    assert_eq!(subscription.plan_id, plan.id);
    let limit = plan.limit_for(Feature::Collections).expect("collections limit");

    for expected in (0..limit).rev() {
        let remaining = subscriptions
            .consume(user.id, Feature::Collections)
            .await
            .expect("consume");
        assert_eq!(remaining, expected);
    }
    let exhausted = subscriptions.consume(user.id, Feature::Collections).await;
    assert!(matches!(exhausted, Err(AppError::Forbidden(_))));

    // Persistent credit is released but never above the limit
    for _ in 0..limit + 2 {
        subscriptions
            .release(user.id, Feature::Collections)
            .await
            .expect("release");
    }
    let (subscription, _) = subscriptions.current(user.id).await.expect("current");
    assert_eq!(
        subscription.benefit_usage.credit(Feature::Collections),
        Some(limit)
    );
}

#[tokio::test]
async fn test_concurrent_consumption_never_overdraws() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let subscriptions = PostgresSubscriptionRepository::new(pool.clone());
    let user = create_test_user(&pool).await;
    let (_, plan) = subscriptions.current(user.id).await.expect("provision");
    let limit = plan.limit_for(Feature::AiSuggestions).expect("suggestion limit");

    let attempts = (0..limit + 3).map(|_| {
        let repo = PostgresSubscriptionRepository::new(pool.clone());
        let user_id = user.id;
        tokio::spawn(async move { repo.consume(user_id, Feature::AiSuggestions).await })
    });
    let mut succeeded = 0;
    for handle in attempts.collect::<Vec<_>>() {
        if handle.await.expect("join").is_ok() {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, limit);
}

#[tokio::test]
async fn test_payment_settle_activates_plan_once() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let plans = PostgresPlanRepository::new(pool.clone());
    let payments = PostgresPaymentRepository::new(pool.clone());
    let subscriptions = PostgresSubscriptionRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let user = create_test_user(&pool).await;

    let now = Utc::now();
    let plan = PlanDraft {
        name: format!("Premium {}", Uuid::new_v4()),
        description: Some("Integration premium".to_string()),
        price: Decimal::new(4900, 2),
        duration_days: 30,
        benefits: vec![BenefitLimit::new(Feature::WardrobeItems, 500)],
        is_active: true,
    }
    .into_plan(now);
    plans.create(&plan).await.expect("create plan");

    let payment = Payment::open(user.id, &plan, Duration::minutes(15), now);
    payments.create(&payment).await.expect("create payment");

    let outcome = payments
        .settle(payment.order_code, now)
        .await
        .expect("settle");
    assert_eq!(
        outcome,
        SettlementOutcome::Activated {
            user_id: user.id,
            plan_id: plan.id
        }
    );

    // A second confirmation changes nothing
    let again = payments
        .settle(payment.order_code, now)
        .await
        .expect("settle again");
    assert_eq!(again, SettlementOutcome::AlreadySettled);

    let stored = payments
        .find_by_id(payment.id)
        .await
        .expect("lookup")
        .expect("payment exists");
    assert_eq!(stored.status, PaymentStatus::Paid);

    let (subscription, current_plan) = subscriptions.current(user.id).await.expect("current");
    assert_eq!(current_plan.id, plan.id);
    // Postgres keeps microseconds only
    let end_date = subscription.end_date.expect("paid plans end");
    let drift = (end_date - (now + Duration::days(30))).num_milliseconds().abs();
    assert!(drift < 1000, "unexpected end date {}", end_date);

    let refreshed = users.find_by_id(user.id).await.expect("lookup").unwrap();
    assert!(refreshed.is_premium);
}

#[tokio::test]
async fn test_cancelled_payment_cannot_settle() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let payments = PostgresPaymentRepository::new(pool.clone());
    let plans = PostgresPlanRepository::new(pool.clone());
    let user = create_test_user(&pool).await;

    let now = Utc::now();
    let plan = PlanDraft {
        name: format!("Premium {}", Uuid::new_v4()),
        description: None,
        price: Decimal::new(1000, 2),
        duration_days: 7,
        benefits: vec![],
        is_active: true,
    }
    .into_plan(now);
    plans.create(&plan).await.expect("create plan");

    let payment = Payment::open(user.id, &plan, Duration::minutes(15), now);
    payments.create(&payment).await.expect("create payment");
    assert!(payments
        .mark(payment.id, PaymentStatus::Cancelled)
        .await
        .expect("cancel"));

    let result = payments.settle(payment.order_code, now).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_mark_only_moves_pending_payments() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let payments = PostgresPaymentRepository::new(pool.clone());
    let user = create_test_user(&pool).await;
    let plan = create_paid_plan(&pool, 30).await;

    let payment = Payment::open(user.id, &plan, Duration::minutes(15), Utc::now());
    payments.create(&payment).await.expect("create payment");

    // Pending to pending is not a transition
    assert!(!payments
        .mark(payment.id, PaymentStatus::Pending)
        .await
        .expect("mark pending"));
    assert!(payments
        .mark(payment.id, PaymentStatus::Expired)
        .await
        .expect("expire"));
    assert!(!payments
        .mark(payment.id, PaymentStatus::Cancelled)
        .await
        .expect("cancel expired"));

    let stored = payments
        .find_by_id(payment.id)
        .await
        .expect("lookup")
        .expect("payment exists");
    assert_eq!(stored.status, PaymentStatus::Expired);
}

#[tokio::test]
async fn test_expire_returns_user_to_default_plan() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let payments = PostgresPaymentRepository::new(pool.clone());
    let subscriptions = PostgresSubscriptionRepository::new(pool.clone());
    let users = PostgresUserRepository::new(pool.clone());
    let user = create_test_user(&pool).await;
    let plan = create_paid_plan(&pool, 30).await;

    // Paid 31 days ago, so the 30 day plan has run out
    let now = Utc::now();
    let paid_at = now - Duration::days(31);
    let payment = Payment::open(user.id, &plan, Duration::minutes(15), paid_at);
    payments.create(&payment).await.expect("create payment");
    payments.settle(payment.order_code, paid_at).await.expect("settle");
    subscriptions
        .consume(user.id, Feature::WardrobeItems)
        .await
        .expect("consume");

    let (lapsed, current_plan) = subscriptions.current(user.id).await.expect("current");
    assert_eq!(current_plan.id, plan.id);
    assert!(lapsed.is_lapsed(now));

    assert!(subscriptions.expire(lapsed.id, now).await.expect("expire"));
    // A second sweep finds nothing to do
    assert!(!subscriptions.expire(lapsed.id, now).await.expect("expire again"));

    let (fallback, fallback_plan) = subscriptions.current(user.id).await.expect("current");
    assert!(fallback_plan.is_default);
    assert_ne!(fallback.id, lapsed.id);
    assert_eq!(fallback.end_date, None);
    // The used wardrobe slot carries over to the free plan
    let free_limit = fallback_plan
        .limit_for(Feature::WardrobeItems)
        .expect("wardrobe limit");
    assert_eq!(
        fallback.benefit_usage.credit(Feature::WardrobeItems),
        Some(free_limit - 1)
    );

    let refreshed = users.find_by_id(user.id).await.expect("lookup").unwrap();
    assert!(!refreshed.is_premium);
}

#[tokio::test]
async fn test_broadcast_read_state_is_per_user() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let notifications = PostgresNotificationRepository::new(pool.clone());
    let reader = create_test_user(&pool).await;
    let other = create_test_user(&pool).await;

    let broadcast = Notification::broadcast("Maintenance", "Back in ten minutes");
    notifications.insert(&broadcast).await.expect("insert broadcast");
    let personal = Notification::personal(
        reader.id,
        NotificationKind::Follow,
        "New follower",
        "Someone followed you",
        None,
    );
    notifications.insert(&personal).await.expect("insert personal");

    let reader_before = notifications.unread_count(reader.id).await.expect("count");
    let other_before = notifications.unread_count(other.id).await.expect("count");

    notifications
        .mark_read(reader.id, broadcast.id)
        .await
        .expect("mark broadcast");
    assert_eq!(
        notifications.unread_count(reader.id).await.expect("count"),
        reader_before - 1
    );
    // Another user's copy of the broadcast stays unread
    assert_eq!(
        notifications.unread_count(other.id).await.expect("count"),
        other_before
    );
    let page = notifications
        .list_for_user(other.id, PageRequest::new(1, 100))
        .await
        .expect("list");
    let seen = page
        .items
        .iter()
        .find(|n| n.id == broadcast.id)
        .expect("broadcast visible");
    assert!(!seen.is_read);
    assert!(page.items.iter().all(|n| n.id != personal.id));

    // Personal notifications of one user cannot be marked by another
    let err = notifications.mark_read(other.id, personal.id).await;
    assert!(matches!(err, Err(AppError::NotFound(_))));

    notifications.mark_all_read(reader.id).await.expect("mark all");
    assert_eq!(notifications.unread_count(reader.id).await.expect("count"), 0);
    assert_eq!(
        notifications.unread_count(other.id).await.expect("count"),
        other_before
    );
}

#[tokio::test]
async fn test_report_can_only_be_closed_once() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let moderation = PostgresModerationRepository::new(pool.clone());
    let reporter = create_test_user(&pool).await;
    let offender = create_test_user(&pool).await;
    let admin = create_test_user(&pool).await;
    let now = Utc::now();

    let mut report = ReportDraft {
        target_type: ReportTarget::User,
        target_id: offender.id,
        reason: "harassment".to_string(),
    }
    .into_report(reporter.id, offender.id, now)
    .expect("valid report");
    moderation.create_report(&report).await.expect("create report");

    report
        .close(ResolutionAction::SuspendUser, admin.id, None, now)
        .expect("close");
    let effects = ResolutionEffects {
        hide: None,
        suspension: Some(Suspension::new(offender.id, "harassment", 3, Some(admin.id), now)),
        violation: Some(Violation::new(offender.id, Some(report.id), "harassment")),
    };

    let attempts = (0..2).map(|_| {
        let repo = PostgresModerationRepository::new(pool.clone());
        let (report, effects) = (report.clone(), effects.clone());
        tokio::spawn(async move { repo.close_report(&report, &effects).await })
    });
    let mut claimed = 0;
    for handle in attempts.collect::<Vec<_>>() {
        if handle.await.expect("join").expect("close report") {
            claimed += 1;
        }
    }
    assert_eq!(claimed, 1);

    let violations = moderation
        .count_violations_since(offender.id, now - Duration::hours(1))
        .await
        .expect("count violations");
    assert_eq!(violations, 1);
    assert!(moderation
        .active_suspension(offender.id, now)
        .await
        .expect("suspension lookup")
        .is_some());

    let stored = moderation
        .find_report(report.id)
        .await
        .expect("lookup")
        .expect("report exists");
    assert_eq!(stored.resolved_by, Some(admin.id));
}
