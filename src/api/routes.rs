use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    auth, calendar, collections, comments, dashboard, items, moderation, notifications, outfits,
    posts, subscriptions, taxonomy, users,
};
use crate::api::state::AppState;

/// Builds the full application router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config.frontend_url.as_deref());

    Router::new()
        .route("/health", get(auth::health_check))
        .merge(account_routes())
        .merge(wardrobe_routes())
        .merge(social_routes())
        .merge(billing_routes())
        .merge(admin_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/me", put(users::update_me))
        .route("/api/users/:id", get(users::get_profile))
        .route(
            "/api/users/:id/follow",
            post(users::follow).delete(users::unfollow),
        )
        .route("/api/users/:id/followers", get(users::followers))
        .route("/api/users/:id/following", get(users::following))
        .route("/api/users/:id/posts", get(posts::by_author))
        .route("/api/notifications", get(notifications::list))
        .route(
            "/api/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route("/api/devices", post(notifications::register_device))
        .route("/api/devices/:token", delete(notifications::remove_device))
        .route("/api/reports", post(moderation::create_report))
}

fn wardrobe_routes() -> Router<AppState> {
    Router::new()
        .route("/api/taxonomy/:kind", get(taxonomy::list))
        .route("/api/items", post(items::create).get(items::list))
        .route(
            "/api/items/:id",
            get(items::get).put(items::update).delete(items::delete),
        )
        .route("/api/outfits", post(outfits::create).get(outfits::list))
        .route("/api/outfits/suggestions", post(outfits::suggest))
        .route(
            "/api/outfits/:id",
            get(outfits::get).put(outfits::update).delete(outfits::delete),
        )
        .route("/api/calendar", get(calendar::list).post(calendar::create))
        .route(
            "/api/calendar/:id",
            put(calendar::update).delete(calendar::delete),
        )
}

fn social_routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", post(posts::create))
        .route("/api/posts/feed", get(posts::feed))
        .route("/api/posts/saved", get(posts::saved))
        .route("/api/posts/hashtag/:tag", get(posts::by_hashtag))
        .route(
            "/api/posts/:id",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route("/api/posts/:id/like", post(posts::like).delete(posts::unlike))
        .route("/api/posts/:id/save", post(posts::save).delete(posts::unsave))
        .route(
            "/api/posts/:id/comments",
            get(comments::list_post_comments).post(comments::create_post_comment),
        )
        .route(
            "/api/collections",
            post(collections::create).get(collections::list_published),
        )
        .route("/api/collections/mine", get(collections::list_mine))
        .route(
            "/api/collections/:id",
            get(collections::get)
                .put(collections::update)
                .delete(collections::delete),
        )
        .route("/api/collections/:id/publish", post(collections::publish))
        .route("/api/collections/:id/unpublish", post(collections::unpublish))
        .route(
            "/api/collections/:id/like",
            post(collections::like).delete(collections::unlike),
        )
        .route(
            "/api/collections/:id/save",
            post(collections::save).delete(collections::unsave),
        )
        .route(
            "/api/collections/:id/comments",
            get(comments::list_collection_comments).post(comments::create_collection_comment),
        )
        .route("/api/comments/:id", delete(comments::delete))
}

fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plans", get(subscriptions::list_plans))
        .route("/api/subscriptions/me", get(subscriptions::my_subscription))
        .route("/api/subscriptions/purchase", post(subscriptions::purchase))
        .route("/api/payments", get(subscriptions::list_payments))
        .route("/api/payments/webhook", post(subscriptions::webhook))
        .route("/api/payments/:id/cancel", post(subscriptions::cancel_payment))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(users::admin_list))
        .route("/api/admin/taxonomy/:kind", post(taxonomy::create))
        .route(
            "/api/admin/taxonomy/:kind/:id",
            put(taxonomy::update).delete(taxonomy::delete),
        )
        .route("/api/admin/notifications", post(notifications::broadcast))
        .route("/api/admin/plans", post(subscriptions::create_plan))
        .route(
            "/api/admin/plans/:id",
            put(subscriptions::update_plan).delete(subscriptions::delete_plan),
        )
        .route("/api/admin/reports", get(moderation::list_reports))
        .route(
            "/api/admin/reports/:id/resolve",
            post(moderation::resolve_report),
        )
        .route(
            "/api/admin/content/:target/:id/unhide",
            post(moderation::unhide),
        )
        .route("/api/admin/suspensions", get(moderation::list_suspensions))
        .route(
            "/api/admin/suspensions/:id",
            delete(moderation::lift_suspension),
        )
        .route("/api/admin/dashboard/overview", get(dashboard::overview))
        .route("/api/admin/dashboard/revenue", get(dashboard::revenue))
        .route("/api/admin/dashboard/plans", get(dashboard::plans))
        .route("/api/admin/dashboard/top-posts", get(dashboard::top_posts))
}

/// Restricts CORS to the frontend origin when one is configured
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("FRONTEND_URL is not a valid origin, allowing any origin");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}
