use chrono::Utc;

use crate::auth::AdminUser;
use crate::db::repository::{Entity, StatsRepository};
use crate::error::AppError;
use crate::stats::{
    AdminStats, EarningsSummary, MetricSummary, TimeWindow, TOP_CATEGORIES_LIMIT,
    TOP_CREATORS_LIMIT,
};

/// Core stats aggregation, separated from the HTTP layer for testability.
///
/// Every query is issued concurrently. The first failure aborts the rest and
/// is reported as `ServiceUnavailable`; no placeholder figures are produced.
pub async fn collect_stats(
    repo: &dyn StatsRepository,
    window: TimeWindow,
) -> Result<AdminStats, AppError> {
    let week = Some(window.week_start);

    let (
        (users_total, users_week),
        (posts_total, posts_week),
        (blogs_total, blogs_week),
        (nfts_total, nfts_week),
        active_users,
        (earnings_total, earnings_week),
        engagement,
        top_creators,
        top_categories,
    ) = tokio::try_join!(
        async { tokio::try_join!(repo.count(Entity::Users, None), repo.count(Entity::Users, week)) },
        async { tokio::try_join!(repo.count(Entity::Posts, None), repo.count(Entity::Posts, week)) },
        async { tokio::try_join!(repo.count(Entity::Blogs, None), repo.count(Entity::Blogs, week)) },
        async { tokio::try_join!(repo.count(Entity::Nfts, None), repo.count(Entity::Nfts, week)) },
        repo.count_active_users(window.week_start),
        async { tokio::try_join!(repo.sum_earnings(None), repo.sum_earnings(week)) },
        repo.blog_engagement(),
        repo.top_creators(window.month_start, TOP_CREATORS_LIMIT),
        repo.top_categories(TOP_CATEGORIES_LIMIT),
    )
    .map_err(|e| match e {
        AppError::ServiceUnavailable(msg) => AppError::ServiceUnavailable(msg),
        other => AppError::ServiceUnavailable(other.to_string()),
    })?;

    Ok(AdminStats {
        users: MetricSummary::from_counts(users_total, users_week),
        active_users,
        posts: MetricSummary::from_counts(posts_total, posts_week),
        blogs: MetricSummary::from_counts(blogs_total, blogs_week),
        nfts: MetricSummary::from_counts(nfts_total, nfts_week),
        engagement,
        earnings: EarningsSummary::from_sums(earnings_total, earnings_week),
        top_creators,
        top_categories,
        generated_at: window.now,
    })
}

/// Axum handler for `GET /api/admin/stats`.
pub async fn stats_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    AdminUser(admin): AdminUser,
) -> Result<axum::Json<AdminStats>, AppError> {
    let window = TimeWindow::ending_at(Utc::now());

    let stats = collect_stats(state.stats_repo.as_ref(), window)
        .await
        .inspect_err(|e| {
            tracing::error!(admin = %admin.user_id, "Failed to collect admin stats: {e}")
        })?;

    Ok(axum::Json(stats))
}

/// Fallback for any method other than GET on an admin route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
