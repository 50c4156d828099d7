//! Platform statistics: time windows, week-over-week arithmetic and the
//! report returned by `GET /api/admin/stats`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of creators in the leaderboard.
pub const TOP_CREATORS_LIMIT: usize = 5;
/// Number of categories in the leaderboard.
pub const TOP_CATEGORIES_LIMIT: usize = 5;

/// The instants every statistic is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub now: DateTime<Utc>,
    /// Start of the trailing 7-day window.
    pub week_start: DateTime<Utc>,
    /// Start of the trailing 30-day window used for the creator leaderboard.
    pub month_start: DateTime<Utc>,
}

impl TimeWindow {
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            week_start: now - Duration::days(7),
            month_start: now - Duration::days(30),
        }
    }
}

/// Relative change from `previous` to `current`, in percent, rounded to one
/// decimal.
///
/// With no previous activity the change is 100% if anything happened now and
/// 0% otherwise.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    let change = (current - previous) / previous.abs() * 100.0;
    (change * 10.0).round() / 10.0
}

/// Approximate count for the week before this one: everything that did not
/// happen this week.
pub fn prior_count(total: u64, this_week: u64) -> u64 {
    total.saturating_sub(this_week)
}

/// Counts for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub total: u64,
    pub this_week: u64,
    pub last_week: u64,
    /// Percent change from `last_week` to `this_week`.
    pub change: f64,
}

impl MetricSummary {
    pub fn from_counts(total: u64, this_week: u64) -> Self {
        let last_week = prior_count(total, this_week);
        Self {
            total,
            this_week,
            last_week,
            change: percent_change(this_week as f64, last_week as f64),
        }
    }
}

/// Token earnings summed across all users.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    pub total: f64,
    pub this_week: f64,
    /// `total - this_week`. Signed, since spends are negative amounts.
    pub before_this_week: f64,
    pub change: f64,
}

impl EarningsSummary {
    pub fn from_sums(total: f64, this_week: f64) -> Self {
        let before_this_week = total - this_week;
        Self {
            total,
            this_week,
            before_this_week,
            change: percent_change(this_week, before_this_week),
        }
    }
}

/// Aggregate blog engagement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub views: i64,
    pub likes: u64,
}

/// One row of the creator leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorRanking {
    pub user_id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub earnings: f64,
    pub transactions: u64,
}

/// Sort a leaderboard by earnings descending; ties by user id ascending.
pub fn rank_creators(creators: &mut [CreatorRanking]) {
    creators.sort_by(|a, b| {
        b.earnings
            .total_cmp(&a.earnings)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
}

/// One row of the category leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Sort categories by count descending; ties by name ascending.
pub fn rank_categories(categories: &mut [CategoryCount]) {
    categories.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });
}

/// Response body of `GET /api/admin/stats`.
///
/// Each figure comes from an independent query, so under concurrent writes
/// they may describe slightly different instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: MetricSummary,
    /// Users whose last login falls inside the trailing week.
    pub active_users: u64,
    pub posts: MetricSummary,
    pub blogs: MetricSummary,
    pub nfts: MetricSummary,
    pub engagement: Engagement,
    pub earnings: EarningsSummary,
    pub top_creators: Vec<CreatorRanking>,
    pub top_categories: Vec<CategoryCount>,
    pub generated_at: DateTime<Utc>,
}
