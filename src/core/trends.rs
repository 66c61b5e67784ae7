//! Market trend reports.
//!
//! Style popularity and momentum, social platform growth, revenue growth and
//! projection, and correlation of internal trends with an external feed.

use crate::core::agent::Agent;
use crate::core::calc::{self, GrowthProjection, MonthlyRevenue};
use crate::core::capability::ExternalTrendSource;
use crate::core::insights::{Insight, InsightBus};
use crate::core::metrics::{self, PlatformActivity};
use crate::core::period::{Period, TimeWindow};
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument};

/// A style ranked by engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularStyle {
    /// Artwork style
    pub style: String,
    /// Views in the window
    pub views: i64,
    /// Likes in the window
    pub likes: i64,
    /// Completed purchases in the window
    pub purchases: i64,
    /// Weighted score, see [`calc::engagement_score`]
    pub engagement_score: i64,
}

/// Styles with the highest engagement score in the window, best first.
#[instrument(skip(db))]
pub async fn popular_styles(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<PopularStyle>> {
    let window = TimeWindow::ending_at(period, now);
    let mut styles: Vec<PopularStyle> = metrics::style_engagement(db, &window)
        .await?
        .into_iter()
        .map(|row| PopularStyle {
            engagement_score: row.score(),
            style: row.style,
            views: row.views,
            likes: row.likes,
            purchases: row.purchases,
        })
        .collect();

    styles.sort_by(|a, b| {
        b.engagement_score
            .cmp(&a.engagement_score)
            .then_with(|| a.style.cmp(&b.style))
    });
    styles.truncate(limit);
    Ok(styles)
}

/// A style selling more now than in the previous window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergingStyle {
    /// Artwork style
    pub style: String,
    /// Purchases in the current window
    pub current_purchases: i64,
    /// Purchases in the previous window
    pub previous_purchases: i64,
    /// Purchase growth in percent
    pub growth_percentage: f64,
}

/// Styles whose purchases grew, largest absolute gain first.
///
/// Each one is published on `bus` as a market trend insight.
#[instrument(skip(db, bus))]
pub async fn emerging_styles(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
    bus: &InsightBus,
) -> Result<Vec<EmergingStyle>> {
    let window = TimeWindow::ending_at(period, now);
    let mut styles: Vec<EmergingStyle> = metrics::style_purchase_trend(db, &window)
        .await?
        .into_iter()
        .filter(|row| row.current_purchases > row.previous_purchases)
        .map(|row| EmergingStyle {
            growth_percentage: calc::count_growth_percentage(
                row.current_purchases,
                row.previous_purchases,
            ),
            style: row.style,
            current_purchases: row.current_purchases,
            previous_purchases: row.previous_purchases,
        })
        .collect();

    styles.sort_by(|a, b| {
        (b.current_purchases - b.previous_purchases)
            .cmp(&(a.current_purchases - a.previous_purchases))
            .then_with(|| a.style.cmp(&b.style))
    });

    for style in &styles {
        bus.publish(
            Agent::Cloe,
            Insight::MarketTrend {
                style: style.style.clone(),
                current_purchases: style.current_purchases,
                previous_purchases: style.previous_purchases,
                growth_percentage: style.growth_percentage,
            },
        );
    }

    info!("Found {} emerging styles", styles.len());
    Ok(styles)
}

/// Growth of one social platform between the two windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformTrend {
    /// Raw counts of both windows
    #[serde(flatten)]
    pub activity: PlatformActivity,
    /// Share growth in percent
    pub share_growth: f64,
    /// Click growth in percent
    pub click_growth: f64,
    /// Engagement growth in percent
    pub engagement_growth: f64,
}

/// Share, click and engagement growth per platform, in percent.
#[instrument(skip(db))]
pub async fn platform_trends(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<Vec<PlatformTrend>> {
    let window = TimeWindow::ending_at(period, now);
    Ok(metrics::platform_activity(db, &window)
        .await?
        .into_iter()
        .map(|activity| PlatformTrend {
            share_growth: calc::count_growth_percentage(
                activity.current_shares,
                activity.previous_shares,
            ),
            click_growth: calc::count_growth_percentage(
                activity.current_clicks,
                activity.previous_clicks,
            ),
            engagement_growth: calc::count_growth_percentage(
                activity.current_engagement,
                activity.previous_engagement,
            ),
            activity,
        })
        .collect())
}

/// Monthly revenue history with its forward projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueProjection {
    /// Completed revenue per month, oldest first
    pub history: Vec<MonthlyRevenue>,
    /// Trend and projected months
    #[serde(flatten)]
    pub projection: GrowthProjection,
}

/// Projects completed revenue six months ahead.
#[instrument(skip(db))]
pub async fn revenue_projection(db: &DatabaseConnection) -> Result<RevenueProjection> {
    let history = metrics::monthly_revenue(db).await?;
    let projection = calc::growth_projection(&history);
    Ok(RevenueProjection {
        history,
        projection,
    })
}

/// Revenue of the current window against the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueGrowth {
    /// Window length
    pub period: Period,
    /// Revenue of the current window
    pub current_revenue: f64,
    /// Revenue of the previous window
    pub previous_revenue: f64,
    /// Relative change, see [`calc::growth_rate`]
    pub growth_rate: f64,
    /// Relative change in percent
    pub growth_percentage: f64,
}

/// Compares completed revenue across the two windows.
#[instrument(skip(db))]
pub async fn revenue_growth(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<RevenueGrowth> {
    let window = TimeWindow::ending_at(period, now);
    let revenue = metrics::window_revenue(db, &window).await?;
    Ok(RevenueGrowth {
        period,
        current_revenue: revenue.current,
        previous_revenue: revenue.previous,
        growth_rate: calc::growth_rate(revenue.current, revenue.previous),
        growth_percentage: calc::growth_percentage(revenue.current, revenue.previous),
    })
}

/// Completed revenue over an explicit date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueRange {
    /// Inclusive start
    pub from: DateTime<Utc>,
    /// Exclusive end
    pub to: DateTime<Utc>,
    /// Completed revenue in `[from, to)`
    pub total_revenue: f64,
}

/// Sums completed revenue with `from <= transaction_time < to`.
///
/// # Errors
/// Returns `Error::Validation` unless `from` is before `to`.
#[instrument(skip(db))]
pub async fn revenue_in_range(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<RevenueRange> {
    if from >= to {
        return Err(Error::Validation {
            message: format!("Revenue range start {from} must be before its end {to}"),
        });
    }
    Ok(RevenueRange {
        from,
        to,
        total_revenue: metrics::revenue_between(db, from, to).await?,
    })
}

/// Internal popular styles compared with an external feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendCorrelation {
    /// Name of the external feed
    pub source: String,
    /// Popular styles here, best first
    pub internal_styles: Vec<String>,
    /// Styles trending in the external feed
    pub external_styles: Vec<String>,
    /// Popular here and trending outside
    pub matching: Vec<String>,
    /// Trending outside but not popular here
    pub opportunities: Vec<String>,
}

/// Matches the window's popular styles against `source`.
///
/// Names are compared case-insensitively.
#[instrument(skip(db, source))]
pub async fn correlate_trends(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
    limit: usize,
    source: &dyn ExternalTrendSource,
) -> Result<TrendCorrelation> {
    let internal_styles: Vec<String> = popular_styles(db, period, now, limit)
        .await?
        .into_iter()
        .map(|style| style.style)
        .collect();
    let external_styles = source.trending_styles();

    let internal: HashSet<String> = internal_styles.iter().map(|s| s.to_lowercase()).collect();
    let external: HashSet<String> = external_styles.iter().map(|s| s.to_lowercase()).collect();

    let matching = internal_styles
        .iter()
        .filter(|style| external.contains(&style.to_lowercase()))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let opportunities = external_styles
        .iter()
        .filter(|style| {
            let key = style.to_lowercase();
            !internal.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect();

    Ok(TrendCorrelation {
        source: source.name().to_string(),
        internal_styles,
        external_styles,
        matching,
        opportunities,
    })
}

/// How closely price tracks interest within a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceInterest {
    /// Category analysed
    pub category: String,
    /// Artworks in the category
    pub sample_size: usize,
    /// Pearson correlation of price and view count, `0` when undefined
    pub correlation: f64,
}

/// Correlates artwork prices with their view counts.
#[instrument(skip(db))]
pub async fn price_interest_correlation(
    db: &DatabaseConnection,
    category: &str,
) -> Result<PriceInterest> {
    let pairs = metrics::price_view_pairs(db, category).await?;
    let prices: Vec<f64> = pairs.iter().map(|pair| pair.price).collect();
    #[allow(clippy::cast_precision_loss)]
    let views: Vec<f64> = pairs.iter().map(|pair| pair.views as f64).collect();

    Ok(PriceInterest {
        category: category.to_string(),
        sample_size: pairs.len(),
        correlation: calc::correlation(&prices, &views),
    })
}

/// Searches needed in the current window for a term to trend
pub const TRENDING_MIN_SEARCHES: i64 = 5;
/// Searches needed in the current window for an unseen term to be reported
pub const NEW_TERM_MIN_SEARCHES: i64 = 3;
/// Trending terms reported
pub const TRENDING_TERMS_LIMIT: usize = 30;
/// New terms reported
pub const NEW_TERMS_LIMIT: usize = 20;

/// A search term searched more often than in the previous window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingTerm {
    /// Lowercased search term
    pub term: String,
    /// Searches in the current window
    pub current_searches: i64,
    /// Searches in the previous window
    pub previous_searches: i64,
    /// Growth in percent, rounded to two decimals
    pub growth_rate: f64,
}

/// A search term nobody searched in the previous window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSearchTerm {
    /// Lowercased search term
    pub search_term: String,
    /// Searches in the current window
    pub search_count: i64,
}

/// Search terms gaining traction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchTrends {
    /// Terms seen before, largest absolute gain first
    pub trending: Vec<TrendingTerm>,
    /// Terms first seen in the current window, most searched first
    pub new_terms: Vec<NewSearchTerm>,
}

/// Reports rising and brand new search terms of the window.
///
/// A term trends with more than [`TRENDING_MIN_SEARCHES`] current searches and
/// at least one previous search. A term is new with more than
/// [`NEW_TERM_MIN_SEARCHES`] current searches and none before.
#[instrument(skip(db))]
pub async fn trending_search_terms(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<SearchTrends> {
    let window = TimeWindow::ending_at(period, now);
    let counts = metrics::search_term_counts(db, &window).await?;

    let mut trending: Vec<TrendingTerm> = counts
        .iter()
        .filter(|row| row.current_searches > TRENDING_MIN_SEARCHES && row.previous_searches > 0)
        .map(|row| TrendingTerm {
            term: row.term.clone(),
            current_searches: row.current_searches,
            previous_searches: row.previous_searches,
            growth_rate: round2(calc::count_growth_percentage(
                row.current_searches,
                row.previous_searches,
            )),
        })
        .collect();
    trending.sort_by(|a, b| {
        (b.current_searches - b.previous_searches)
            .cmp(&(a.current_searches - a.previous_searches))
            .then_with(|| a.term.cmp(&b.term))
    });
    trending.truncate(TRENDING_TERMS_LIMIT);

    let mut new_terms: Vec<NewSearchTerm> = counts
        .into_iter()
        .filter(|row| row.current_searches > NEW_TERM_MIN_SEARCHES && row.previous_searches == 0)
        .map(|row| NewSearchTerm {
            search_term: row.term,
            search_count: row.current_searches,
        })
        .collect();
    new_terms.sort_by(|a, b| {
        b.search_count
            .cmp(&a.search_count)
            .then_with(|| a.search_term.cmp(&b.search_term))
    });
    new_terms.truncate(NEW_TERMS_LIMIT);

    info!(
        "{} trending and {} new search terms",
        trending.len(),
        new_terms.len()
    );
    Ok(SearchTrends {
        trending,
        new_terms,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
