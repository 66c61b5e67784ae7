//! Metric extraction.
//!
//! Read-only aggregate queries over the marketplace tables. Grouped
//! aggregates use raw SQL decoded into `FromQueryResult` rows; everything is
//! scoped by a [`TimeWindow`] where a window applies. Empty result sets come
//! back as empty vectors or zeroed counts.

use crate::core::brackets::{CartPriceRange, PriceBracket};
use crate::core::calc::{self, MonthlyRevenue};
use crate::core::period::TimeWindow;
use crate::entities::transaction::STATUS_COMPLETED;
use crate::errors::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement, Value};
use serde::Serialize;
use tracing::{debug, instrument, warn};

fn statement(db: &DatabaseConnection, sql: &str, values: Vec<Value>) -> Statement {
    Statement::from_sql_and_values(db.get_database_backend(), sql, values)
}

/// Views, likes and purchases of one style inside the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct StyleEngagement {
    /// Artwork style
    pub style: String,
    /// Views in the window
    pub views: i64,
    /// Likes in the window
    pub likes: i64,
    /// Completed purchases in the window
    pub purchases: i64,
}

impl StyleEngagement {
    /// Weighted engagement score of the style
    #[must_use]
    pub const fn score(&self) -> i64 {
        calc::engagement_score(self.views, self.likes, self.purchases)
    }
}

/// Counts views, likes and completed purchases per style in the current window.
///
/// Styles with no activity at all are omitted.
#[instrument(skip(db))]
pub async fn style_engagement(
    db: &DatabaseConnection,
    window: &TimeWindow,
) -> Result<Vec<StyleEngagement>> {
    let sql = "SELECT style, SUM(views) AS views, SUM(likes) AS likes, SUM(purchases) AS purchases \
        FROM ( \
            SELECT a.style AS style, \
                (SELECT COUNT(*) FROM artwork_views v \
                    WHERE v.artwork_id = a.id AND v.viewed_at >= ? AND v.viewed_at <= ?) AS views, \
                (SELECT COUNT(*) FROM artwork_likes l \
                    WHERE l.artwork_id = a.id AND l.liked_at >= ? AND l.liked_at <= ?) AS likes, \
                (SELECT COUNT(*) FROM transactions t \
                    WHERE t.artwork_id = a.id AND t.status = ? \
                    AND t.transaction_time >= ? AND t.transaction_time <= ?) AS purchases \
            FROM artworks a \
        ) \
        GROUP BY style \
        HAVING SUM(views) + SUM(likes) + SUM(purchases) > 0 \
        ORDER BY style";

    let (start, end) = (window.current_start, window.now);
    let rows = StyleEngagement::find_by_statement(statement(
        db,
        sql,
        vec![
            start.into(),
            end.into(),
            start.into(),
            end.into(),
            STATUS_COMPLETED.into(),
            start.into(),
            end.into(),
        ],
    ))
    .all(db)
    .await?;

    debug!("Extracted engagement for {} styles", rows.len());
    Ok(rows)
}

/// Completed purchases of one style in the current and previous windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct StylePurchaseTrend {
    /// Artwork style
    pub style: String,
    /// Purchases in the current window
    pub current_purchases: i64,
    /// Purchases in the previous window
    pub previous_purchases: i64,
}

/// Compares completed purchases per style across the two windows.
#[instrument(skip(db))]
pub async fn style_purchase_trend(
    db: &DatabaseConnection,
    window: &TimeWindow,
) -> Result<Vec<StylePurchaseTrend>> {
    let sql = "SELECT style, SUM(cur) AS current_purchases, SUM(1 - cur) AS previous_purchases \
        FROM ( \
            SELECT a.style AS style, \
                CASE WHEN t.transaction_time >= ? THEN 1 ELSE 0 END AS cur \
            FROM transactions t JOIN artworks a ON a.id = t.artwork_id \
            WHERE t.status = ? AND t.transaction_time >= ? AND t.transaction_time <= ? \
        ) \
        GROUP BY style \
        ORDER BY style";

    let rows = StylePurchaseTrend::find_by_statement(statement(
        db,
        sql,
        vec![
            window.current_start.into(),
            STATUS_COMPLETED.into(),
            window.previous_start.into(),
            window.now.into(),
        ],
    ))
    .all(db)
    .await?;

    Ok(rows)
}

/// Artworks considered by a bracket conversion query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketScope {
    /// Every artwork in a category
    Category(String),
    /// Every artwork of an artist
    Artist(i64),
}

/// Lifetime views and completed purchases for one price bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketConversion {
    /// Price bracket
    pub bracket: PriceBracket,
    /// Artworks priced in the bracket
    pub artworks: i64,
    /// Lifetime views of those artworks
    pub views: i64,
    /// Lifetime completed purchases of those artworks
    pub purchases: i64,
}

impl BracketConversion {
    /// Purchases per view, as a percentage
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        calc::conversion_rate(self.purchases, self.views)
    }
}

#[derive(Debug, FromQueryResult)]
struct BracketRow {
    bracket: String,
    artworks: i64,
    views: i64,
    purchases: i64,
}

/// Groups the scoped artworks by price bracket, ordered by bracket.
#[instrument(skip(db))]
pub async fn bracket_conversions(
    db: &DatabaseConnection,
    scope: &BracketScope,
) -> Result<Vec<BracketConversion>> {
    let (filter, scope_value): (&str, Value) = match scope {
        BracketScope::Category(category) => ("a.category = ?", category.clone().into()),
        BracketScope::Artist(artist_id) => ("a.artist_id = ?", (*artist_id).into()),
    };

    let sql = format!(
        "SELECT bracket, COUNT(*) AS artworks, SUM(views) AS views, SUM(purchases) AS purchases \
        FROM ( \
            SELECT {case} AS bracket, \
                (SELECT COUNT(*) FROM artwork_views v WHERE v.artwork_id = a.id) AS views, \
                (SELECT COUNT(*) FROM transactions t \
                    WHERE t.artwork_id = a.id AND t.status = ?) AS purchases \
            FROM artworks a \
            WHERE {filter} \
        ) \
        GROUP BY bracket",
        case = PriceBracket::SQL_CASE,
    );

    let rows = BracketRow::find_by_statement(statement(
        db,
        &sql,
        vec![STATUS_COMPLETED.into(), scope_value],
    ))
    .all(db)
    .await?;

    let mut conversions: Vec<BracketConversion> = rows
        .into_iter()
        .filter_map(|row| {
            let bracket = PriceBracket::from_key(&row.bracket)?;
            Some(BracketConversion {
                bracket,
                artworks: row.artworks,
                views: row.views,
                purchases: row.purchases,
            })
        })
        .collect();
    conversions.sort_by_key(|conversion| conversion.bracket);

    Ok(conversions)
}

/// Raw purchase funnel counts for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, FromQueryResult)]
pub struct FunnelCounts {
    /// Artwork views
    pub views: i64,
    /// Carts created
    pub cart_additions: i64,
    /// Carts converted to an order
    pub purchases: i64,
}

/// Counts views, cart additions and converted carts in the current window.
#[instrument(skip(db))]
pub async fn funnel_counts(db: &DatabaseConnection, window: &TimeWindow) -> Result<FunnelCounts> {
    let sql = "SELECT \
            (SELECT COUNT(*) FROM artwork_views WHERE viewed_at >= ? AND viewed_at <= ?) AS views, \
            (SELECT COUNT(*) FROM carts WHERE created_at >= ? AND created_at <= ?) AS cart_additions, \
            (SELECT COUNT(*) FROM carts WHERE created_at >= ? AND created_at <= ? \
                AND converted_to_order = 1) AS purchases";

    let (start, end) = (window.current_start, window.now);
    let counts = FunnelCounts::find_by_statement(statement(
        db,
        sql,
        vec![
            start.into(),
            end.into(),
            start.into(),
            end.into(),
            start.into(),
            end.into(),
        ],
    ))
    .one(db)
    .await?
    .unwrap_or_default();

    Ok(counts)
}

/// Cart totals for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, FromQueryResult)]
pub struct CartCounts {
    /// Carts created
    pub total: i64,
    /// Carts abandoned
    pub abandoned: i64,
    /// Abandoned carts that were later recovered
    pub recovered: i64,
}

/// Counts created, abandoned and recovered carts in the current window.
#[instrument(skip(db))]
pub async fn cart_counts(db: &DatabaseConnection, window: &TimeWindow) -> Result<CartCounts> {
    let sql = "SELECT COUNT(*) AS total, \
            COALESCE(SUM(CASE WHEN abandoned = 1 THEN 1 ELSE 0 END), 0) AS abandoned, \
            COALESCE(SUM(CASE WHEN abandoned = 1 AND recovered = 1 THEN 1 ELSE 0 END), 0) AS recovered \
        FROM carts \
        WHERE created_at >= ? AND created_at <= ?";

    let counts = CartCounts::find_by_statement(statement(
        db,
        sql,
        vec![window.current_start.into(), window.now.into()],
    ))
    .one(db)
    .await?
    .unwrap_or_default();

    Ok(counts)
}

/// Cart outcomes for one cart-total range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartRangeCounts {
    /// Cart total range
    pub range: CartPriceRange,
    /// Carts created
    pub total: i64,
    /// Carts converted to an order
    pub purchased: i64,
    /// Carts abandoned
    pub abandoned: i64,
}

#[derive(Debug, FromQueryResult)]
struct CartRangeRow {
    price_range: String,
    total: i64,
    purchased: i64,
    abandoned: i64,
}

/// Groups the current window's carts by cart-total range, ordered by range.
#[instrument(skip(db))]
pub async fn cart_range_counts(
    db: &DatabaseConnection,
    window: &TimeWindow,
) -> Result<Vec<CartRangeCounts>> {
    let sql = format!(
        "SELECT {case} AS price_range, COUNT(*) AS total, \
            SUM(CASE WHEN converted_to_order = 1 THEN 1 ELSE 0 END) AS purchased, \
            SUM(CASE WHEN abandoned = 1 THEN 1 ELSE 0 END) AS abandoned \
        FROM carts \
        WHERE created_at >= ? AND created_at <= ? \
        GROUP BY price_range",
        case = CartPriceRange::SQL_CASE,
    );

    let rows = CartRangeRow::find_by_statement(statement(
        db,
        &sql,
        vec![window.current_start.into(), window.now.into()],
    ))
    .all(db)
    .await?;

    let mut ranges: Vec<CartRangeCounts> = rows
        .into_iter()
        .filter_map(|row| {
            Some(CartRangeCounts {
                range: CartPriceRange::from_key(&row.price_range)?,
                total: row.total,
                purchased: row.purchased,
                abandoned: row.abandoned,
            })
        })
        .collect();
    ranges.sort_by_key(|range| range.range);

    Ok(ranges)
}

/// Social sharing activity of one platform in both windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PlatformActivity {
    /// Social platform name
    pub platform: String,
    /// Shares in the current window
    pub current_shares: i64,
    /// Shares in the previous window
    pub previous_shares: i64,
    /// Clicks in the current window
    pub current_clicks: i64,
    /// Clicks in the previous window
    pub previous_clicks: i64,
    /// Engagement in the current window
    pub current_engagement: i64,
    /// Engagement in the previous window
    pub previous_engagement: i64,
}

/// Sums shares, clicks and engagement per platform across the two windows.
#[instrument(skip(db))]
pub async fn platform_activity(
    db: &DatabaseConnection,
    window: &TimeWindow,
) -> Result<Vec<PlatformActivity>> {
    let sql = "SELECT platform, \
            SUM(cur) AS current_shares, \
            SUM(1 - cur) AS previous_shares, \
            SUM(cur * click_count) AS current_clicks, \
            SUM((1 - cur) * click_count) AS previous_clicks, \
            SUM(cur * engagement_count) AS current_engagement, \
            SUM((1 - cur) * engagement_count) AS previous_engagement \
        FROM ( \
            SELECT platform, click_count, engagement_count, \
                CASE WHEN shared_at >= ? THEN 1 ELSE 0 END AS cur \
            FROM social_shares \
            WHERE shared_at >= ? AND shared_at <= ? \
        ) \
        GROUP BY platform \
        ORDER BY platform";

    let rows = PlatformActivity::find_by_statement(statement(
        db,
        sql,
        vec![
            window.current_start.into(),
            window.previous_start.into(),
            window.now.into(),
        ],
    ))
    .all(db)
    .await?;

    Ok(rows)
}

#[derive(Debug, FromQueryResult)]
struct MonthRow {
    month: String,
    total_revenue: f64,
}

/// Completed revenue per calendar month, oldest first.
#[instrument(skip(db))]
pub async fn monthly_revenue(db: &DatabaseConnection) -> Result<Vec<MonthlyRevenue>> {
    let sql = "SELECT substr(transaction_time, 1, 7) AS month, \
            CAST(SUM(amount) AS REAL) AS total_revenue \
        FROM transactions \
        WHERE status = ? \
        GROUP BY month \
        ORDER BY month";

    let rows = MonthRow::find_by_statement(statement(db, sql, vec![STATUS_COMPLETED.into()]))
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            NaiveDate::parse_from_str(&format!("{}-01", row.month), "%Y-%m-%d")
                .inspect_err(|e| warn!("Skipping unreadable revenue month {}: {}", row.month, e))
                .ok()
                .map(|month| MonthlyRevenue {
                    month,
                    total_revenue: row.total_revenue,
                })
        })
        .collect())
}

/// Price and lifetime view count of one artwork.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, FromQueryResult)]
pub struct PriceViews {
    /// Listing price
    pub price: f64,
    /// Lifetime views
    pub views: i64,
}

/// Price and view count for every artwork in a category.
#[instrument(skip(db))]
pub async fn price_view_pairs(db: &DatabaseConnection, category: &str) -> Result<Vec<PriceViews>> {
    let sql = "SELECT CAST(a.price AS REAL) AS price, \
            (SELECT COUNT(*) FROM artwork_views v WHERE v.artwork_id = a.id) AS views \
        FROM artworks a \
        WHERE a.category = ? \
        ORDER BY a.id";

    let rows = PriceViews::find_by_statement(statement(db, sql, vec![category.into()]))
        .all(db)
        .await?;

    Ok(rows)
}

/// Lifetime price of one artwork with its category.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct CategoryPrice {
    /// Category the artwork is listed in
    pub category: String,
    /// Listing price
    pub price: f64,
}

/// Every listing price, grouped by category in ascending price order.
#[instrument(skip(db))]
pub async fn category_prices(db: &DatabaseConnection) -> Result<Vec<CategoryPrice>> {
    let sql = "SELECT category, CAST(price AS REAL) AS price \
        FROM artworks \
        ORDER BY category, price";

    let rows = CategoryPrice::find_by_statement(statement(db, sql, vec![]))
        .all(db)
        .await?;

    Ok(rows)
}

/// Sharing and view totals of one artwork inside the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct ArtworkSharing {
    /// Shared artwork
    pub artwork_id: i64,
    /// Artwork title
    pub title: String,
    /// Name of the artist, empty when the artist row is gone
    pub artist_name: String,
    /// Views in the window
    pub views: i64,
    /// Shares in the window
    pub shares: i64,
    /// Clicks brought in by those shares
    pub clicks: i64,
    /// Engagement on those shares
    pub engagement: i64,
}

/// Artworks shared at least once in the current window with more than
/// `min_views` views there, ordered by artwork id.
#[instrument(skip(db))]
pub async fn artwork_sharing(
    db: &DatabaseConnection,
    window: &TimeWindow,
    min_views: i64,
) -> Result<Vec<ArtworkSharing>> {
    let sql = "SELECT * FROM ( \
            SELECT a.id AS artwork_id, a.title AS title, \
                COALESCE(ar.name, '') AS artist_name, \
                (SELECT COUNT(*) FROM artwork_views v \
                    WHERE v.artwork_id = a.id AND v.viewed_at >= ? AND v.viewed_at <= ?) AS views, \
                s.shares AS shares, s.clicks AS clicks, s.engagement AS engagement \
            FROM ( \
                SELECT artwork_id, COUNT(*) AS shares, \
                    SUM(click_count) AS clicks, SUM(engagement_count) AS engagement \
                FROM social_shares \
                WHERE shared_at >= ? AND shared_at <= ? \
                GROUP BY artwork_id \
            ) s \
            JOIN artworks a ON a.id = s.artwork_id \
            LEFT JOIN artists ar ON ar.id = a.artist_id \
        ) \
        WHERE views > ? \
        ORDER BY artwork_id";

    let (start, end) = (window.current_start, window.now);
    let rows = ArtworkSharing::find_by_statement(statement(
        db,
        sql,
        vec![
            start.into(),
            end.into(),
            start.into(),
            end.into(),
            min_views.into(),
        ],
    ))
    .all(db)
    .await?;

    debug!("Found {} shared artworks above {} views", rows.len(), min_views);
    Ok(rows)
}

/// Sharing totals of one platform inside the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PlatformShareTotals {
    /// Social platform name
    pub platform: String,
    /// Shares on the platform
    pub share_count: i64,
    /// Distinct artworks shared
    pub artwork_count: i64,
    /// Distinct users who shared
    pub user_count: i64,
    /// Clicks brought in
    pub click_count: i64,
    /// Engagement received
    pub engagement_count: i64,
}

/// Sums sharing per platform in the current window, busiest platform first.
#[instrument(skip(db))]
pub async fn platform_share_totals(
    db: &DatabaseConnection,
    window: &TimeWindow,
) -> Result<Vec<PlatformShareTotals>> {
    let sql = "SELECT platform, COUNT(*) AS share_count, \
            COUNT(DISTINCT artwork_id) AS artwork_count, \
            COUNT(DISTINCT user_id) AS user_count, \
            SUM(click_count) AS click_count, \
            SUM(engagement_count) AS engagement_count \
        FROM social_shares \
        WHERE shared_at >= ? AND shared_at <= ? \
        GROUP BY platform \
        ORDER BY share_count DESC, platform";

    let rows = PlatformShareTotals::find_by_statement(statement(
        db,
        sql,
        vec![window.current_start.into(), window.now.into()],
    ))
    .all(db)
    .await?;

    Ok(rows)
}

/// Sharing totals of one artwork across every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct SharedArtwork {
    /// Shared artwork
    pub artwork_id: i64,
    /// Artwork title
    pub title: String,
    /// Shares in the window
    pub share_count: i64,
    /// Distinct platforms it was shared on
    pub platform_count: i64,
    /// Clicks brought in
    pub click_count: i64,
    /// Engagement received
    pub engagement_count: i64,
}

/// Most shared artworks of the current window, at most `limit`.
///
/// Ties on share count go to the lower artwork id.
#[instrument(skip(db))]
pub async fn top_shared_artworks(
    db: &DatabaseConnection,
    window: &TimeWindow,
    limit: usize,
) -> Result<Vec<SharedArtwork>> {
    let sql = "SELECT a.id AS artwork_id, a.title AS title, COUNT(*) AS share_count, \
            COUNT(DISTINCT s.platform) AS platform_count, \
            SUM(s.click_count) AS click_count, \
            SUM(s.engagement_count) AS engagement_count \
        FROM social_shares s JOIN artworks a ON a.id = s.artwork_id \
        WHERE s.shared_at >= ? AND s.shared_at <= ? \
        GROUP BY a.id, a.title \
        ORDER BY share_count DESC, a.id";

    let mut rows = SharedArtwork::find_by_statement(statement(
        db,
        sql,
        vec![window.current_start.into(), window.now.into()],
    ))
    .all(db)
    .await?;
    rows.truncate(limit);

    Ok(rows)
}

/// Searches for one normalized term in the current and previous windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct SearchTermCounts {
    /// Lowercased, trimmed search term
    pub term: String,
    /// Searches in the current window
    pub current_searches: i64,
    /// Searches in the previous window
    pub previous_searches: i64,
}

/// Counts searches per term across the two windows, ordered by term.
///
/// Terms are compared case-insensitively with surrounding whitespace removed;
/// blank searches are ignored.
#[instrument(skip(db))]
pub async fn search_term_counts(
    db: &DatabaseConnection,
    window: &TimeWindow,
) -> Result<Vec<SearchTermCounts>> {
    let sql = "SELECT term, SUM(cur) AS current_searches, SUM(1 - cur) AS previous_searches \
        FROM ( \
            SELECT LOWER(TRIM(search_term)) AS term, \
                CASE WHEN searched_at >= ? THEN 1 ELSE 0 END AS cur \
            FROM search_logs \
            WHERE searched_at >= ? AND searched_at <= ? AND TRIM(search_term) <> '' \
        ) \
        GROUP BY term \
        ORDER BY term";

    let rows = SearchTermCounts::find_by_statement(statement(
        db,
        sql,
        vec![
            window.current_start.into(),
            window.previous_start.into(),
            window.now.into(),
        ],
    ))
    .all(db)
    .await?;

    Ok(rows)
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    total: f64,
}

/// Completed revenue with `from <= transaction_time < to`.
#[instrument(skip(db))]
pub async fn revenue_between(
    db: &DatabaseConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<f64> {
    let sql = "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) AS total \
        FROM transactions \
        WHERE status = ? AND transaction_time >= ? AND transaction_time < ?";

    let row = RevenueRow::find_by_statement(statement(
        db,
        sql,
        vec![STATUS_COMPLETED.into(), from.into(), to.into()],
    ))
    .one(db)
    .await?;

    Ok(row.map_or(0.0, |row| row.total))
}

/// Completed revenue of the current and previous windows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, FromQueryResult)]
pub struct WindowRevenue {
    /// Revenue of the current window
    pub current: f64,
    /// Revenue of the previous window
    pub previous: f64,
}

/// Splits completed revenue between the current and previous windows.
#[instrument(skip(db))]
pub async fn window_revenue(db: &DatabaseConnection, window: &TimeWindow) -> Result<WindowRevenue> {
    let sql = "SELECT \
            CAST(COALESCE(SUM(CASE WHEN transaction_time >= ? THEN amount ELSE 0 END), 0) AS REAL) AS \"current\", \
            CAST(COALESCE(SUM(CASE WHEN transaction_time < ? THEN amount ELSE 0 END), 0) AS REAL) AS \"previous\" \
        FROM transactions \
        WHERE status = ? AND transaction_time >= ? AND transaction_time <= ?";

    let revenue = WindowRevenue::find_by_statement(statement(
        db,
        sql,
        vec![
            window.current_start.into(),
            window.current_start.into(),
            STATUS_COMPLETED.into(),
            window.previous_start.into(),
            window.now.into(),
        ],
    ))
    .one(db)
    .await?
    .unwrap_or_default();

    Ok(revenue)
}
