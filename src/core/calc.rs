//! Ratio and score calculations.
//!
//! Every function here is pure and total: a zero denominator yields `0` (or the
//! documented neutral value) instead of NaN, infinity or a panic. Extraction
//! code feeds raw counts in; the formatter serializes whatever comes out.

use crate::core::brackets::PriceBracket;
use chrono::{Months, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Weight of a single view in the engagement score
pub const VIEW_WEIGHT: i64 = 1;
/// Weight of a like in the engagement score
pub const LIKE_WEIGHT: i64 = 5;
/// Weight of a purchase in the engagement score
pub const PURCHASE_WEIGHT: i64 = 20;

/// Elasticity returned when there is not enough data to estimate one
pub const NEUTRAL_ELASTICITY: f64 = 1.0;

/// Growth value reported when the baseline is zero but the current value is not
pub const ZERO_BASELINE_GROWTH: f64 = 100.0;

/// Months projected by [`growth_projection`]
pub const PROJECTION_MONTHS: u32 = 6;

/// Divides, returning `0` for a zero denominator.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Count-based [`ratio`].
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn count_ratio(numerator: i64, denominator: i64) -> f64 {
    ratio(numerator as f64, denominator as f64)
}

/// Purchases per view as a percentage, `0` without views.
#[must_use]
pub fn conversion_rate(purchases: i64, views: i64) -> f64 {
    count_ratio(purchases, views) * 100.0
}

/// Relative change between two periods.
///
/// Returns `(current - previous) / previous`. With a zero baseline the change
/// is reported as [`ZERO_BASELINE_GROWTH`] when anything happened in the
/// current period and `0` otherwise.
#[must_use]
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current == 0.0 { 0.0 } else { ZERO_BASELINE_GROWTH }
    } else {
        (current - previous) / previous
    }
}

/// [`growth_rate`] expressed as a percentage; the zero-baseline value stays 100.
#[must_use]
pub fn growth_percentage(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        growth_rate(current, previous)
    } else {
        growth_rate(current, previous) * 100.0
    }
}

/// Count-based [`growth_percentage`].
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn count_growth_percentage(current: i64, previous: i64) -> f64 {
    growth_percentage(current as f64, previous as f64)
}

/// Popularity score with fixed weights: `views + 5*likes + 20*purchases`.
#[must_use]
pub const fn engagement_score(views: i64, likes: i64, purchases: i64) -> i64 {
    views * VIEW_WEIGHT + likes * LIKE_WEIGHT + purchases * PURCHASE_WEIGHT
}

/// Virality of shared content from its share and engagement rates.
#[must_use]
pub fn virality_score(share_rate: f64, engagement_rate: f64) -> f64 {
    share_rate * engagement_rate / 100.0
}

/// Shares per view as a percentage; fewer than one view counts as one.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn share_rate(shares: i64, views: i64) -> f64 {
    shares as f64 / views.max(1) as f64 * 100.0
}

/// Engagement per click as a percentage; fewer than one click counts as one.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn engagement_rate(engagement: i64, clicks: i64) -> f64 {
    engagement as f64 / clicks.max(1) as f64 * 100.0
}

/// Clicks brought in per share, `0` without shares.
#[must_use]
pub fn viral_coefficient(clicks: i64, shares: i64) -> f64 {
    count_ratio(clicks, shares)
}

/// Population standard deviation, `0` for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    let avg = mean(values);
    let variance = ratio(
        values.iter().map(|value| (value - avg).powi(2)).sum(),
        values.len() as f64,
    );
    variance.sqrt()
}

/// Conversion observed in one price bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketPoint {
    /// Bracket the artworks fell into
    pub bracket: PriceBracket,
    /// Purchases per view, as a percentage
    pub conversion_rate: f64,
}

/// Average price elasticity across adjacent price brackets.
///
/// For each neighbouring pair with positive conversion on both sides the
/// elasticity is the relative change in conversion divided by the relative
/// change in bracket midpoint, in absolute value. The result is the mean over
/// qualifying pairs, or [`NEUTRAL_ELASTICITY`] when fewer than two brackets
/// are present or no pair qualifies.
#[must_use]
pub fn price_elasticity(points: &[BracketPoint]) -> f64 {
    if points.len() < 2 {
        return NEUTRAL_ELASTICITY;
    }

    let mut ordered = points.to_vec();
    ordered.sort_by_key(|point| point.bracket);

    let elasticities: Vec<f64> = ordered
        .windows(2)
        .filter_map(|pair| {
            let (low, high) = (pair[0], pair[1]);
            if low.conversion_rate <= 0.0 || high.conversion_rate <= 0.0 {
                return None;
            }
            let delta_q = (high.conversion_rate - low.conversion_rate) / low.conversion_rate;
            let low_price = low.bracket.midpoint();
            let delta_p = (high.bracket.midpoint() - low_price) / low_price;
            (delta_p != 0.0).then(|| (delta_q / delta_p).abs())
        })
        .collect();

    if elasticities.is_empty() {
        NEUTRAL_ELASTICITY
    } else {
        mean(&elasticities)
    }
}

/// Sales history feeding the reputation factor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ArtistStats {
    /// Artworks ever listed
    pub total_works: i64,
    /// Artworks sold
    pub sold_works: i64,
    /// Mean listing-to-sale time in days over sold works
    pub avg_days_to_sell: Option<f64>,
    /// Mean review rating
    pub avg_rating: Option<f64>,
    /// Identity verified
    pub verified: bool,
}

/// Individual reputation sub-factors and their weighted blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReputationBreakdown {
    /// Sell-through factor, 0.8 to 1.2
    pub sales_factor: f64,
    /// Sale speed factor, 0.9 to 1.3
    pub speed_factor: f64,
    /// Review factor, 0.8 to 1.2
    pub review_factor: f64,
    /// 1.1 for verified artists, else 1.0
    pub verification_factor: f64,
    /// `0.4*sales + 0.3*speed + 0.2*review + 0.1*verification`
    pub combined: f64,
}

/// Computes the artist reputation multiplier applied to price recommendations.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn reputation_factor(stats: &ArtistStats) -> ReputationBreakdown {
    let sales_factor = if stats.total_works > 0 {
        let sales_ratio = (stats.sold_works as f64 / stats.total_works as f64).clamp(0.0, 1.0);
        0.8 + sales_ratio * 0.4
    } else {
        1.0
    };

    // Faster sales mean a higher factor
    let speed_factor = match stats.avg_days_to_sell {
        Some(days) if days > 0.0 => (30.0 / days.max(1.0) * 1.1).clamp(0.9, 1.3),
        _ => 1.0,
    };

    let review_factor = match stats.avg_rating {
        Some(rating) if rating > 0.0 => 0.8 + rating.min(5.0) / 5.0 * 0.4,
        _ => 1.0,
    };

    let verification_factor = if stats.verified { 1.1 } else { 1.0 };

    ReputationBreakdown {
        sales_factor,
        speed_factor,
        review_factor,
        verification_factor,
        combined: sales_factor * 0.4
            + speed_factor * 0.3
            + review_factor * 0.2
            + verification_factor * 0.1,
    }
}

/// Pearson correlation coefficient of two equally long samples.
///
/// Returns `0` when the lengths differ, fewer than two samples are given, or
/// either sample has zero variance.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let (mut covariance, mut variance_x, mut variance_y) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return 0.0;
    }

    covariance / (variance_x * variance_y).sqrt()
}

/// Arithmetic mean, `0` for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), values.len() as f64)
}

/// Size multiplier: area normalised to 100x100, limited to 0.8..=1.5.
#[must_use]
pub fn size_factor(width: f64, height: f64) -> f64 {
    (width * height / 10_000.0).clamp(0.8, 1.5)
}

/// Medium multiplier; unknown media are neutral.
#[must_use]
pub fn medium_factor<S: std::hash::BuildHasher>(
    medium: &str,
    factors: &HashMap<String, f64, S>,
) -> f64 {
    let key = medium.trim().to_lowercase().replace(' ', "_");
    factors.get(&key).copied().unwrap_or(1.0)
}

/// Completed revenue of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// First day of the month
    #[serde(serialize_with = "serialize_month")]
    pub month: NaiveDate,
    /// Sum of completed sales
    pub total_revenue: f64,
}

/// Direction of revenue over the observed months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Average growth above 5 %
    Growing,
    /// Average growth within ±5 %
    Stable,
    /// Average growth below -5 %
    Declining,
    /// No history at all
    InsufficientData,
}

/// One projected month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedMonth {
    /// Month as `YYYY-MM`
    pub month: String,
    /// Revenue if the average growth continues
    pub projected_revenue: f64,
    /// Confidence in percent, dropping by 10 per month ahead
    pub confidence: u32,
}

/// Revenue trend and forward projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthProjection {
    /// Overall direction
    pub trend: Trend,
    /// Average month-over-month growth, in percent
    pub growth_rate: f64,
    /// Projected months following the last observed one
    pub projected_months: Vec<ProjectedMonth>,
}

/// Projects revenue forward from a chronological monthly history.
///
/// Month-over-month growth is averaged over months whose predecessor had
/// positive revenue; that average is compounded onto the last month.
#[must_use]
pub fn growth_projection(history: &[MonthlyRevenue]) -> GrowthProjection {
    let Some(last) = history.last() else {
        return GrowthProjection {
            trend: Trend::InsufficientData,
            growth_rate: 0.0,
            projected_months: Vec::new(),
        };
    };

    let growth_rates: Vec<f64> = history
        .windows(2)
        .filter(|pair| pair[0].total_revenue > 0.0)
        .map(|pair| growth_rate(pair[1].total_revenue, pair[0].total_revenue))
        .collect();
    let avg_growth = mean(&growth_rates);

    let trend = if avg_growth > 0.05 {
        Trend::Growing
    } else if avg_growth < -0.05 {
        Trend::Declining
    } else {
        Trend::Stable
    };

    let projected_months = (1..=PROJECTION_MONTHS)
        .filter_map(|i| {
            let month = last.month.checked_add_months(Months::new(i))?;
            #[allow(clippy::cast_possible_wrap)]
            let projected_revenue = last.total_revenue * (1.0 + avg_growth).powi(i as i32);
            Some(ProjectedMonth {
                month: month.format("%Y-%m").to_string(),
                projected_revenue,
                confidence: 100u32.saturating_sub(i * 10),
            })
        })
        .collect();

    GrowthProjection {
        trend,
        growth_rate: avg_growth * 100.0,
        projected_months,
    }
}

fn serialize_month<S: Serializer>(month: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&month.format("%Y-%m"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn month(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[test]
    fn test_growth_rate_examples() {
        assert_eq!(growth_rate(150.0, 100.0), 0.5);
        assert_eq!(growth_rate(50.0, 100.0), -0.5);
        assert_eq!(growth_percentage(150.0, 100.0), 50.0);
    }

    #[test]
    fn test_growth_rate_zero_baseline() {
        assert_eq!(growth_rate(0.0, 0.0), 0.0);
        assert_eq!(growth_rate(1.0, 0.0), 100.0);
        assert_eq!(growth_rate(12_345.0, 0.0), 100.0);
        assert_eq!(growth_percentage(7.0, 0.0), 100.0);
        assert_eq!(count_growth_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_engagement_score_example() {
        assert_eq!(engagement_score(100, 10, 2), 190);
        assert_eq!(engagement_score(0, 0, 0), 0);
    }

    #[test]
    fn test_engagement_score_is_monotonic() {
        let base = engagement_score(10, 10, 10);
        assert!(engagement_score(11, 10, 10) >= base);
        assert!(engagement_score(10, 11, 10) >= base);
        assert!(engagement_score(10, 10, 11) >= base);
    }

    #[test]
    fn test_conversion_rate_without_views() {
        assert_eq!(conversion_rate(5, 0), 0.0);
        assert_eq!(conversion_rate(5, 50), 10.0);
        assert_eq!(ratio(3.0, 0.0), 0.0);
    }

    #[test]
    fn test_elasticity_single_bracket_is_neutral() {
        let points = [BracketPoint {
            bracket: PriceBracket::Under100,
            conversion_rate: 12.0,
        }];
        assert_eq!(price_elasticity(&points), 1.0);
        assert_eq!(price_elasticity(&[]), 1.0);
    }

    #[test]
    fn test_elasticity_adjacent_pair() {
        // Conversion halves (-50 %) while price rises from 50 to 300 (+500 %)
        let points = [
            BracketPoint {
                bracket: PriceBracket::From100To500,
                conversion_rate: 5.0,
            },
            BracketPoint {
                bracket: PriceBracket::Under100,
                conversion_rate: 10.0,
            },
        ];
        assert!(approx(price_elasticity(&points), 0.1));
    }

    #[test]
    fn test_elasticity_skips_zero_conversion_pairs() {
        let points = [
            BracketPoint {
                bracket: PriceBracket::Under100,
                conversion_rate: 0.0,
            },
            BracketPoint {
                bracket: PriceBracket::From100To500,
                conversion_rate: 4.0,
            },
        ];
        assert_eq!(price_elasticity(&points), 1.0);
    }

    #[test]
    fn test_elasticity_averages_pairs() {
        let points = [
            BracketPoint {
                bracket: PriceBracket::Under100,
                conversion_rate: 10.0,
            },
            BracketPoint {
                bracket: PriceBracket::From100To500,
                conversion_rate: 5.0,
            },
            BracketPoint {
                bracket: PriceBracket::From500To1000,
                conversion_rate: 5.0,
            },
        ];
        // First pair 0.1, second pair 0.0
        assert!(approx(price_elasticity(&points), 0.05));
    }

    #[test]
    fn test_reputation_defaults() {
        let breakdown = reputation_factor(&ArtistStats::default());
        assert_eq!(breakdown.sales_factor, 1.0);
        assert_eq!(breakdown.speed_factor, 1.0);
        assert_eq!(breakdown.review_factor, 1.0);
        assert_eq!(breakdown.verification_factor, 1.0);
        assert!(approx(breakdown.combined, 1.0));
    }

    #[test]
    fn test_reputation_factor_ranges() {
        let strong = reputation_factor(&ArtistStats {
            total_works: 10,
            sold_works: 10,
            avg_days_to_sell: Some(1.0),
            avg_rating: Some(7.0),
            verified: true,
        });
        assert!(approx(strong.sales_factor, 1.2));
        assert!(approx(strong.speed_factor, 1.3));
        assert!(approx(strong.review_factor, 1.2));
        assert!(approx(strong.verification_factor, 1.1));
        assert!(approx(strong.combined, 0.48 + 0.39 + 0.24 + 0.11));

        let weak = reputation_factor(&ArtistStats {
            total_works: 4,
            sold_works: 0,
            avg_days_to_sell: Some(365.0),
            avg_rating: Some(1.0),
            verified: false,
        });
        assert!(approx(weak.sales_factor, 0.8));
        assert!(approx(weak.speed_factor, 0.9));
        assert!(approx(weak.review_factor, 0.88));
    }

    #[test]
    fn test_correlation_basic_properties() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert!(approx(correlation(&x, &y), 1.0));
        assert!(approx(correlation(&x, &z), -1.0));

        let w = [3.0, 1.0, 4.0, 1.5];
        assert_eq!(correlation(&x, &w), correlation(&w, &x));
    }

    #[test]
    fn test_correlation_degenerate_inputs() {
        assert_eq!(correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(correlation(&[], &[]), 0.0);
    }

    #[test]
    fn test_size_and_medium_factors() {
        assert_eq!(size_factor(10.0, 10.0), 0.8);
        assert_eq!(size_factor(100.0, 110.0), 1.1);
        assert_eq!(size_factor(500.0, 500.0), 1.5);

        let factors = crate::config::settings::default_medium_factors();
        assert_eq!(medium_factor("Mixed Media", &factors), 1.2);
        assert_eq!(medium_factor("oil", &factors), 1.3);
        assert_eq!(medium_factor("glass", &factors), 1.0);
    }

    #[test]
    fn test_growth_projection_empty() {
        let projection = growth_projection(&[]);
        assert_eq!(projection.trend, Trend::InsufficientData);
        assert!(projection.projected_months.is_empty());
    }

    #[test]
    fn test_growth_projection_growing() {
        let history = [
            MonthlyRevenue {
                month: month(2024, 10),
                total_revenue: 100.0,
            },
            MonthlyRevenue {
                month: month(2024, 11),
                total_revenue: 110.0,
            },
            MonthlyRevenue {
                month: month(2024, 12),
                total_revenue: 121.0,
            },
        ];
        let projection = growth_projection(&history);
        assert_eq!(projection.trend, Trend::Growing);
        assert!(approx(projection.growth_rate, 10.0));
        assert_eq!(projection.projected_months.len(), 6);
        assert_eq!(projection.projected_months[0].month, "2025-01");
        assert!(approx(projection.projected_months[0].projected_revenue, 133.1));
        assert_eq!(projection.projected_months[0].confidence, 90);
        assert_eq!(projection.projected_months[5].confidence, 40);
    }

    #[test]
    fn test_growth_projection_skips_zero_months() {
        let history = [
            MonthlyRevenue {
                month: month(2024, 1),
                total_revenue: 0.0,
            },
            MonthlyRevenue {
                month: month(2024, 2),
                total_revenue: 100.0,
            },
            MonthlyRevenue {
                month: month(2024, 3),
                total_revenue: 102.0,
            },
        ];
        let projection = growth_projection(&history);
        assert_eq!(projection.trend, Trend::Stable);
        assert!(approx(projection.growth_rate, 2.0));
    }

    #[test]
    fn test_std_dev_is_population() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[7.0, 7.0, 7.0]), 0.0);
        assert!(approx(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0));
    }

    #[test]
    fn test_virality_score() {
        assert_eq!(virality_score(20.0, 50.0), 10.0);
        assert_eq!(share_rate(5, 50), 10.0);
        assert_eq!(share_rate(3, 0), 300.0);
        assert_eq!(engagement_rate(30, 60), 50.0);
        assert_eq!(engagement_rate(4, 0), 400.0);
        assert_eq!(viral_coefficient(40, 8), 5.0);
        assert_eq!(viral_coefficient(40, 0), 0.0);
    }
}
