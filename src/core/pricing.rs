//! Pricing analytics - elasticity, artist reputation and price recommendations.
//!
//! Recommendations start from comparable sold works and fall back to the
//! category average (at least [`MIN_CATEGORY_SAMPLE`] sales) and then to the
//! platform-wide average. Every basis is scaled by the artist's reputation.

use crate::core::brackets::PriceBracket;
use crate::core::calc::{self, ArtistStats, BracketPoint, ReputationBreakdown};
use crate::core::metrics::{self, BracketConversion, BracketScope};
use crate::entities::{
    Artist, ArtistModel, ArtistReview, Artwork, ArtworkModel, artist_review, artwork,
};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Sold works in a category needed before its average is trusted
pub const MIN_CATEGORY_SAMPLE: usize = 3;
/// Comparable works considered for a recommendation
pub const SIMILAR_WORKS_LIMIT: u64 = 10;
/// Allowed relative deviation of width and height for comparable works
pub const SIZE_TOLERANCE: f64 = 0.2;
/// A category needs more listings than this to be checked for price gaps
pub const MIN_GAP_SAMPLE: usize = 5;

/// Conversion of one price bracket, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketRate {
    /// Price bracket
    pub bracket: PriceBracket,
    /// Lifetime views in the bracket
    pub views: i64,
    /// Lifetime completed purchases in the bracket
    pub purchases: i64,
    /// Purchases per view, as a percentage
    pub conversion_rate: f64,
}

impl From<BracketConversion> for BracketRate {
    fn from(conversion: BracketConversion) -> Self {
        Self {
            bracket: conversion.bracket,
            views: conversion.views,
            purchases: conversion.purchases,
            conversion_rate: conversion.conversion_rate(),
        }
    }
}

/// Elasticity of demand within one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryElasticity {
    /// Category analysed
    pub category: String,
    /// Conversion per bracket present in the category, cheapest first
    pub brackets: Vec<BracketRate>,
    /// Mean absolute elasticity, 1.0 when it cannot be estimated
    pub elasticity: f64,
}

/// Estimates how strongly conversion reacts to price within a category.
#[instrument(skip(db))]
pub async fn price_elasticity_for_category(
    db: &DatabaseConnection,
    category: &str,
) -> Result<CategoryElasticity> {
    let brackets: Vec<BracketRate> =
        metrics::bracket_conversions(db, &BracketScope::Category(category.to_string()))
            .await?
            .into_iter()
            .map(BracketRate::from)
            .collect();

    let points: Vec<BracketPoint> = brackets
        .iter()
        .map(|rate| BracketPoint {
            bracket: rate.bracket,
            conversion_rate: rate.conversion_rate,
        })
        .collect();

    Ok(CategoryElasticity {
        category: category.to_string(),
        elasticity: calc::price_elasticity(&points),
        brackets,
    })
}

/// Sales history and reputation factors of an artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistReputation {
    /// Artist the reputation belongs to
    pub artist_id: i64,
    /// Sales history behind the factors
    pub stats: ArtistStats,
    /// Sub-factors and their blend
    pub factors: ReputationBreakdown,
}

/// Collects an artist's sales history.
///
/// An unknown artist has no works, no reviews and is not verified.
#[instrument(skip(db))]
pub async fn artist_stats(db: &DatabaseConnection, artist_id: i64) -> Result<ArtistStats> {
    let works = Artwork::find()
        .filter(artwork::Column::ArtistId.eq(artist_id))
        .all(db)
        .await?;

    #[allow(clippy::cast_precision_loss)]
    let days: Vec<f64> = works
        .iter()
        .filter(|work| work.is_sold())
        .filter_map(ArtworkModel::days_to_sell)
        .map(|days| days as f64)
        .collect();

    let ratings: Vec<f64> = ArtistReview::find()
        .filter(artist_review::Column::ArtistId.eq(artist_id))
        .all(db)
        .await?
        .into_iter()
        .map(|review| review.rating)
        .collect();

    let verified = Artist::find_by_id(artist_id)
        .one(db)
        .await?
        .is_some_and(|artist| artist.verified);

    let stats = ArtistStats {
        total_works: count(works.len()),
        sold_works: count(works.iter().filter(|work| work.is_sold()).count()),
        avg_days_to_sell: (!days.is_empty()).then(|| calc::mean(&days)),
        avg_rating: (!ratings.is_empty()).then(|| calc::mean(&ratings)),
        verified,
    };
    debug!("Artist {} stats: {:?}", artist_id, stats);
    Ok(stats)
}

/// Computes the reputation multiplier of an artist.
#[instrument(skip(db))]
pub async fn artist_reputation(db: &DatabaseConnection, artist_id: i64) -> Result<ArtistReputation> {
    let stats = artist_stats(db, artist_id).await?;
    Ok(ArtistReputation {
        artist_id,
        factors: calc::reputation_factor(&stats),
        stats,
    })
}

/// Direction in which the current price should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceAdjustment {
    /// Priced well below comparable works
    Increase,
    /// Priced well above comparable works
    Decrease,
}

/// Inclusive price band around a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    /// Lower bound
    pub low: f64,
    /// Upper bound
    pub high: f64,
}

/// The recommended price of one artwork.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRecommendation {
    /// Listing price today
    pub current_price: f64,
    /// Suggested listing price
    pub recommended_price: f64,
    /// Only set when the price comes from comparable works
    pub price_adjustment: Option<PriceAdjustment>,
    /// Acceptable band around the suggested price
    pub price_range: PriceRange,
}

/// A sold artwork comparable to the one being priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarArtwork {
    /// Artwork id
    pub id: i64,
    /// Artwork title
    pub title: String,
    /// Price it sold at
    pub price: f64,
    /// Days between listing and sale
    pub days_to_sell: Option<i64>,
}

/// Price statistics derived from comparable works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceAnalytics {
    /// Cheapest comparable sale
    pub min_price: f64,
    /// Most expensive comparable sale
    pub max_price: f64,
    /// Mean comparable sale price
    pub avg_price: f64,
    /// Elasticity of the artwork's category
    pub elasticity: f64,
    /// Reputation multiplier of the artist
    pub artist_factor: f64,
}

/// Price statistics over a set of sold works.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    /// Lowest price
    pub min_price: f64,
    /// Highest price
    pub max_price: f64,
    /// Mean price
    pub avg_price: f64,
    /// Works the summary covers
    pub sample_size: usize,
}

impl PriceSummary {
    fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }
        Some(Self {
            min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg_price: calc::mean(prices),
            sample_size: prices.len(),
        })
    }
}

/// Multipliers applied to an average price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceFactors {
    /// Multiplier from the artwork's area
    pub size_factor: f64,
    /// Multiplier from the artwork's medium
    pub medium_factor: f64,
    /// Reputation multiplier of the artist
    pub artist_factor: f64,
}

/// What a recommendation was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum PricingBasis {
    /// Comparable sold works of the same style, medium and size
    SimilarWorks {
        /// Most recently sold comparable works
        similar_artworks: Vec<SimilarArtwork>,
        /// Statistics over those works
        price_analytics: PriceAnalytics,
    },
    /// Sold works in the same category
    Category {
        /// Statistics over the category's sold works
        category_pricing: PriceSummary,
        /// Multipliers applied to the category average
        factors: PriceFactors,
    },
    /// All sold works on the platform
    Global {
        /// Statistics over every sold work
        global_pricing: PriceSummary,
        /// Multipliers applied to the global average
        factors: PriceFactors,
    },
}

/// Full price recommendation for an artwork.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtworkPricing {
    /// Artwork being priced
    pub artwork: ArtworkModel,
    /// Bracket of the artwork's current price
    pub price_bracket: PriceBracket,
    /// Data the recommendation was derived from
    #[serde(flatten)]
    pub basis: PricingBasis,
    /// The recommendation itself
    pub recommendation: PriceRecommendation,
}

/// Recommends a price for an artwork.
///
/// # Errors
/// Returns `Error::NotFound` if the artwork does not exist.
#[instrument(skip(db, medium_factors))]
pub async fn artwork_price_recommendation<S: std::hash::BuildHasher + Sync>(
    db: &DatabaseConnection,
    artwork_id: i64,
    medium_factors: &HashMap<String, f64, S>,
) -> Result<ArtworkPricing> {
    let artwork = Artwork::find_by_id(artwork_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Artwork",
            id: artwork_id,
        })?;

    let similar = similar_sold_works(db, &artwork).await?;
    let artist_factor = artist_reputation(db, artwork.artist_id)
        .await?
        .factors
        .combined;

    let prices: Vec<f64> = similar.iter().map(|work| work.price).collect();
    if let Some(summary) = PriceSummary::from_prices(&prices) {
        let elasticity = price_elasticity_for_category(db, &artwork.category)
            .await?
            .elasticity;
        let recommended_price = summary.avg_price * artist_factor;

        let price_adjustment = if artwork.price < summary.min_price * 0.8 {
            Some(PriceAdjustment::Increase)
        } else if artwork.price > summary.max_price * 1.2 {
            Some(PriceAdjustment::Decrease)
        } else {
            None
        };

        let recommendation = PriceRecommendation {
            current_price: artwork.price,
            recommended_price,
            price_adjustment,
            price_range: PriceRange {
                low: recommended_price * 0.9,
                high: recommended_price * 1.1,
            },
        };

        return Ok(ArtworkPricing {
            price_bracket: PriceBracket::classify(artwork.price),
            basis: PricingBasis::SimilarWorks {
                similar_artworks: similar
                    .into_iter()
                    .map(|work| SimilarArtwork {
                        id: work.id,
                        days_to_sell: work.days_to_sell(),
                        title: work.title,
                        price: work.price,
                    })
                    .collect(),
                price_analytics: PriceAnalytics {
                    min_price: summary.min_price,
                    max_price: summary.max_price,
                    avg_price: summary.avg_price,
                    elasticity,
                    artist_factor,
                },
            },
            artwork,
            recommendation,
        });
    }

    debug!("No comparable sales for artwork {}, falling back", artwork_id);

    let factors = PriceFactors {
        size_factor: calc::size_factor(artwork.width, artwork.height),
        medium_factor: calc::medium_factor(&artwork.medium, medium_factors),
        artist_factor,
    };

    let category_prices = sold_prices(db, Some(&artwork.category)).await?;
    let basis = match PriceSummary::from_prices(&category_prices) {
        Some(summary) if summary.sample_size >= MIN_CATEGORY_SAMPLE => PricingBasis::Category {
            category_pricing: summary,
            factors,
        },
        _ => {
            let global_prices = sold_prices(db, None).await?;
            // With nothing sold anywhere the artwork's own price is the base
            let global_pricing =
                PriceSummary::from_prices(&global_prices).unwrap_or(PriceSummary {
                    min_price: artwork.price,
                    max_price: artwork.price,
                    avg_price: artwork.price,
                    sample_size: 0,
                });
            PricingBasis::Global {
                global_pricing,
                factors,
            }
        }
    };

    let base_price = match &basis {
        PricingBasis::Category {
            category_pricing, ..
        } => category_pricing.avg_price,
        PricingBasis::Global { global_pricing, .. } => global_pricing.avg_price,
        PricingBasis::SimilarWorks { price_analytics, .. } => price_analytics.avg_price,
    };
    let recommended_price =
        base_price * factors.size_factor * factors.medium_factor * factors.artist_factor;

    Ok(ArtworkPricing {
        price_bracket: PriceBracket::classify(artwork.price),
        recommendation: PriceRecommendation {
            current_price: artwork.price,
            recommended_price,
            price_adjustment: None,
            price_range: PriceRange {
                low: recommended_price * 0.8,
                high: recommended_price * 1.2,
            },
        },
        artwork,
        basis,
    })
}

async fn similar_sold_works(
    db: &DatabaseConnection,
    target: &ArtworkModel,
) -> Result<Vec<ArtworkModel>> {
    let works = Artwork::find()
        .filter(artwork::Column::Style.eq(target.style.as_str()))
        .filter(artwork::Column::Medium.eq(target.medium.as_str()))
        .filter(artwork::Column::Width.between(
            target.width * (1.0 - SIZE_TOLERANCE),
            target.width * (1.0 + SIZE_TOLERANCE),
        ))
        .filter(artwork::Column::Height.between(
            target.height * (1.0 - SIZE_TOLERANCE),
            target.height * (1.0 + SIZE_TOLERANCE),
        ))
        .filter(artwork::Column::Id.ne(target.id))
        .filter(artwork::Column::SaleStatus.eq(artwork::STATUS_SOLD))
        .order_by_desc(artwork::Column::SoldAt)
        .limit(SIMILAR_WORKS_LIMIT)
        .all(db)
        .await?;
    Ok(works)
}

async fn sold_prices(db: &DatabaseConnection, category: Option<&str>) -> Result<Vec<f64>> {
    let mut query = Artwork::find().filter(artwork::Column::SaleStatus.eq(artwork::STATUS_SOLD));
    if let Some(category) = category {
        query = query.filter(artwork::Column::Category.eq(category));
    }
    Ok(query
        .all(db)
        .await?
        .into_iter()
        .map(|work| work.price)
        .collect())
}

/// Listing and sales totals of an artist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Artworks ever listed
    pub total_works: i64,
    /// Artworks sold
    pub sold_works: i64,
    /// Mean sold price, 0 without sales
    pub avg_price: f64,
    /// Mean days to sell, 0 without sales
    pub avg_days_to_sell: f64,
}

/// Pricing picture of one artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistPricingOverview {
    /// The artist
    pub artist: ArtistModel,
    /// Listing and sales totals
    pub sales_summary: SalesSummary,
    /// Conversion per bracket the artist has works in
    pub conversion_rates: Vec<BracketRate>,
    /// Bracket with the highest conversion among brackets that were viewed
    pub best_bracket: Option<PriceBracket>,
    /// Midpoint of the best bracket
    pub suggested_price: Option<f64>,
    /// Reputation factors of the artist
    pub reputation: ReputationBreakdown,
}

/// Summarises an artist's sales, per-bracket conversion and reputation.
///
/// # Errors
/// Returns `Error::NotFound` if the artist does not exist.
#[instrument(skip(db))]
pub async fn artist_pricing_overview(
    db: &DatabaseConnection,
    artist_id: i64,
) -> Result<ArtistPricingOverview> {
    let artist = Artist::find_by_id(artist_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Artist",
            id: artist_id,
        })?;

    let works = Artwork::find()
        .filter(artwork::Column::ArtistId.eq(artist_id))
        .all(db)
        .await?;
    let sold: Vec<&ArtworkModel> = works.iter().filter(|work| work.is_sold()).collect();
    let sold_prices: Vec<f64> = sold.iter().map(|work| work.price).collect();
    #[allow(clippy::cast_precision_loss)]
    let sold_days: Vec<f64> = sold
        .iter()
        .filter_map(|work| work.days_to_sell())
        .map(|days| days as f64)
        .collect();

    let conversion_rates: Vec<BracketRate> =
        metrics::bracket_conversions(db, &BracketScope::Artist(artist_id))
            .await?
            .into_iter()
            .map(BracketRate::from)
            .collect();

    let best_bracket = best_converting_bracket(&conversion_rates);
    let reputation = artist_reputation(db, artist_id).await?.factors;

    Ok(ArtistPricingOverview {
        artist,
        sales_summary: SalesSummary {
            total_works: count(works.len()),
            sold_works: count(sold.len()),
            avg_price: calc::mean(&sold_prices),
            avg_days_to_sell: calc::mean(&sold_days),
        },
        conversion_rates,
        suggested_price: best_bracket.map(PriceBracket::midpoint),
        best_bracket,
        reputation,
    })
}

/// Highest-converting viewed bracket; ties go to the cheaper bracket.
fn best_converting_bracket(rates: &[BracketRate]) -> Option<PriceBracket> {
    rates
        .iter()
        .filter(|rate| rate.views > 0)
        .fold(None::<&BracketRate>, |best, rate| match best {
            Some(current) if current.conversion_rate >= rate.conversion_rate => Some(current),
            _ => Some(rate),
        })
        .map(|rate| rate.bracket)
}

/// Price spread of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPriceGap {
    /// Category analysed
    pub category: String,
    /// Listings in the category
    pub artwork_count: usize,
    /// Lowest listing price
    pub min_price: f64,
    /// Highest listing price
    pub max_price: f64,
    /// Mean listing price
    pub avg_price: f64,
    /// `max_price - min_price`
    pub price_range: f64,
    /// Population standard deviation of listing prices
    pub price_stddev: f64,
}

/// Categories whose listing prices spread out the most.
///
/// Only categories with more than [`MIN_GAP_SAMPLE`] listings and a non-zero
/// spread are reported, widest spread first.
#[instrument(skip(db))]
pub async fn price_gaps(db: &DatabaseConnection) -> Result<Vec<CategoryPriceGap>> {
    let mut by_category: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in metrics::category_prices(db).await? {
        by_category.entry(row.category).or_default().push(row.price);
    }

    let mut gaps: Vec<CategoryPriceGap> = by_category
        .into_iter()
        .filter(|(_, prices)| prices.len() > MIN_GAP_SAMPLE)
        .filter_map(|(category, prices)| {
            let summary = PriceSummary::from_prices(&prices)?;
            let price_stddev = calc::std_dev(&prices);
            (price_stddev > 0.0).then(|| CategoryPriceGap {
                category,
                artwork_count: summary.sample_size,
                min_price: summary.min_price,
                max_price: summary.max_price,
                avg_price: summary.avg_price,
                price_range: summary.max_price - summary.min_price,
                price_stddev,
            })
        })
        .collect();
    gaps.sort_by(|a, b| b.price_stddev.total_cmp(&a.price_stddev));

    debug!("{} categories with price gaps", gaps.len());
    Ok(gaps)
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}
