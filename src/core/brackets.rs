//! Price classifications used while aggregating.
//!
//! [`PriceBracket`] buckets artwork prices for conversion and elasticity
//! analysis; [`CartPriceRange`] buckets cart totals for price sensitivity.
//! Neither is persisted. The SQL `CASE` expressions below must stay in step
//! with [`PriceBracket::classify`], which prices single artworks outside SQL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Artwork price bracket, in ascending price order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceBracket {
    /// Below $100
    #[serde(rename = "under_100")]
    Under100,
    /// $100 to $499.99
    #[serde(rename = "100_to_500")]
    From100To500,
    /// $500 to $999.99
    #[serde(rename = "500_to_1000")]
    From500To1000,
    /// $1000 to $4999.99
    #[serde(rename = "1000_to_5000")]
    From1000To5000,
    /// $5000 and above
    #[serde(rename = "over_5000")]
    Over5000,
}

impl PriceBracket {
    /// All brackets in ascending order
    pub const ALL: [Self; 5] = [
        Self::Under100,
        Self::From100To500,
        Self::From500To1000,
        Self::From1000To5000,
        Self::Over5000,
    ];

    /// SQL expression classifying `a.price` into bracket keys.
    pub const SQL_CASE: &'static str = "CASE \
            WHEN a.price < 100 THEN 'under_100' \
            WHEN a.price < 500 THEN '100_to_500' \
            WHEN a.price < 1000 THEN '500_to_1000' \
            WHEN a.price < 5000 THEN '1000_to_5000' \
            ELSE 'over_5000' END";

    /// Classifies a price.
    #[must_use]
    pub fn classify(price: f64) -> Self {
        if price < 100.0 {
            Self::Under100
        } else if price < 500.0 {
            Self::From100To500
        } else if price < 1000.0 {
            Self::From500To1000
        } else if price < 5000.0 {
            Self::From1000To5000
        } else {
            Self::Over5000
        }
    }

    /// Representative price of the bracket.
    #[must_use]
    pub const fn midpoint(self) -> f64 {
        match self {
            Self::Under100 => 50.0,
            Self::From100To500 => 300.0,
            Self::From500To1000 => 750.0,
            Self::From1000To5000 => 3000.0,
            Self::Over5000 => 7500.0,
        }
    }

    /// Stable key, as used in SQL and JSON
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Under100 => "under_100",
            Self::From100To500 => "100_to_500",
            Self::From500To1000 => "500_to_1000",
            Self::From1000To5000 => "1000_to_5000",
            Self::Over5000 => "over_5000",
        }
    }

    /// Looks a bracket up by key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bracket| bracket.key() == key)
    }
}

impl fmt::Display for PriceBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Cart total range, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CartPriceRange {
    /// Below $50
    #[serde(rename = "under_50")]
    Under50,
    /// $50 to $99.99
    #[serde(rename = "50_100")]
    From50To100,
    /// $100 to $249.99
    #[serde(rename = "100_250")]
    From100To250,
    /// $250 to $499.99
    #[serde(rename = "250_500")]
    From250To500,
    /// $500 to $999.99
    #[serde(rename = "500_1000")]
    From500To1000,
    /// $1000 and above
    #[serde(rename = "over_1000")]
    Over1000,
}

impl CartPriceRange {
    /// All ranges in ascending order
    pub const ALL: [Self; 6] = [
        Self::Under50,
        Self::From50To100,
        Self::From100To250,
        Self::From250To500,
        Self::From500To1000,
        Self::Over1000,
    ];

    /// SQL expression classifying `cart_total` into range keys.
    pub const SQL_CASE: &'static str = "CASE \
            WHEN cart_total < 50 THEN 'under_50' \
            WHEN cart_total < 100 THEN '50_100' \
            WHEN cart_total < 250 THEN '100_250' \
            WHEN cart_total < 500 THEN '250_500' \
            WHEN cart_total < 1000 THEN '500_1000' \
            ELSE 'over_1000' END";

    /// Stable key, as used in SQL and JSON
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Under50 => "under_50",
            Self::From50To100 => "50_100",
            Self::From100To250 => "100_250",
            Self::From250To500 => "250_500",
            Self::From500To1000 => "500_1000",
            Self::Over1000 => "over_1000",
        }
    }

    /// Looks a range up by key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.key() == key)
    }
}

impl fmt::Display for CartPriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
