//! Artwork entity - A listed piece with its price and classification.
//!
//! Artworks are grouped by `category`, `style` and `medium` for reporting.
//! `sale_status` is `"available"` until the piece sells, at which point it
//! becomes `"sold"` and `sold_at` is set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale status value for a sold artwork
pub const STATUS_SOLD: &str = "sold";
/// Sale status value for an artwork still on offer
pub const STATUS_AVAILABLE: &str = "available";

/// Artwork database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artworks")]
pub struct Model {
    /// Unique identifier for the artwork
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning artist
    pub artist_id: i64,
    /// Title shown in listings
    pub title: String,
    /// Current asking price in dollars
    pub price: f64,
    /// Marketplace category (e.g., "painting", "photography")
    pub category: String,
    /// Art style (e.g., "Abstract", "Surrealism")
    pub style: String,
    /// Medium (e.g., "oil", "mixed media")
    pub medium: String,
    /// Width in centimetres
    pub width: f64,
    /// Height in centimetres
    pub height: f64,
    /// `"available"` or `"sold"`
    pub sale_status: String,
    /// When the artwork was listed
    pub published_at: DateTimeUtc,
    /// When the artwork sold, if it has
    pub sold_at: Option<DateTimeUtc>,
}

impl Model {
    /// Whole days between listing and sale, for sold artworks.
    #[must_use]
    pub fn days_to_sell(&self) -> Option<i64> {
        self.sold_at
            .map(|sold| sold.signed_duration_since(self.published_at).num_days())
    }

    /// Whether the artwork has been sold
    #[must_use]
    pub fn is_sold(&self) -> bool {
        self.sale_status == STATUS_SOLD
    }
}

/// Defines relationships between Artwork and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each artwork belongs to one artist
    #[sea_orm(
        belongs_to = "super::artist::Entity",
        from = "Column::ArtistId",
        to = "super::artist::Column::Id"
    )]
    Artist,
    /// One artwork has many sale transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One artwork has many views
    #[sea_orm(has_many = "super::artwork_view::Entity")]
    Views,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::artwork_view::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Views.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
