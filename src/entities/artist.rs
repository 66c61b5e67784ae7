//! Artist entity - Represents a seller on the marketplace.
//!
//! Artists own artworks and receive reviews. The `verified` flag marks artists
//! whose identity has been confirmed and feeds the reputation factor.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Artist database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artists")]
pub struct Model {
    /// Unique identifier for the artist
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Whether the artist passed identity verification
    pub verified: bool,
    /// When the artist joined the marketplace
    pub joined_at: DateTimeUtc,
}

/// Defines relationships between Artist and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One artist has many artworks
    #[sea_orm(has_many = "super::artwork::Entity")]
    Artworks,
    /// One artist has many reviews
    #[sea_orm(has_many = "super::artist_review::Entity")]
    Reviews,
}

impl Related<super::artwork::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artworks.def()
    }
}

impl Related<super::artist_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
