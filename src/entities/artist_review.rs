//! Artist review entity - A buyer's rating of an artist (1 to 5).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Artist review database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artist_reviews")]
pub struct Model {
    /// Unique identifier for the review
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewed artist
    pub artist_id: i64,
    /// Star rating, 1.0 to 5.0
    pub rating: f64,
    /// When the review was left
    pub created_at: DateTimeUtc,
}

/// `ArtistReview` belongs to one artist
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Reviewed artist
    #[sea_orm(
        belongs_to = "super::artist::Entity",
        from = "Column::ArtistId",
        to = "super::artist::Column::Id"
    )]
    Artist,
}

impl Related<super::artist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
