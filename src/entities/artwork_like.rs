//! Artwork like entity - A user liking an artwork. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Artwork like database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artwork_likes")]
pub struct Model {
    /// Unique identifier for the like
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Liked artwork
    pub artwork_id: i64,
    /// Member who liked it
    pub user_id: i64,
    /// When the like happened
    pub liked_at: DateTimeUtc,
}

/// `ArtworkLike` belongs to one artwork
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Liked artwork
    #[sea_orm(
        belongs_to = "super::artwork::Entity",
        from = "Column::ArtworkId",
        to = "super::artwork::Column::Id"
    )]
    Artwork,
}

impl Related<super::artwork::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Artwork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
