//! Artwork view entity - One page view of an artwork. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Artwork view database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artwork_views")]
pub struct Model {
    /// Unique identifier for the view
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Viewed artwork
    pub artwork_id: i64,
    /// Member who viewed it
    pub user_id: i64,
    /// When the view happened
    pub viewed_at: DateTimeUtc,
    /// Seconds spent on the page, when the client reported it
    pub duration_secs: Option<i32>,
}

/// `ArtworkView` belongs to one artwork
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Viewed artwork
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
