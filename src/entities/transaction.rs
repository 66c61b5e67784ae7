//! Transaction entity - A sale record.
//!
//! Each transaction references the artwork sold, the buyer, the amount and a
//! `status` of `"pending"`, `"completed"` or `"refunded"`. Completed rows are
//! immutable and are the only ones read by reporting.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status value for a completed sale
pub const STATUS_COMPLETED: &str = "completed";

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the artwork sold
    pub artwork_id: i64,
    /// ID of the buying member
    pub buyer_id: i64,
    /// Sale amount in dollars
    pub amount: f64,
    /// `"pending"`, `"completed"` or `"refunded"`
    pub status: String,
    /// When the transaction happened
    pub transaction_time: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one artwork
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
