//! Social share entity - An artwork shared to an external platform.
//!
//! Click and engagement counters are updated by the share tracker; reporting
//! only sums them per platform.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Social share database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "social_shares")]
pub struct Model {
    /// Unique identifier for the share
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Shared artwork
    pub artwork_id: i64,
    /// Member who shared it
    pub user_id: i64,
    /// Platform name (e.g., "instagram", "pinterest")
    pub platform: String,
    /// Clicks brought back to the marketplace
    pub click_count: i64,
    /// Likes, comments and reshares on the platform
    pub engagement_count: i64,
    /// When the share was posted
    pub shared_at: DateTimeUtc,
}

/// `SocialShare` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
