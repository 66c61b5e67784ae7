//! Search log entity - One marketplace search. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Search log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "search_logs")]
pub struct Model {
    /// Unique identifier for the search
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Searching member, absent for anonymous visitors
    pub user_id: Option<i64>,
    /// Term as typed by the user
    pub search_term: String,
    /// When the search ran
    pub searched_at: DateTimeUtc,
}

/// `SearchLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
