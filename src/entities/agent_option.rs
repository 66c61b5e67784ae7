//! Agent option entity - Stores key-value pairs for runtime settings.
//! Used by the typed configuration store for agent tuning parameters,
//! feature toggles and the API key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Agent option database model - stores key-value configuration pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agent_options")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Option key (e.g., `"vortex_cloe_learning_rate"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Option value stored as string
    pub value: String,
    /// When this option was last modified
    pub updated_at: DateTime,
}

/// `AgentOption` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
