//! Cart entity - A cart created by a user around an artwork.
//!
//! The flags record what happened to the cart afterwards: converted into an
//! order, abandoned, and (for abandoned carts) recovered by a reminder.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    /// Unique identifier for the cart
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member who created the cart
    pub user_id: i64,
    /// Artwork that was added
    pub artwork_id: i64,
    /// Cart total in dollars
    pub cart_total: f64,
    /// When the cart was created
    pub created_at: DateTimeUtc,
    /// Whether checkout completed
    pub converted_to_order: bool,
    /// Whether the cart was left without checkout
    pub abandoned: bool,
    /// Whether an abandoned cart was later recovered
    pub recovered: bool,
}

/// `Cart` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
