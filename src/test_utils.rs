//! Shared test utilities for the reporting core.
//!
//! Provides an in-memory database with every table created, plus helpers that
//! insert seed rows with sensible defaults. Timestamps are whole seconds
//! relative to [`test_now`] so window boundaries are deterministic.

use crate::{
    entities::{
        artist, artist_review, artwork, artwork_like, artwork_view, cart, member,
        member_activity, search_log, social_share, transaction,
    },
    errors::Result,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed anchor instant used by window-based tests.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a test artist.
///
/// # Defaults
/// * `joined_at`: one year before [`test_now`]
pub async fn create_test_artist(
    db: &DatabaseConnection,
    name: &str,
    verified: bool,
) -> Result<artist::Model> {
    let model = artist::ActiveModel {
        name: Set(name.to_string()),
        verified: Set(verified),
        joined_at: Set(test_now() - Duration::days(365)),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Listing attributes for [`create_test_artwork`].
#[derive(Debug, Clone)]
pub struct ArtworkSeed {
    pub price: f64,
    pub category: String,
    pub style: String,
    pub medium: String,
    pub width: f64,
    pub height: f64,
    pub published_at: DateTime<Utc>,
    pub sold_at: Option<DateTime<Utc>>,
}

impl ArtworkSeed {
    /// An available 100x100 oil painting in the "Abstract" style, listed 60
    /// days before [`test_now`].
    pub fn new(price: f64) -> Self {
        Self {
            price,
            category: "painting".to_string(),
            style: "Abstract".to_string(),
            medium: "oil".to_string(),
            width: 100.0,
            height: 100.0,
            published_at: test_now() - Duration::days(60),
            sold_at: None,
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn style(mut self, style: &str) -> Self {
        self.style = style.to_string();
        self
    }

    pub fn medium(mut self, medium: &str) -> Self {
        self.medium = medium.to_string();
        self
    }

    pub const fn size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub const fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = at;
        self
    }

    /// Marks the artwork sold at `at`
    pub const fn sold(mut self, at: DateTime<Utc>) -> Self {
        self.sold_at = Some(at);
        self
    }
}

/// Creates a test artwork for an existing artist.
pub async fn create_test_artwork(
    db: &DatabaseConnection,
    artist_id: i64,
    seed: ArtworkSeed,
) -> Result<artwork::Model> {
    let status = if seed.sold_at.is_some() {
        artwork::STATUS_SOLD
    } else {
        artwork::STATUS_AVAILABLE
    };

    let model = artwork::ActiveModel {
        artist_id: Set(artist_id),
        title: Set(format!("{} {}", seed.style, seed.medium)),
        price: Set(seed.price),
        category: Set(seed.category),
        style: Set(seed.style),
        medium: Set(seed.medium),
        width: Set(seed.width),
        height: Set(seed.height),
        sale_status: Set(status.to_string()),
        published_at: Set(seed.published_at),
        sold_at: Set(seed.sold_at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a transaction with an explicit status.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    artwork_id: i64,
    amount: f64,
    status: &str,
    at: DateTime<Utc>,
) -> Result<transaction::Model> {
    let model = transaction::ActiveModel {
        artwork_id: Set(artwork_id),
        buyer_id: Set(1),
        amount: Set(amount),
        status: Set(status.to_string()),
        transaction_time: Set(at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a completed sale.
pub async fn create_test_sale(
    db: &DatabaseConnection,
    artwork_id: i64,
    amount: f64,
    at: DateTime<Utc>,
) -> Result<transaction::Model> {
    create_test_transaction(db, artwork_id, amount, transaction::STATUS_COMPLETED, at).await
}

/// Records a view of an artwork.
pub async fn create_test_view(
    db: &DatabaseConnection,
    artwork_id: i64,
    at: DateTime<Utc>,
) -> Result<artwork_view::Model> {
    let model = artwork_view::ActiveModel {
        artwork_id: Set(artwork_id),
        user_id: Set(1),
        viewed_at: Set(at),
        duration_secs: Set(Some(30)),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Records a like of an artwork.
pub async fn create_test_like(
    db: &DatabaseConnection,
    artwork_id: i64,
    at: DateTime<Utc>,
) -> Result<artwork_like::Model> {
    let model = artwork_like::ActiveModel {
        artwork_id: Set(artwork_id),
        user_id: Set(1),
        liked_at: Set(at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Cart attributes for [`create_test_cart`].
#[derive(Debug, Clone, Copy)]
pub struct CartSeed {
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub converted: bool,
    pub abandoned: bool,
    pub recovered: bool,
}

impl CartSeed {
    /// An open cart with no outcome yet.
    pub const fn new(total: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            total,
            created_at,
            converted: false,
            abandoned: false,
            recovered: false,
        }
    }

    pub const fn converted(mut self) -> Self {
        self.converted = true;
        self
    }

    pub const fn abandoned(mut self) -> Self {
        self.abandoned = true;
        self
    }

    pub const fn recovered(mut self) -> Self {
        self.recovered = true;
        self
    }
}

/// Creates a cart around an artwork.
pub async fn create_test_cart(
    db: &DatabaseConnection,
    artwork_id: i64,
    seed: CartSeed,
) -> Result<cart::Model> {
    let model = cart::ActiveModel {
        user_id: Set(1),
        artwork_id: Set(artwork_id),
        cart_total: Set(seed.total),
        created_at: Set(seed.created_at),
        converted_to_order: Set(seed.converted),
        abandoned: Set(seed.abandoned),
        recovered: Set(seed.recovered),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a review of an artist, dated at [`test_now`].
pub async fn create_test_review(
    db: &DatabaseConnection,
    artist_id: i64,
    rating: f64,
) -> Result<artist_review::Model> {
    let model = artist_review::ActiveModel {
        artist_id: Set(artist_id),
        rating: Set(rating),
        created_at: Set(test_now()),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Records a share of an artwork on a social platform by user 1.
pub async fn create_test_share(
    db: &DatabaseConnection,
    artwork_id: i64,
    platform: &str,
    clicks: i64,
    engagement: i64,
    at: DateTime<Utc>,
) -> Result<social_share::Model> {
    create_test_share_by(db, 1, artwork_id, platform, clicks, engagement, at).await
}

/// Records a share of an artwork on a social platform by `user_id`.
pub async fn create_test_share_by(
    db: &DatabaseConnection,
    user_id: i64,
    artwork_id: i64,
    platform: &str,
    clicks: i64,
    engagement: i64,
    at: DateTime<Utc>,
) -> Result<social_share::Model> {
    let model = social_share::ActiveModel {
        artwork_id: Set(artwork_id),
        user_id: Set(user_id),
        platform: Set(platform.to_string()),
        click_count: Set(clicks),
        engagement_count: Set(engagement),
        shared_at: Set(at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Creates a member registered at `registered_at`.
pub async fn create_test_member(
    db: &DatabaseConnection,
    registered_at: DateTime<Utc>,
) -> Result<member::Model> {
    let model = member::ActiveModel {
        registered_at: Set(registered_at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Records member activity at `at`.
pub async fn create_test_activity(
    db: &DatabaseConnection,
    member_id: i64,
    at: DateTime<Utc>,
) -> Result<member_activity::Model> {
    let model = member_activity::ActiveModel {
        member_id: Set(member_id),
        activity_time: Set(at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Logs an anonymous search for `term` at `at`.
pub async fn create_test_search(
    db: &DatabaseConnection,
    term: &str,
    at: DateTime<Utc>,
) -> Result<search_log::Model> {
    let model = search_log::ActiveModel {
        user_id: Set(None),
        search_term: Set(term.to_string()),
        searched_at: Set(at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}
