//! Social sharing reports.
//!
//! Which artworks spread through sharing, and how each platform performs.

use crate::core::calc;
use crate::core::metrics::{self, PlatformShareTotals, SharedArtwork};
use crate::core::period::{Period, TimeWindow};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument};

/// An artwork needs more views than this in the window to count as viral
pub const VIRAL_MIN_VIEWS: i64 = 10;
/// Viral artworks reported
pub const VIRAL_CONTENT_LIMIT: usize = 20;
/// Most shared artworks reported
pub const TOP_SHARED_LIMIT: usize = 10;

/// Virality figures of one shared artwork.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViralArtwork {
    /// Shared artwork
    pub artwork_id: i64,
    /// Artwork title
    pub title: String,
    /// Name of the artist
    pub artist_name: String,
    /// Views in the window
    pub view_count: i64,
    /// Shares in the window
    pub share_count: i64,
    /// Clicks brought in by the shares
    pub click_count: i64,
    /// Engagement on the shares
    pub engagement_count: i64,
    /// Shares per view, in percent
    pub share_rate: f64,
    /// Engagement per click, in percent
    pub engagement_rate: f64,
    /// See [`calc::virality_score`]
    pub virality_score: f64,
    /// Clicks per share
    pub viral_coefficient: f64,
}

/// Artworks spreading fastest through sharing, most viral first.
///
/// Considers artworks shared in the window with more than
/// [`VIRAL_MIN_VIEWS`] views there, and keeps the top [`VIRAL_CONTENT_LIMIT`].
#[instrument(skip(db))]
pub async fn viral_content(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<Vec<ViralArtwork>> {
    let window = TimeWindow::ending_at(period, now);
    let mut artworks: Vec<ViralArtwork> = metrics::artwork_sharing(db, &window, VIRAL_MIN_VIEWS)
        .await?
        .into_iter()
        .map(|row| {
            let share_rate = calc::share_rate(row.shares, row.views);
            let engagement_rate = calc::engagement_rate(row.engagement, row.clicks);
            ViralArtwork {
                artwork_id: row.artwork_id,
                title: row.title,
                artist_name: row.artist_name,
                view_count: row.views,
                share_count: row.shares,
                click_count: row.clicks,
                engagement_count: row.engagement,
                share_rate,
                engagement_rate,
                virality_score: calc::virality_score(share_rate, engagement_rate),
                viral_coefficient: calc::viral_coefficient(row.clicks, row.shares),
            }
        })
        .collect();

    artworks.sort_by(|a, b| {
        b.virality_score
            .total_cmp(&a.virality_score)
            .then_with(|| a.artwork_id.cmp(&b.artwork_id))
    });
    artworks.truncate(VIRAL_CONTENT_LIMIT);

    info!("Found {} viral artworks", artworks.len());
    Ok(artworks)
}

/// Sharing activity of the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharingAnalytics {
    /// Totals per platform, busiest first
    pub platform_stats: Vec<PlatformShareTotals>,
    /// Most shared artworks
    pub top_shared_artworks: Vec<SharedArtwork>,
}

/// Per-platform sharing totals and the [`TOP_SHARED_LIMIT`] most shared artworks.
#[instrument(skip(db))]
pub async fn sharing_analytics(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<SharingAnalytics> {
    let window = TimeWindow::ending_at(period, now);
    Ok(SharingAnalytics {
        platform_stats: metrics::platform_share_totals(db, &window).await?,
        top_shared_artworks: metrics::top_shared_artworks(db, &window, TOP_SHARED_LIMIT).await?,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_viral_content_ranks_by_virality() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        let at = now - Duration::days(1);
        let artist = create_test_artist(&db, "Ada", false).await?;
        let steady = create_test_artwork(&db, artist.id, ArtworkSeed::new(100.0)).await?;
        let hit = create_test_artwork(&db, artist.id, ArtworkSeed::new(100.0)).await?;
        let unseen = create_test_artwork(&db, artist.id, ArtworkSeed::new(100.0)).await?;

        for _ in 0..20 {
            create_test_view(&db, steady.id, at).await?;
            create_test_view(&db, hit.id, at).await?;
        }
        // 2 shares on 20 views, 10 engagement on 20 clicks: 10 % x 50 %
        create_test_share(&db, steady.id, "x", 10, 5, at).await?;
        create_test_share(&db, steady.id, "x", 10, 5, at).await?;
        // 4 shares on 20 views, 40 engagement on 40 clicks: 20 % x 100 %
        for _ in 0..4 {
            create_test_share(&db, hit.id, "instagram", 10, 10, at).await?;
        }
        // Shared but only 1 view
        create_test_view(&db, unseen.id, at).await?;
        create_test_share(&db, unseen.id, "x", 100, 100, at).await?;

        let viral = viral_content(&db, Period::Week, now).await?;
        assert_eq!(viral.len(), 2);

        assert_eq!(viral[0].artwork_id, hit.id);
        assert_eq!(viral[0].artist_name, "Ada");
        assert_eq!(viral[0].share_rate, 20.0);
        assert_eq!(viral[0].engagement_rate, 100.0);
        assert_eq!(viral[0].virality_score, 20.0);
        assert_eq!(viral[0].viral_coefficient, 10.0);

        assert_eq!(viral[1].artwork_id, steady.id);
        assert_eq!(viral[1].virality_score, 5.0);
        assert_eq!(viral[1].viral_coefficient, 10.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_viral_content_empty_without_shares() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        let artist = create_test_artist(&db, "Ada", false).await?;
        let artwork = create_test_artwork(&db, artist.id, ArtworkSeed::new(100.0)).await?;
        for _ in 0..50 {
            create_test_view(&db, artwork.id, now).await?;
        }

        assert!(viral_content(&db, Period::Week, now).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_sharing_analytics() -> Result<()> {
        let db = setup_test_db().await?;
        let now = test_now();
        let at = now - Duration::days(2);
        let artist = create_test_artist(&db, "Ada", false).await?;

        let mut artworks = Vec::new();
        for _ in 0..12 {
            artworks.push(create_test_artwork(&db, artist.id, ArtworkSeed::new(100.0)).await?);
        }
        for (i, artwork) in artworks.iter().enumerate() {
            create_test_share_by(&db, 1, artwork.id, "pinterest", 1, 1, at).await?;
            if i < 3 {
                create_test_share_by(&db, 2, artwork.id, "instagram", 4, 2, at).await?;
            }
        }

        let analytics = sharing_analytics(&db, Period::Month, now).await?;
        assert_eq!(analytics.platform_stats.len(), 2);
        let pinterest = &analytics.platform_stats[0];
        assert_eq!(pinterest.platform, "pinterest");
        assert_eq!(
            (pinterest.share_count, pinterest.artwork_count, pinterest.user_count),
            (12, 12, 1)
        );
        let instagram = &analytics.platform_stats[1];
        assert_eq!((instagram.click_count, instagram.engagement_count), (12, 6));

        assert_eq!(analytics.top_shared_artworks.len(), TOP_SHARED_LIMIT);
        assert_eq!(analytics.top_shared_artworks[0].artwork_id, artworks[0].id);
        assert_eq!(analytics.top_shared_artworks[0].share_count, 2);
        assert_eq!(analytics.top_shared_artworks[0].platform_count, 2);
        assert_eq!(analytics.top_shared_artworks[3].share_count, 1);
        Ok(())
    }
}
