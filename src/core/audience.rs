//! Audience behaviour reports - purchase funnel, carts and retention.
//!
//! Funnel and cart ratios are fractions in `0..=1`; retention rates are
//! percentages.

use crate::core::brackets::CartPriceRange;
use crate::core::calc;
use crate::core::metrics::{self, CartCounts, FunnelCounts};
use crate::core::period::{Period, TimeWindow};
use crate::entities::{Member, MemberActivity, member, member_activity};
use crate::errors::Result;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Days after registration at which retention is measured
pub const RETENTION_INTERVALS: [i64; 6] = [1, 7, 14, 30, 60, 90];

/// Views, cart additions and purchases with the ratios between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PurchaseFunnel {
    #[serde(flatten)]
    /// Raw counts
    pub counts: FunnelCounts,
    /// Cart additions per view
    pub view_to_cart: f64,
    /// Purchases per cart addition
    pub cart_to_purchase: f64,
    /// Purchases per view
    pub view_to_purchase: f64,
}

impl From<FunnelCounts> for PurchaseFunnel {
    fn from(counts: FunnelCounts) -> Self {
        Self {
            view_to_cart: calc::count_ratio(counts.cart_additions, counts.views),
            cart_to_purchase: calc::count_ratio(counts.purchases, counts.cart_additions),
            view_to_purchase: calc::count_ratio(counts.purchases, counts.views),
            counts,
        }
    }
}

/// Purchase funnel of the window.
#[instrument(skip(db))]
pub async fn purchase_funnel(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<PurchaseFunnel> {
    let window = TimeWindow::ending_at(period, now);
    Ok(metrics::funnel_counts(db, &window).await?.into())
}

/// Cart abandonment and recovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbandonedCarts {
    /// Carts created
    pub total_carts: i64,
    /// Carts abandoned
    pub abandoned_carts: i64,
    /// Abandoned carts later recovered
    pub recovered_carts: i64,
    /// Share of carts that were abandoned
    pub abandonment_rate: f64,
    /// Share of abandoned carts that were recovered
    pub recovery_rate: f64,
}

impl From<CartCounts> for AbandonedCarts {
    fn from(counts: CartCounts) -> Self {
        Self {
            total_carts: counts.total,
            abandoned_carts: counts.abandoned,
            recovered_carts: counts.recovered,
            abandonment_rate: calc::count_ratio(counts.abandoned, counts.total),
            recovery_rate: calc::count_ratio(counts.recovered, counts.abandoned),
        }
    }
}

/// Cart abandonment statistics of the window.
#[instrument(skip(db))]
pub async fn abandoned_carts(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<AbandonedCarts> {
    let window = TimeWindow::ending_at(period, now);
    Ok(metrics::cart_counts(db, &window).await?.into())
}

/// Cart outcomes for one range of cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeSensitivity {
    /// Cart total range
    pub range: CartPriceRange,
    /// Carts created
    pub total: i64,
    /// Carts converted to an order
    pub purchased: i64,
    /// Carts abandoned
    pub abandoned: i64,
    /// Share of carts converted
    pub conversion_rate: f64,
}

/// Conversion of carts per cart-total range, cheapest range first.
///
/// Ranges without carts are omitted.
#[instrument(skip(db))]
pub async fn price_sensitivity(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<Vec<RangeSensitivity>> {
    let window = TimeWindow::ending_at(period, now);
    Ok(metrics::cart_range_counts(db, &window)
        .await?
        .into_iter()
        .map(|counts| RangeSensitivity {
            range: counts.range,
            total: counts.total,
            purchased: counts.purchased,
            abandoned: counts.abandoned,
            conversion_rate: calc::count_ratio(counts.purchased, counts.total),
        })
        .collect())
}

/// Retention at one interval after registration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetentionRate {
    /// Days after registration
    pub days: i64,
    /// Eligible members active on or after the interval
    pub retained_users: i64,
    /// Members whose interval has fully elapsed
    pub eligible_users: i64,
    /// Percentage of eligible members active on or after the interval
    pub retention_rate: f64,
}

/// Retention of the members who registered in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionReport {
    /// Members who registered in the window
    pub total_new_users: i64,
    /// Retention per interval, shortest first
    pub retention_rates: Vec<RetentionRate>,
}

/// Measures how many new members came back after each interval.
///
/// A member is retained at `d` days when they have any activity at or after
/// `registered_at + d`. Members for whom that instant is still in the future
/// are not eligible for the interval.
#[instrument(skip(db))]
pub async fn retention_rates(
    db: &DatabaseConnection,
    period: Period,
    now: DateTime<Utc>,
) -> Result<RetentionReport> {
    let window = TimeWindow::ending_at(period, now);
    let members = Member::find()
        .filter(member::Column::RegisteredAt.gte(window.current_start))
        .filter(member::Column::RegisteredAt.lte(window.now))
        .all(db)
        .await?;

    if members.is_empty() {
        return Ok(RetentionReport {
            total_new_users: 0,
            retention_rates: Vec::new(),
        });
    }

    let member_ids: Vec<i64> = members.iter().map(|m| m.id).collect();
    let mut last_seen: HashMap<i64, DateTime<Utc>> = HashMap::new();
    for activity in MemberActivity::find()
        .filter(member_activity::Column::MemberId.is_in(member_ids))
        .all(db)
        .await?
    {
        last_seen
            .entry(activity.member_id)
            .and_modify(|seen| *seen = (*seen).max(activity.activity_time))
            .or_insert(activity.activity_time);
    }
    debug!(
        "{} new members, {} with activity",
        members.len(),
        last_seen.len()
    );

    let retention_rates = RETENTION_INTERVALS
        .iter()
        .map(|&days| {
            let (mut eligible, mut retained) = (0_i64, 0_i64);
            for member in &members {
                let due = member.registered_at + Duration::days(days);
                if due > now {
                    continue;
                }
                eligible += 1;
                if last_seen.get(&member.id).is_some_and(|seen| *seen >= due) {
                    retained += 1;
                }
            }
            RetentionRate {
                days,
                retained_users: retained,
                eligible_users: eligible,
                retention_rate: calc::count_ratio(retained, eligible) * 100.0,
            }
        })
        .collect();

    Ok(RetentionReport {
        total_new_users: i64::try_from(members.len()).unwrap_or(i64::MAX),
        retention_rates,
    })
}
