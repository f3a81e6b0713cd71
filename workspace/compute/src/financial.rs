//! Append-only financial history.
//!
//! Every write inserts a new row; the current position of a business is the
//! row with the latest `created_at`, ties broken by the highest id.

use std::collections::HashMap;

use chrono::Utc;
use model::entities::financial;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};

/// Fields a caller may supply for a new financial row. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialPatch {
    pub revenue: Option<Decimal>,
    pub ebitda: Option<Decimal>,
    pub assets: Option<Decimal>,
    pub liabilities: Option<Decimal>,
    pub equity: Option<Decimal>,
    pub report_file_url: Option<String>,
    pub notes: Option<String>,
}

impl FinancialPatch {
    pub fn is_empty(&self) -> bool {
        *self == FinancialPatch::default()
    }

    /// Overlay the provided fields onto `base`, or onto zeroes when there is no base.
    fn resolve(self, business_id: i32, base: Option<&financial::Model>) -> financial::ActiveModel {
        let now = Utc::now();
        let pick = |value: Option<Decimal>, previous: Option<Decimal>| {
            value.or(previous).unwrap_or(Decimal::ZERO)
        };

        financial::ActiveModel {
            business_id: Set(business_id),
            revenue: Set(pick(self.revenue, base.map(|b| b.revenue))),
            ebitda: Set(pick(self.ebitda, base.map(|b| b.ebitda))),
            assets: Set(pick(self.assets, base.map(|b| b.assets))),
            liabilities: Set(pick(self.liabilities, base.map(|b| b.liabilities))),
            equity: Set(pick(self.equity, base.map(|b| b.equity))),
            report_file_url: Set(self
                .report_file_url
                .or_else(|| base.and_then(|b| b.report_file_url.clone()))),
            notes: Set(self.notes.or_else(|| base.and_then(|b| b.notes.clone()))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

/// Most recent financial row of a business, if any.
#[instrument(skip(db))]
pub async fn current_financial<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
) -> Result<Option<financial::Model>> {
    let current = financial::Entity::find()
        .filter(financial::Column::BusinessId.eq(business_id))
        .order_by_desc(financial::Column::CreatedAt)
        .order_by_desc(financial::Column::Id)
        .one(db)
        .await?;
    Ok(current)
}

/// Current financial row for each of the given businesses.
pub async fn current_financials<C: ConnectionTrait>(
    db: &C,
    business_ids: &[i32],
) -> Result<HashMap<i32, financial::Model>> {
    if business_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = financial::Entity::find()
        .filter(financial::Column::BusinessId.is_in(business_ids.to_vec()))
        .order_by_desc(financial::Column::CreatedAt)
        .order_by_desc(financial::Column::Id)
        .all(db)
        .await?;

    let mut latest = HashMap::new();
    for row in rows {
        // Rows arrive newest first, so the first one seen per business wins
        latest.entry(row.business_id).or_insert(row);
    }
    Ok(latest)
}

/// Full history of a business, newest first.
pub async fn financial_history<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
) -> Result<Vec<financial::Model>> {
    let rows = financial::Entity::find()
        .filter(financial::Column::BusinessId.eq(business_id))
        .order_by_desc(financial::Column::CreatedAt)
        .order_by_desc(financial::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

/// Record a fresh statement. Fields not provided are stored as zero.
#[instrument(skip(db))]
pub async fn append_financial<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
    patch: FinancialPatch,
) -> Result<financial::Model> {
    let row = patch.resolve(business_id, None).insert(db).await?;
    info!("Recorded financial {} for business {}", row.id, business_id);
    Ok(row)
}

/// Record a revision: the current row with the provided fields replaced.
#[instrument(skip(db))]
pub async fn append_revision<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
    patch: FinancialPatch,
) -> Result<financial::Model> {
    let current = current_financial(db, business_id)
        .await?
        .ok_or(ComputeError::NoFinancials(business_id))?;
    debug!("Revising financial {} for business {}", current.id, business_id);

    let row = patch.resolve(business_id, Some(&current)).insert(db).await?;
    info!(
        "Recorded financial revision {} (from {}) for business {}",
        row.id, current.id, business_id
    );
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_business, setup_db};

    fn amount(n: i64) -> Option<Decimal> {
        Some(Decimal::from(n))
    }

    #[tokio::test]
    async fn test_append_defaults_missing_fields_to_zero() {
        let db = setup_db().await;
        let business = seed_business(&db, "Toko Roti").await;

        let row = append_financial(
            &db,
            business.id,
            FinancialPatch {
                revenue: amount(1_200),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(row.revenue, Decimal::from(1_200));
        assert_eq!(row.ebitda, Decimal::ZERO);
        assert_eq!(row.notes, None);
    }

    #[tokio::test]
    async fn test_current_is_latest_row() {
        let db = setup_db().await;
        let business = seed_business(&db, "Toko Roti").await;

        assert!(current_financial(&db, business.id).await.unwrap().is_none());

        for revenue in [100, 200, 300] {
            append_financial(
                &db,
                business.id,
                FinancialPatch {
                    revenue: amount(revenue),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let current = current_financial(&db, business.id).await.unwrap().unwrap();
        assert_eq!(current.revenue, Decimal::from(300));

        let history = financial_history(&db, business.id).await.unwrap();
        let revenues: Vec<Decimal> = history.iter().map(|f| f.revenue).collect();
        assert_eq!(
            revenues,
            vec![Decimal::from(300), Decimal::from(200), Decimal::from(100)]
        );
    }

    #[tokio::test]
    async fn test_revision_keeps_unpatched_fields_and_never_edits_in_place() {
        let db = setup_db().await;
        let business = seed_business(&db, "Toko Roti").await;

        let first = append_financial(
            &db,
            business.id,
            FinancialPatch {
                revenue: amount(4_000),
                ebitda: amount(500),
                notes: Some("audited".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let revised = append_revision(
            &db,
            business.id,
            FinancialPatch {
                ebitda: amount(650),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_ne!(revised.id, first.id);
        assert_eq!(revised.revenue, Decimal::from(4_000));
        assert_eq!(revised.ebitda, Decimal::from(650));
        assert_eq!(revised.notes.as_deref(), Some("audited"));

        let history = financial_history(&db, business.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].ebitda, Decimal::from(500));
    }

    #[tokio::test]
    async fn test_revision_without_history_fails() {
        let db = setup_db().await;
        let business = seed_business(&db, "Toko Roti").await;

        let result = append_revision(&db, business.id, FinancialPatch::default()).await;
        assert!(matches!(result, Err(ComputeError::NoFinancials(id)) if id == business.id));
    }

    #[tokio::test]
    async fn test_current_financials_batches_per_business() {
        let db = setup_db().await;
        let bakery = seed_business(&db, "Toko Roti").await;
        let laundry = seed_business(&db, "Laundry Kilat").await;
        let idle = seed_business(&db, "Belum Ada").await;

        for (id, revenue) in [(bakery.id, 1), (laundry.id, 7), (bakery.id, 2)] {
            append_financial(
                &db,
                id,
                FinancialPatch {
                    revenue: amount(revenue),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let latest = current_financials(&db, &[bakery.id, laundry.id, idle.id])
            .await
            .unwrap();
        assert_eq!(latest[&bakery.id].revenue, Decimal::from(2));
        assert_eq!(latest[&laundry.id].revenue, Decimal::from(7));
        assert!(!latest.contains_key(&idle.id));
    }
}
