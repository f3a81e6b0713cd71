//! Stored snapshots of AI-generated suggestions and projections.
//!
//! Snapshots are append-only; reads return the most recently generated one.

use chrono::{DateTime, Utc};
use common::{BusinessSuggestion, BusinessSuggestions, ProjectionYear};
use model::entities::{
    business_ai_suggestion, business_ai_suggestion_item, business_projection,
    business_projection_item,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};

/// A stored projection run, before summary figures are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProjection {
    pub business_name: String,
    pub projections: Vec<ProjectionYear>,
    pub generated_at: DateTime<Utc>,
}

#[instrument(skip(db))]
pub async fn latest_suggestions<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
) -> Result<Option<BusinessSuggestions>> {
    let Some(header) = business_ai_suggestion::Entity::find()
        .filter(business_ai_suggestion::Column::BusinessId.eq(business_id))
        .order_by_desc(business_ai_suggestion::Column::GeneratedAt)
        .order_by_desc(business_ai_suggestion::Column::Id)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let suggestions = business_ai_suggestion_item::Entity::find()
        .filter(business_ai_suggestion_item::Column::SuggestionId.eq(header.id))
        .order_by_asc(business_ai_suggestion_item::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|item| BusinessSuggestion {
            suggestion: item.suggestion,
            category: item.category,
            priority: item.priority,
        })
        .collect();

    Ok(Some(BusinessSuggestions {
        business_name: header.business_name,
        suggestions,
        generated_at: header.generated_at,
    }))
}

/// Store a suggestion snapshot with its items in one transaction.
#[instrument(skip(db, snapshot))]
pub async fn store_suggestions<C>(db: &C, business_id: i32, snapshot: &BusinessSuggestions) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let now = Utc::now();

    let header = business_ai_suggestion::ActiveModel {
        business_id: Set(business_id),
        business_name: Set(snapshot.business_name.clone()),
        generated_at: Set(snapshot.generated_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| ComputeError::from_write("Storing suggestion snapshot", e))?;

    for item in &snapshot.suggestions {
        business_ai_suggestion_item::ActiveModel {
            suggestion_id: Set(header.id),
            suggestion: Set(item.suggestion.clone()),
            category: Set(item.category.clone()),
            priority: Set(item.priority.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    debug!(
        "Stored {} suggestion(s) for business {}",
        snapshot.suggestions.len(),
        business_id
    );
    Ok(())
}

#[instrument(skip(db))]
pub async fn latest_projection<C: ConnectionTrait>(
    db: &C,
    business_id: i32,
) -> Result<Option<StoredProjection>> {
    let Some(header) = business_projection::Entity::find()
        .filter(business_projection::Column::BusinessId.eq(business_id))
        .order_by_desc(business_projection::Column::GeneratedAt)
        .order_by_desc(business_projection::Column::Id)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let projections = business_projection_item::Entity::find()
        .filter(business_projection_item::Column::ProjectionId.eq(header.id))
        .order_by_asc(business_projection_item::Column::Year)
        .all(db)
        .await?
        .into_iter()
        .map(|item| ProjectionYear {
            year: item.year,
            revenue: item.revenue,
            expenses: item.expenses,
            net_income: item.net_income,
            cash_flow: item.cash_flow,
        })
        .collect();

    Ok(Some(StoredProjection {
        business_name: header.business_name,
        projections,
        generated_at: header.generated_at,
    }))
}

#[instrument(skip(db, snapshot))]
pub async fn store_projection<C>(db: &C, business_id: i32, snapshot: &StoredProjection) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let now = Utc::now();

    let header = business_projection::ActiveModel {
        business_id: Set(business_id),
        business_name: Set(snapshot.business_name.clone()),
        generated_at: Set(snapshot.generated_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| ComputeError::from_write("Storing projection snapshot", e))?;

    for year in &snapshot.projections {
        business_projection_item::ActiveModel {
            projection_id: Set(header.id),
            year: Set(year.year),
            revenue: Set(year.revenue),
            expenses: Set(year.expenses),
            net_income: Set(year.net_income),
            cash_flow: Set(year.cash_flow),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(())
}
