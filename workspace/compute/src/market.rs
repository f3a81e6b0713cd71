//! Marketplace queries: the paginated public listing and the aggregate
//! figures used to ground investment advice.

use model::entities::{business, financial};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, Query},
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::financial::current_financials;
use crate::pagination::PageRequest;

/// Most businesses handed to the provider as advice context.
pub const ADVICE_CANDIDATE_LIMIT: u64 = 8;

/// Filters accepted by the public listing.
#[derive(Debug, Clone, Default)]
pub struct MarketFilter {
    /// Exact industry match
    pub industry: Option<String>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MarketPage {
    pub businesses: Vec<business::Model>,
    pub total: u64,
    pub page: PageRequest,
}

impl MarketPage {
    pub fn total_pages(&self) -> u64 {
        self.page.total_pages(self.total)
    }
}

const LIKE_ESCAPE: char = '\\';

/// `%needle%` with the needle's own wildcards taken literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `LOWER(column) LIKE '%needle%' ESCAPE '\'`
fn contains_ci(column: business::Column, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col((business::Entity, column))))
        .like(LikeExpr::new(like_pattern(needle)).escape(LIKE_ESCAPE))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One page of live businesses, newest first.
#[instrument(skip(db))]
pub async fn list_businesses<C: ConnectionTrait>(
    db: &C,
    filter: &MarketFilter,
    page: PageRequest,
) -> Result<MarketPage> {
    let mut query = business::Entity::find().filter(business::Column::DeletedAt.is_null());

    if let Some(industry) = non_blank(filter.industry.as_deref()) {
        query = query.filter(business::Column::Industry.eq(industry));
    }
    if let Some(search) = non_blank(filter.search.as_deref()) {
        query = query.filter(
            Condition::any()
                .add(contains_ci(business::Column::Name, search))
                .add(contains_ci(business::Column::Description, search)),
        );
    }

    let total = query.clone().count(db).await?;
    let businesses = query
        .order_by_desc(business::Column::CreatedAt)
        .order_by_desc(business::Column::Id)
        .offset(page.offset())
        .limit(page.limit)
        .all(db)
        .await?;

    debug!(
        "Marketplace page {} returned {} of {} businesses",
        page.page,
        businesses.len(),
        total
    );
    Ok(MarketPage {
        businesses,
        total,
        page,
    })
}

/// Aggregate view of the marketplace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketStats {
    pub total_businesses: u64,
    pub businesses_with_financials: u64,
    /// (industry, business count), most common first
    pub industries: Vec<(String, u64)>,
    pub average_revenue: Decimal,
    pub average_ebitda: Decimal,
    pub average_assets: Decimal,
    pub average_equity: Decimal,
}

/// Mean of `values`. Never overflows: when the plain sum does not fit, the
/// values are scaled down first and the result saturates.
fn average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let count = Decimal::from(values.len());
    match values
        .iter()
        .try_fold(Decimal::ZERO, |sum, v| sum.checked_add(*v))
    {
        Some(sum) => sum / count,
        None => values
            .iter()
            .fold(Decimal::ZERO, |mean, v| mean.saturating_add(*v / count)),
    }
}

#[instrument(skip(db))]
pub async fn market_statistics<C: ConnectionTrait>(db: &C) -> Result<MarketStats> {
    let ids: Vec<i32> = business::Entity::find()
        .select_only()
        .column(business::Column::Id)
        .filter(business::Column::DeletedAt.is_null())
        .into_tuple()
        .all(db)
        .await?;

    let industry_counts: Vec<(Option<String>, i64)> = business::Entity::find()
        .select_only()
        .column(business::Column::Industry)
        .column_as(Expr::col(business::Column::Id).count(), "count")
        .filter(business::Column::DeletedAt.is_null())
        .group_by(business::Column::Industry)
        .into_tuple()
        .all(db)
        .await?;

    let mut industries: Vec<(String, u64)> = industry_counts
        .into_iter()
        .filter_map(|(industry, count)| {
            let industry = industry?.trim().to_string();
            (!industry.is_empty()).then_some((industry, count.max(0) as u64))
        })
        .collect();
    industries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let current: Vec<financial::Model> = current_financials(db, &ids).await?.into_values().collect();
    let column = |pick: fn(&financial::Model) -> Decimal| -> Vec<Decimal> {
        current.iter().map(pick).collect()
    };

    Ok(MarketStats {
        total_businesses: ids.len() as u64,
        businesses_with_financials: current.len() as u64,
        industries,
        average_revenue: average(&column(|f: &financial::Model| f.revenue)),
        average_ebitda: average(&column(|f: &financial::Model| f.ebitda)),
        average_assets: average(&column(|f: &financial::Model| f.assets)),
        average_equity: average(&column(|f: &financial::Model| f.equity)),
    })
}

/// A business offered to the provider as advice context.
#[derive(Debug, Clone)]
pub struct AdviceCandidate {
    pub business: business::Model,
    pub financial: Option<financial::Model>,
}

/// Businesses relevant to a question, at most [`ADVICE_CANDIDATE_LIMIT`].
/// Any keyword may match name, description, industry or business type;
/// businesses with financials come first, then newest.
#[instrument(skip(db))]
pub async fn advice_candidates<C: ConnectionTrait>(
    db: &C,
    keywords: &[String],
    industry: Option<&str>,
) -> Result<Vec<AdviceCandidate>> {
    let mut query = business::Entity::find().filter(business::Column::DeletedAt.is_null());

    if !keywords.is_empty() {
        let mut any = Condition::any();
        for keyword in keywords {
            any = any
                .add(contains_ci(business::Column::Name, keyword))
                .add(contains_ci(business::Column::Description, keyword))
                .add(contains_ci(business::Column::Industry, keyword))
                .add(contains_ci(business::Column::BusinessType, keyword));
        }
        query = query.filter(any);
    }
    if let Some(industry) = non_blank(industry) {
        query = query.filter(business::Column::Industry.eq(industry));
    }

    // Businesses that have filed at least one statement
    let funded_ids = Query::select()
        .distinct()
        .column(financial::Column::BusinessId)
        .from(financial::Entity)
        .to_owned();

    let funded = query
        .clone()
        .filter(business::Column::Id.in_subquery(funded_ids.clone()))
        .order_by_desc(business::Column::CreatedAt)
        .order_by_desc(business::Column::Id)
        .limit(ADVICE_CANDIDATE_LIMIT)
        .all(db)
        .await?;

    let remaining = ADVICE_CANDIDATE_LIMIT.saturating_sub(funded.len() as u64);
    let plain = if remaining > 0 {
        query
            .filter(business::Column::Id.not_in_subquery(funded_ids))
            .order_by_desc(business::Column::CreatedAt)
            .order_by_desc(business::Column::Id)
            .limit(remaining)
            .all(db)
            .await?
    } else {
        Vec::new()
    };

    let ids: Vec<i32> = funded.iter().map(|b| b.id).collect();
    let mut financials = current_financials(db, &ids).await?;

    let candidates: Vec<AdviceCandidate> = funded
        .into_iter()
        .map(|business| AdviceCandidate {
            financial: financials.remove(&business.id),
            business,
        })
        .chain(plain.into_iter().map(|business| AdviceCandidate {
            business,
            financial: None,
        }))
        .collect();

    debug!("Selected {} advice candidate(s)", candidates.len());
    Ok(candidates)
}
