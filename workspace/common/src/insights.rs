use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===================== Suggestions =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BusinessSuggestion {
    pub suggestion: String,
    /// e.g. "marketing", "operations", "finance"
    pub category: String,
    /// "high", "medium" or "low"
    pub priority: String,
}

/// A stored or freshly generated set of improvement suggestions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BusinessSuggestions {
    pub business_name: String,
    pub suggestions: Vec<BusinessSuggestion>,
    pub generated_at: DateTime<Utc>,
}

// ===================== Projections =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProjectionYear {
    pub year: i32,
    pub revenue: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub cash_flow: f64,
}

/// A multi-year projection together with figures derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BusinessProjections {
    pub business_name: String,
    pub projections: Vec<ProjectionYear>,
    pub generated_at: DateTime<Utc>,
    /// Sum of projected revenue across all years
    pub total_projected_revenue: f64,
    /// Mean year-over-year revenue growth, e.g. "12.5%", or "N/A"
    pub average_growth_rate: String,
    /// First year with positive net income, or "N/A"
    pub break_even_year: String,
}

// ===================== Other AI answers =====================

/// Product names read out of an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct InferredProducts {
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct InvestmentAdvice {
    pub answer: String,
    /// Keywords extracted from the question and used to pick businesses
    pub keywords: Vec<String>,
    /// Businesses that were given to the provider as context
    pub referenced_business_ids: Vec<i32>,
}
