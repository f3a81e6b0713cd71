//! Figures derived from a multi-year projection.

use common::ProjectionYear;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSummary {
    pub total_projected_revenue: f64,
    /// Mean year-over-year revenue growth in percent
    pub average_growth_rate: Option<f64>,
    /// First year with positive net income
    pub break_even_year: Option<i32>,
}

impl ProjectionSummary {
    pub fn growth_rate_label(&self) -> String {
        self.average_growth_rate
            .map(|rate| format!("{:.1}%", rate))
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn break_even_label(&self) -> String {
        self.break_even_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Summarise projected years. Years are considered in chronological order
/// regardless of input order; a growth pair is skipped when the earlier
/// revenue is not positive.
pub fn summarize(items: &[ProjectionYear]) -> ProjectionSummary {
    let mut years: Vec<&ProjectionYear> = items.iter().collect();
    years.sort_by_key(|item| item.year);

    let total_projected_revenue = years.iter().map(|item| item.revenue).sum();

    let growth: Vec<f64> = years
        .windows(2)
        .filter(|pair| pair[0].revenue > 0.0)
        .map(|pair| (pair[1].revenue - pair[0].revenue) / pair[0].revenue * 100.0)
        .collect();
    let average_growth_rate = if growth.is_empty() {
        None
    } else {
        Some(growth.iter().sum::<f64>() / growth.len() as f64)
    };

    let break_even_year = years
        .iter()
        .find(|item| item.net_income > 0.0)
        .map(|item| item.year);

    ProjectionSummary {
        total_projected_revenue,
        average_growth_rate,
        break_even_year,
    }
}
