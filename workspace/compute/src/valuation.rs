//! EBITDA-multiple valuation.
//!
//! A business is valued at its EBITDA times a multiplier chosen by revenue
//! band. Bands are inclusive at the lower bound:
//!
//! | revenue      | multiplier |
//! |--------------|-----------:|
//! | < 1B         | 1.0        |
//! | [1B, 5B)     | 2.0        |
//! | [5B, 10B)    | 3.0        |
//! | [10B, 50B)   | 4.0        |
//! | >= 50B       | 5.0        |
//!
//! Non-positive EBITDA always yields a market cap of zero.

use model::entities::financial;
use rust_decimal::Decimal;

const BILLION: i64 = 1_000_000_000;

/// Revenue floors paired with their multiplier, highest band first.
const REVENUE_TIERS: [(i64, i64); 4] = [
    (50 * BILLION, 5),
    (10 * BILLION, 4),
    (5 * BILLION, 3),
    (BILLION, 2),
];

/// Multiplier applied to EBITDA for a business with the given revenue.
pub fn ebitda_multiplier(revenue: Decimal) -> Decimal {
    REVENUE_TIERS
        .iter()
        .find(|(floor, _)| revenue >= Decimal::from(*floor))
        .map(|(_, multiplier)| Decimal::from(*multiplier))
        .unwrap_or(Decimal::ONE)
}

/// Estimated market capitalisation. Saturates instead of overflowing.
pub fn market_cap(ebitda: Decimal, revenue: Decimal) -> Decimal {
    if ebitda <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ebitda
        .checked_mul(ebitda_multiplier(revenue))
        .unwrap_or(Decimal::MAX)
}

/// Multiplier and market cap computed together for one financial position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Valuation {
    pub ebitda_multiplier: Decimal,
    pub market_cap: Decimal,
}

impl Valuation {
    pub fn of(revenue: Decimal, ebitda: Decimal) -> Self {
        Self {
            ebitda_multiplier: ebitda_multiplier(revenue),
            market_cap: market_cap(ebitda, revenue),
        }
    }

    /// Valuation of a business, or the zero valuation when it has no financials yet.
    pub fn for_current(current: Option<&financial::Model>) -> Self {
        match current {
            Some(f) => Self::of(f.revenue, f.ebitda),
            None => Self::of(Decimal::ZERO, Decimal::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billions(n: i64) -> Decimal {
        Decimal::from(n * BILLION)
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ebitda_multiplier(Decimal::ZERO), Decimal::ONE);
        assert_eq!(ebitda_multiplier(billions(1) - Decimal::ONE), Decimal::ONE);
        assert_eq!(ebitda_multiplier(billions(1)), Decimal::from(2));
        assert_eq!(ebitda_multiplier(billions(5) - Decimal::new(1, 2)), Decimal::from(2));
        assert_eq!(ebitda_multiplier(billions(5)), Decimal::from(3));
        assert_eq!(ebitda_multiplier(billions(10)), Decimal::from(4));
        assert_eq!(ebitda_multiplier(billions(49)), Decimal::from(4));
        assert_eq!(ebitda_multiplier(billions(50)), Decimal::from(5));
        assert_eq!(ebitda_multiplier(billions(5_000)), Decimal::from(5));
    }

    #[test]
    fn test_multiplier_is_monotone_and_bounded() {
        let allowed: Vec<Decimal> = (1..=5).map(Decimal::from).collect();
        let mut previous = ebitda_multiplier(Decimal::from(-1));

        // Walk from below zero to well past the top band in 250M steps
        for step in -4..=240 {
            let revenue = Decimal::from(step * 250_000_000i64);
            let multiplier = ebitda_multiplier(revenue);
            assert!(allowed.contains(&multiplier), "unexpected multiplier {}", multiplier);
            assert!(multiplier >= previous, "multiplier dropped at revenue {}", revenue);
            previous = multiplier;
        }
    }

    #[test]
    fn test_non_positive_ebitda_has_no_market_cap() {
        assert_eq!(market_cap(Decimal::ZERO, billions(60)), Decimal::ZERO);
        assert_eq!(market_cap(Decimal::from(-500), billions(60)), Decimal::ZERO);
        assert_eq!(market_cap(Decimal::from(-1), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_mid_band_example() {
        let valuation = Valuation::of(billions(4), Decimal::from(500_000_000));
        assert_eq!(valuation.ebitda_multiplier, Decimal::from(2));
        assert_eq!(valuation.market_cap, billions(1));
    }

    #[test]
    fn test_missing_financials_value_at_zero() {
        let valuation = Valuation::for_current(None);
        assert_eq!(valuation.ebitda_multiplier, Decimal::ONE);
        assert_eq!(valuation.market_cap, Decimal::ZERO);
    }

    #[test]
    fn test_market_cap_saturates() {
        assert_eq!(market_cap(Decimal::MAX, billions(60)), Decimal::MAX);
    }
}
