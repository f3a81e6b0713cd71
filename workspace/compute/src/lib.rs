//! Domain logic behind the marketplace API: valuation, financial history,
//! investment transitions, cached AI insights, legal requirement
//! reconciliation and the small helpers list endpoints share.

pub mod error;
pub mod financial;
pub mod insights;
pub mod investment;
pub mod legal;
pub mod market;
pub mod pagination;
pub mod projection;
pub mod valuation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ComputeError, Result};
pub use valuation::Valuation;
