//! Transport types shared by the API and the analysis layer.
//!
//! These shapes are serialized verbatim into HTTP responses and are also the
//! structures the AI provider is asked to fill in, so field names here are part
//! of the public contract.

mod insights;
mod legal;

pub use insights::{
    BusinessProjections, BusinessSuggestion, BusinessSuggestions, InferredProducts,
    InvestmentAdvice, ProjectionYear,
};
pub use legal::{LegalComparison, LegalRequirement, LegalStep, ProductLegalRequirements};
