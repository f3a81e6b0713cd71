use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===================== Legal comparison =====================

/// One remediation step towards obtaining a missing document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LegalStep {
    /// 1-based position in the step list
    #[serde(default)]
    pub step_number: i32,
    pub description: String,
    /// Where the step can be completed online, if anywhere
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// A required document type and whether the business already holds it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LegalRequirement {
    /// Document type, e.g. "NIB", "Halal", "BPOM"
    #[serde(rename = "type")]
    pub legal_type: String,
    #[serde(default)]
    pub has_legal: bool,
    #[serde(default)]
    pub notes: Option<String>,
    /// Empty when `has_legal` is true
    #[serde(default)]
    pub steps: Vec<LegalStep>,
}

/// Requirements attached to a single product, keyed by product name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProductLegalRequirements {
    pub product_name: String,
    #[serde(default)]
    pub required: Vec<LegalRequirement>,
}

/// Business-level and per-product view of required versus filed documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LegalComparison {
    #[serde(default)]
    pub required: Vec<LegalRequirement>,
    #[serde(default)]
    pub products: Vec<ProductLegalRequirements>,
}

impl LegalRequirement {
    /// A requirement already satisfied by a filed document.
    pub fn satisfied(legal_type: impl Into<String>, notes: Option<String>) -> Self {
        Self {
            legal_type: legal_type.into(),
            has_legal: true,
            notes,
            steps: Vec::new(),
        }
    }
}

impl LegalComparison {
    /// Number of requirements, business-level and product-level, that are not yet met.
    pub fn missing_count(&self) -> usize {
        let business = self.required.iter().filter(|r| !r.has_legal).count();
        let products: usize = self
            .products
            .iter()
            .map(|p| p.required.iter().filter(|r| !r.has_legal).count())
            .sum();
        business + products
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_uses_type_key_and_tolerates_missing_fields() {
        let raw = r#"{"type": "NIB", "steps": [{"description": "Register on OSS"}]}"#;
        let requirement: LegalRequirement = serde_json::from_str(raw).unwrap();

        assert_eq!(requirement.legal_type, "NIB");
        assert!(!requirement.has_legal);
        assert_eq!(requirement.notes, None);
        assert_eq!(requirement.steps[0].step_number, 0);

        let json = serde_json::to_value(&requirement).unwrap();
        assert_eq!(json["type"], "NIB");
        assert!(json.get("legal_type").is_none());
    }

    #[test]
    fn test_missing_count_spans_business_and_products() {
        let comparison = LegalComparison {
            required: vec![
                LegalRequirement::satisfied("NIB", None),
                LegalRequirement {
                    legal_type: "NPWP".to_string(),
                    has_legal: false,
                    notes: None,
                    steps: vec![],
                },
            ],
            products: vec![ProductLegalRequirements {
                product_name: "Sambal".to_string(),
                required: vec![LegalRequirement {
                    legal_type: "PIRT".to_string(),
                    has_legal: false,
                    notes: None,
                    steps: vec![],
                }],
            }],
        };

        assert_eq!(comparison.missing_count(), 2);
    }
}
