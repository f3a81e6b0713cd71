//! Shapes the provider is asked to produce, both as response schemas sent
//! with the request and as the structs its output is read into.

use common::{BusinessSuggestion, ProjectionYear};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

/// One block of a free-form chat answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ChatSection {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub response: String,
}

/// Suggestions as produced by the provider. Its own timestamp is not trusted.
#[derive(Debug, Deserialize)]
pub struct GeneratedSuggestions {
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub suggestions: Vec<BusinessSuggestion>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedProjections {
    #[serde(default)]
    pub projections: Vec<ProjectionYear>,
}

fn legal_requirement_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "type": {"type": "STRING"},
            "has_legal": {"type": "BOOLEAN"},
            "notes": {"type": "STRING"},
            "steps": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "step_number": {"type": "INTEGER"},
                        "description": {"type": "STRING"},
                        "redirect_url": {"type": "STRING"}
                    }
                }
            }
        },
        "required": ["type"]
    })
}

pub fn legal_comparison_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "required": {"type": "ARRAY", "items": legal_requirement_schema()},
            "products": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "product_name": {"type": "STRING"},
                        "required": {"type": "ARRAY", "items": legal_requirement_schema()}
                    }
                }
            }
        }
    })
}

pub fn suggestions_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "business_name": {"type": "STRING"},
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "suggestion": {"type": "STRING"},
                        "category": {"type": "STRING"},
                        "priority": {"type": "STRING", "enum": ["High", "Medium", "Low"]}
                    },
                    "required": ["suggestion", "category", "priority"]
                }
            },
            "generated_at": {"type": "STRING"}
        },
        "required": ["suggestions"]
    })
}

pub fn projections_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "business_name": {"type": "STRING"},
            "projections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "year": {"type": "INTEGER"},
                        "revenue": {"type": "NUMBER"},
                        "expenses": {"type": "NUMBER"},
                        "net_income": {"type": "NUMBER"},
                        "cash_flow": {"type": "NUMBER"}
                    },
                    "required": ["year", "revenue", "expenses", "net_income", "cash_flow"]
                }
            }
        },
        "required": ["projections"]
    })
}

/// Product inference asks for a single comma-separated string.
pub fn product_list_schema() -> Value {
    json!({"type": "STRING"})
}

pub fn chat_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "header": {"type": "STRING"},
                "response": {"type": "STRING"}
            },
            "propertyOrdering": ["header", "response"]
        }
    })
}
