//! Design planning data: extracted dimensions and the modeling brief.

use serde::{Deserialize, Serialize};

/// Free-form dimension set extracted from the user's request.
///
/// Shape is model-defined except for one required key: `object_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Dimensions(pub serde_json::Map<String, serde_json::Value>);

impl Dimensions {
    /// The required object classification, when present.
    pub fn object_type(&self) -> Option<&str> {
        self.0.get("object_type").and_then(|v| v.as_str())
    }

    /// Minimum contract for proceeding to design planning.
    pub fn validate(&self) -> Result<(), String> {
        if !self.0.contains_key("object_type") {
            return Err("Missing object_type".to_string());
        }
        Ok(())
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}

/// Structured modeling plan produced by the design-brief call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DesignBrief {
    pub object_name: String,
    pub summary: String,
    pub design_instructions: Vec<String>,
}

impl DesignBrief {
    /// Reject briefs the generator cannot work from.
    pub fn validate(&self) -> Result<(), String> {
        if self.object_name.trim().is_empty() {
            return Err("object_name must be non-empty".to_string());
        }
        if self.design_instructions.is_empty() {
            return Err("design_instructions must contain at least one step".to_string());
        }
        Ok(())
    }
}
