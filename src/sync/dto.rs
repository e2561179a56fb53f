use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The shared planner document, stored as-is.
///
/// Fields are raw JSON: the endpoint replaces whatever it is given and does
/// not check shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerDocument {
    #[serde(default)]
    pub users: Value,
    #[serde(default)]
    pub availability: Value,
}

impl Default for PlannerDocument {
    fn default() -> Self {
        Self {
            users: json!([]),
            availability: json!({}),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatePlannerResponse {
    pub message: &'static str,
}

impl UpdatePlannerResponse {
    pub fn updated() -> Self {
        Self {
            message: "Data updated successfully",
        }
    }
}
