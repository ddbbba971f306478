use serde::{Deserialize, Serialize};

use crate::provision::ConfigureSummary;

/// Storage-event trigger payload; both fields are informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigureRequest {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigureResponse {
    #[serde(flatten)]
    pub summary: ConfigureSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: Option<serde_json::Value>,
}
