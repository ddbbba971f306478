use serde::{Deserialize, Serialize};

use crate::scan::ScanSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub project_id: String,
    #[serde(flatten)]
    pub summary: ScanSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub details: Option<serde_json::Value>,
}
