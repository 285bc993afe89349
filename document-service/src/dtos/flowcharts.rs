use crate::models::Flowchart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct FlowchartQuery {
    pub document_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFlowchartRequest {
    pub document_id: i64,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub flowchart_data: serde_json::Value,
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateFlowchartRequest {
    pub flowchart_id: i64,
    pub flowchart_data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct FlowchartResponse {
    pub id: i64,
    pub document_id: i64,
    pub version: String,
    pub flowchart_data: serde_json::Value,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Flowchart> for FlowchartResponse {
    fn from(fc: Flowchart) -> Self {
        Self {
            id: fc.id,
            document_id: fc.document_id,
            version: fc.version,
            flowchart_data: fc.flowchart_data,
            created_at: fc.created_at.map(|t| t.to_rfc3339()),
            updated_at: fc.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetFlowchartResponse {
    pub flowchart: FlowchartResponse,
}

#[derive(Debug, Serialize)]
pub struct SaveFlowchartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flowchart_id: Option<i64>,
}
