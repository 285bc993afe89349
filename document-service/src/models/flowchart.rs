use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Opaque diagram payload tied to a document. The payload schema is owned by
/// the frontend editor and stored as-is.
#[derive(Debug, Clone, FromRow)]
pub struct Flowchart {
    pub id: i64,
    pub document_id: i64,
    pub version: String,
    pub flowchart_data: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
