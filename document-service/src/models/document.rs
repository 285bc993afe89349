//! Document, version and lookup models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Published,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Published => "published",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "published" => DocumentStatus::Published,
            _ => DocumentStatus::Draft,
        }
    }
}

/// A document row joined with its department and type lookups.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub current_version: Option<String>,
    pub status: String,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub dept_code: Option<String>,
    pub dept_name: Option<String>,
    pub type_code: Option<String>,
    pub type_name: Option<String>,
}

/// An immutable snapshot of one uploaded file (or none), scoped to a document.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentVersion {
    pub id: i64,
    pub document_id: i64,
    pub version: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Department {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentType {
    pub id: i64,
    pub code: String,
    pub name: String,
}
