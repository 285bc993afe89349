use crate::models::Document;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Optional search filters for `GET /documents`. Empty strings are treated
/// the same as absent parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentSearch {
    pub search: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
}

impl DocumentSearch {
    fn cleaned(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|s| !s.is_empty())
    }

    pub fn search(&self) -> Option<&str> {
        Self::cleaned(&self.search)
    }

    pub fn department(&self) -> Option<&str> {
        Self::cleaned(&self.department)
    }

    pub fn document_type(&self) -> Option<&str> {
        Self::cleaned(&self.document_type)
    }
}

/// Fields shared by both submit actions.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocumentFields {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_author() -> String {
    "System".to_string()
}

/// `POST /documents` body, dispatched on the `action` tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DocumentAction {
    Create {
        #[serde(flatten)]
        fields: CreateDocumentFields,
    },
    Upload {
        #[serde(flatten)]
        fields: CreateDocumentFields,
        #[serde(default)]
        file_data: Option<String>,
        #[serde(default)]
        file_name: Option<String>,
        #[serde(default)]
        file_type: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub status: String,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub department: Option<LookupResponse>,
    #[serde(rename = "type")]
    pub document_type: Option<LookupResponse>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        let department = match (doc.dept_code, doc.dept_name) {
            (Some(code), Some(name)) => Some(LookupResponse { code, name }),
            _ => None,
        };
        let document_type = match (doc.type_code, doc.type_name) {
            (Some(code), Some(name)) => Some(LookupResponse { code, name }),
            _ => None,
        };

        Self {
            id: doc.id,
            title: doc.title,
            description: doc.description,
            author: doc.author,
            version: doc.current_version,
            status: doc.status,
            tags: doc.tags.unwrap_or_default(),
            created_at: doc.created_at.map(|t| t.to_rfc3339()),
            updated_at: doc.updated_at.map(|t| t.to_rfc3339()),
            department,
            document_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
}

#[derive(Debug, Serialize)]
pub struct SubmitDocumentResponse {
    pub success: bool,
    pub document_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}
