pub mod document;
pub mod flowchart;

pub use document::{Department, Document, DocumentStatus, DocumentType, DocumentVersion};
pub use flowchart::Flowchart;
