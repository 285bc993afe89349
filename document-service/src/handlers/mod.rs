pub mod documents;
pub mod flowcharts;
pub mod health;

pub use documents::{search_documents, submit_document};
pub use flowcharts::{create_flowchart, get_flowchart, update_flowchart};
pub use health::{health_check, metrics_endpoint, readiness_check};

use service_core::error::AppError;

/// Fallback for unsupported methods on an otherwise valid route. Keeps the
/// 405 response in the same JSON error shape as everything else.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
