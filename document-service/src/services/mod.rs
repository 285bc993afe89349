pub mod database;
pub mod metrics;
pub mod storage;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use storage::{LocalStorage, S3Storage, Storage};
