//! Database service for document-service.

use crate::config::DatabaseConfig;
use crate::models::{Department, Document, DocumentStatus, DocumentType, Flowchart};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use std::time::Duration;
use tracing::{info, instrument};

/// First version assigned to every new document.
pub const INITIAL_VERSION: &str = "1.0";

/// Capped result size for document searches.
const SEARCH_LIMIT: i64 = 100;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new connection pool. The configured schema is applied to
    /// every connection through search_path.
    #[instrument(skip(config), fields(service = "document-service"))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            schema = %config.schema,
            "Connecting to PostgreSQL"
        );

        let schema = config.schema.clone();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .after_connect(move |conn, _meta| {
                let schema = schema.clone();
                Box::pin(async move {
                    conn.execute(format!("SET search_path TO {}", schema).as_str())
                        .await?;
                    Ok(())
                })
            })
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    /// Search documents with optional conjunctive filters, newest first.
    #[instrument(skip(self))]
    pub async fn search_documents(
        &self,
        search: Option<&str>,
        department: Option<&str>,
        document_type: Option<&str>,
    ) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT d.id, d.title, d.description, d.author, d.current_version,
                d.status, d.tags, d.created_at, d.updated_at,
                dep.code AS dept_code, dep.name AS dept_name,
                dt.code AS type_code, dt.name AS type_name
            FROM documents d
            LEFT JOIN departments dep ON d.department_id = dep.id
            LEFT JOIN document_types dt ON d.type_id = dt.id
            WHERE ($1::text IS NULL
                   OR d.title ILIKE '%' || $1 || '%'
                   OR d.description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR dep.code = $2)
              AND ($3::text IS NULL OR dt.code = $3)
            ORDER BY d.updated_at DESC
            LIMIT $4
            "#,
        )
        .bind(search)
        .bind(department)
        .bind(document_type)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to search documents: {}", e)))?;

        Ok(documents)
    }

    /// Resolve a department code. An unknown or absent code is `None`, not
    /// an error.
    #[instrument(skip(self))]
    pub async fn find_department(&self, code: Option<&str>) -> Result<Option<Department>, AppError> {
        let Some(code) = code else {
            return Ok(None);
        };

        let department = sqlx::query_as::<_, Department>(
            "SELECT id, code, name FROM departments WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to find department: {}", e)))?;

        Ok(department)
    }

    /// Resolve a document type code, same semantics as [`Self::find_department`].
    #[instrument(skip(self))]
    pub async fn find_document_type(
        &self,
        code: Option<&str>,
    ) -> Result<Option<DocumentType>, AppError> {
        let Some(code) = code else {
            return Ok(None);
        };

        let document_type = sqlx::query_as::<_, DocumentType>(
            "SELECT id, code, name FROM document_types WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to find document type: {}", e))
        })?;

        Ok(document_type)
    }

    /// Insert a new document and return its id.
    #[instrument(skip(self, description), fields(title = %title))]
    pub async fn insert_document(
        &self,
        title: &str,
        description: Option<&str>,
        department_id: Option<i64>,
        type_id: Option<i64>,
        author: &str,
        status: DocumentStatus,
    ) -> Result<i64, AppError> {
        let document_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO documents (title, description, department_id, type_id, author, current_version, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(department_id)
        .bind(type_id)
        .bind(author)
        .bind(INITIAL_VERSION)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to insert document: {}", e)))?;

        info!(document_id, status = status.as_str(), "Document created");

        Ok(document_id)
    }

    /// Insert a version row for a document. File columns are null when no
    /// file accompanied the version.
    #[instrument(skip(self, file_url), fields(document_id = document_id))]
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_document_version(
        &self,
        document_id: i64,
        version: &str,
        file_url: Option<&str>,
        file_name: Option<&str>,
        file_size: Option<i64>,
        file_type: Option<&str>,
        created_by: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO document_versions (document_id, version, file_url, file_name, file_size, file_type, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(document_id)
        .bind(version)
        .bind(file_url)
        .bind(file_name)
        .bind(file_size)
        .bind(file_type)
        .bind(created_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert document version: {}", e))
        })?;

        info!(document_id, version, "Document version recorded");

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Flowchart Operations
    // -------------------------------------------------------------------------

    /// Fetch the most recently updated flowchart for a document. "Latest"
    /// means max updated_at, not max version string.
    #[instrument(skip(self))]
    pub async fn latest_flowchart(&self, document_id: i64) -> Result<Option<Flowchart>, AppError> {
        let flowchart = sqlx::query_as::<_, Flowchart>(
            r#"
            SELECT id, document_id, version, flowchart_data, created_at, updated_at
            FROM flowcharts
            WHERE document_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to fetch flowchart: {}", e))
        })?;

        Ok(flowchart)
    }

    /// Insert a new flowchart row and return its id. Multiple flowcharts per
    /// document and version are permitted.
    #[instrument(skip(self, data), fields(document_id = document_id))]
    pub async fn insert_flowchart(
        &self,
        document_id: i64,
        version: &str,
        data: &serde_json::Value,
    ) -> Result<i64, AppError> {
        let flowchart_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO flowcharts (document_id, version, flowchart_data)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(document_id)
        .bind(version)
        .bind(data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to insert flowchart: {}", e))
        })?;

        info!(flowchart_id, document_id, version, "Flowchart created");

        Ok(flowchart_id)
    }

    /// Replace a flowchart payload and bump updated_at. Returns false when
    /// no row matched the id.
    #[instrument(skip(self, data), fields(flowchart_id = flowchart_id))]
    pub async fn update_flowchart_data(
        &self,
        flowchart_id: i64,
        data: &serde_json::Value,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE flowcharts
            SET flowchart_data = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(flowchart_id)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update flowchart: {}", e))
        })?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!(flowchart_id, "Flowchart updated");
        }

        Ok(updated)
    }
}
