use crate::dtos::{
    CreateDocumentFields, DocumentAction, DocumentListResponse, DocumentResponse, DocumentSearch,
    SubmitDocumentResponse,
};
use crate::models::DocumentStatus;
use crate::services::database::INITIAL_VERSION;
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use metrics::counter;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// `GET /documents` — filtered listing, newest first, capped at 100 rows.
pub async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentSearch>,
) -> Result<impl IntoResponse, AppError> {
    let documents = state
        .db
        .search_documents(params.search(), params.department(), params.document_type())
        .await?;

    Ok(Json(DocumentListResponse {
        documents: documents.into_iter().map(DocumentResponse::from).collect(),
    }))
}

/// `POST /documents` — create a draft record or upload a published document
/// with an optional file, dispatched on the `action` field.
pub async fn submit_document(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let action_name = body
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("action is required")))?;
    if !matches!(action_name, "create" | "upload") {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Unrecognized action '{}'",
            action_name
        )));
    }

    let action: DocumentAction = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid request: {}", e)))?;

    match action {
        DocumentAction::Create { fields } => create_document(&state, fields).await,
        DocumentAction::Upload {
            fields,
            file_data,
            file_name,
            file_type,
        } => upload_document(&state, fields, file_data, file_name, file_type).await,
    }
}

async fn create_document(
    state: &AppState,
    fields: CreateDocumentFields,
) -> Result<Json<SubmitDocumentResponse>, AppError> {
    fields.validate()?;

    let department = state.db.find_department(fields.department.as_deref()).await?;
    let document_type = state
        .db
        .find_document_type(fields.document_type.as_deref())
        .await?;

    let document_id = state
        .db
        .insert_document(
            &fields.title,
            fields.description.as_deref(),
            department.map(|d| d.id),
            document_type.map(|t| t.id),
            &fields.author,
            DocumentStatus::Draft,
        )
        .await?;

    counter!("documents_created_total").increment(1);

    Ok(Json(SubmitDocumentResponse {
        success: true,
        document_id,
        file_url: None,
    }))
}

async fn upload_document(
    state: &AppState,
    fields: CreateDocumentFields,
    file_data: Option<String>,
    file_name: Option<String>,
    file_type: Option<String>,
) -> Result<Json<SubmitDocumentResponse>, AppError> {
    fields.validate()?;

    // Decode before any side effects so a malformed payload cannot leave a
    // half-written document behind.
    let file = match (file_data, file_name) {
        (Some(data), Some(name)) => {
            let bytes = BASE64.decode(data.as_bytes()).map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("file_data is not valid base64: {}", e))
            })?;
            Some((name, bytes))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "file_data and file_name must be provided together"
            )))
        }
    };

    let department = state.db.find_department(fields.department.as_deref()).await?;
    let document_type = state
        .db
        .find_document_type(fields.document_type.as_deref())
        .await?;

    let document_id = state
        .db
        .insert_document(
            &fields.title,
            fields.description.as_deref(),
            department.map(|d| d.id),
            document_type.map(|t| t.id),
            &fields.author,
            DocumentStatus::Published,
        )
        .await?;

    let content_type = file_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

    let mut file_url = None;
    let mut stored_name = None;
    let mut stored_size = None;

    if let Some((name, bytes)) = file {
        let extension = std::path::Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let storage_key = format!("documents/{}/{}.{}", document_id, Uuid::new_v4(), extension);
        let size = bytes.len() as i64;

        state
            .storage
            .upload(&storage_key, bytes, content_type)
            .await
            .map_err(|e| {
                tracing::error!(
                    document_id,
                    storage_key = %storage_key,
                    "Storage upload failed; document row has no version yet"
                );
                e
            })?;

        let url = format!(
            "{}/{}",
            state.config.storage.public_base_url.trim_end_matches('/'),
            storage_key
        );

        // The version row referencing the blob is only written once the
        // upload has succeeded. If this insert fails the blob is orphaned,
        // so remove it again.
        if let Err(e) = state
            .db
            .insert_document_version(
                document_id,
                INITIAL_VERSION,
                Some(&url),
                Some(&name),
                Some(size),
                file_type.as_deref(),
                &fields.author,
            )
            .await
        {
            tracing::error!(
                document_id,
                storage_key = %storage_key,
                "Version insert failed after storage write, deleting uploaded blob"
            );
            if let Err(cleanup) = state.storage.delete(&storage_key).await {
                tracing::error!(
                    document_id,
                    storage_key = %storage_key,
                    error = %cleanup,
                    "Orphaned blob could not be removed, manual reconciliation needed"
                );
            }
            return Err(e);
        }

        file_url = Some(url);
        stored_name = Some(name);
        stored_size = Some(size);
    } else {
        state
            .db
            .insert_document_version(
                document_id,
                INITIAL_VERSION,
                None,
                None,
                None,
                None,
                &fields.author,
            )
            .await?;
    }

    counter!("documents_uploaded_total").increment(1);

    tracing::info!(
        document_id,
        file_name = stored_name.as_deref().unwrap_or(""),
        file_size = stored_size.unwrap_or(0),
        "Document upload completed"
    );

    Ok(Json(SubmitDocumentResponse {
        success: true,
        document_id,
        file_url,
    }))
}
