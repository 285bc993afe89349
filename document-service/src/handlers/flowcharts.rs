use crate::dtos::{
    CreateFlowchartRequest, FlowchartQuery, FlowchartResponse, GetFlowchartResponse,
    SaveFlowchartResponse, UpdateFlowchartRequest,
};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use metrics::counter;
use service_core::error::AppError;

/// `GET /flowcharts?document_id=N` — the most recently updated flowchart
/// for a document.
pub async fn get_flowchart(
    State(state): State<AppState>,
    Query(params): Query<FlowchartQuery>,
) -> Result<impl IntoResponse, AppError> {
    let document_id = params.document_id.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("document_id query parameter is required"))
    })?;

    let flowchart = state
        .db
        .latest_flowchart(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Flowchart not found")))?;

    Ok(Json(GetFlowchartResponse {
        flowchart: FlowchartResponse::from(flowchart),
    }))
}

/// `POST /flowcharts` — insert a new flowchart row. No uniqueness is
/// enforced per document or version.
pub async fn create_flowchart(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let request: CreateFlowchartRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid flowchart request: {}", e)))?;

    let flowchart_id = state
        .db
        .insert_flowchart(request.document_id, &request.version, &request.flowchart_data)
        .await?;

    counter!("flowcharts_created_total").increment(1);

    Ok(Json(SaveFlowchartResponse {
        success: true,
        flowchart_id: Some(flowchart_id),
    }))
}

/// `PUT /flowcharts` — replace the payload of an existing flowchart.
/// Updating an id that does not exist is a 404, not a silent no-op.
pub async fn update_flowchart(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let request: UpdateFlowchartRequest = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid flowchart request: {}", e)))?;

    let updated = state
        .db
        .update_flowchart_data(request.flowchart_id, &request.flowchart_data)
        .await?;

    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!("Flowchart not found")));
    }

    counter!("flowcharts_updated_total").increment(1);

    Ok(Json(SaveFlowchartResponse {
        success: true,
        flowchart_id: None,
    }))
}
