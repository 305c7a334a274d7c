// src/handlers/leads.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{cache::CacheScope, error::AppError, extract::JsonBody},
    config::AppState,
    models::lead::{CreateLeadPayload, LeadUpdate, UpdateLeadPayload},
};

#[utoipa::path(
    post,
    path = "/api/v1/public/create-lead",
    tag = "Público",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Solicitud registrada; devuelve leadId"),
        (status = 400, description = "Faltan campos obligatorios")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state.lead_service.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Solicitud recibida, te contactaremos pronto",
            "leadId": lead.id,
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/leads",
    tag = "Leads",
    responses((status = 200, description = "Solicitudes de demo, más recientes primero")),
    security(("api_jwt" = []))
)]
pub async fn list_leads(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.lead_service.list().await?;
    Ok(Json(json!({ "success": true, "data": leads })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/leads/{id}",
    tag = "Leads",
    params(("id" = i32, Path, description = "ID de la solicitud")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Estado actualizado; 'contactado' elimina la solicitud"),
        (status = 404, description = "Lead no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(payload): JsonBody<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.lead_service.update(id, &payload).await?;
    app_state.cache.invalidate(CacheScope::All);

    let body = match outcome {
        LeadUpdate::Removed => json!({
            "success": true,
            "message": "Lead contactado y eliminado",
            "deleted": true,
        }),
        LeadUpdate::Updated(lead) => json!({
            "success": true,
            "message": "Estado del lead actualizado",
            "data": lead,
        }),
    };
    Ok(Json(body))
}
