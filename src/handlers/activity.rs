// src/handlers/activity.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{cache::CacheScope, error::AppError, extract::JsonBody},
    config::AppState,
    models::activity::{CreateTipoActividadPayload, TipoActividad},
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/tipos-actividad",
    tag = "Tipos de actividad",
    responses((status = 200, description = "Todos los tipos de actividad", body = Vec<TipoActividad>)),
    security(("api_jwt" = []))
)]
pub async fn list_all_types(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tipos = app_state.activity_repo.list_types(false).await?;
    Ok(Json(json!({ "success": true, "data": tipos })))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/tipos-actividad",
    tag = "Tipos de actividad",
    responses((status = 200, description = "Tipos de actividad activos", body = Vec<TipoActividad>)),
    security(("api_jwt" = []))
)]
pub async fn list_active_types(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tipos = app_state.activity_repo.list_types(true).await?;
    Ok(Json(json!({ "success": true, "data": tipos })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/tipos-actividad",
    tag = "Tipos de actividad",
    request_body = CreateTipoActividadPayload,
    responses(
        (status = 201, description = "Tipo de actividad creado", body = TipoActividad),
        (status = 400, description = "Datos inválidos o nombre duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_type(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTipoActividadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tipo = app_state.activity_repo.create_type(&payload).await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Tipo de actividad creado exitosamente",
            "data": tipo,
        })),
    ))
}
