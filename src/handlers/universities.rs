// src/handlers/universities.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{cache::CacheScope, error::AppError, extract::JsonBody},
    config::AppState,
    models::university::{CreateUniversidadPayload, Universidad, UpdateUniversidadPayload},
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/universidades",
    tag = "Universidades",
    responses(
        (status = 200, description = "Lista de universidades", body = Vec<Universidad>),
        (status = 401, description = "No autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_universities(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let universidades = app_state.university_repo.list().await?;
    Ok(Json(json!({ "success": true, "data": universidades })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/universidades/{id}",
    tag = "Universidades",
    params(("id" = Uuid, Path, description = "ID de la universidad")),
    responses(
        (status = 200, description = "Universidad", body = Universidad),
        (status = 404, description = "Universidad no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_university(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let universidad = app_state
        .university_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Universidad no encontrada"))?;
    Ok(Json(json!({ "success": true, "data": universidad })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/universidades",
    tag = "Universidades",
    request_body = CreateUniversidadPayload,
    responses(
        (status = 201, description = "Universidad creada", body = Universidad),
        (status = 400, description = "Datos inválidos o nombre duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_university(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUniversidadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let universidad = app_state.university_repo.create(&payload.nombre).await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Universidad creada exitosamente",
            "data": universidad,
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/universidades/{id}",
    tag = "Universidades",
    params(("id" = Uuid, Path, description = "ID de la universidad")),
    request_body = UpdateUniversidadPayload,
    responses(
        (status = 200, description = "Universidad actualizada", body = Universidad),
        (status = 404, description = "Universidad no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_university(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateUniversidadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let universidad = app_state
        .university_repo
        .update(id, payload.nombre.as_deref(), payload.activa)
        .await?
        .ok_or_else(|| AppError::not_found("Universidad no encontrada"))?;
    app_state.cache.invalidate(CacheScope::All);

    Ok(Json(json!({
        "success": true,
        "message": "Universidad actualizada exitosamente",
        "data": universidad,
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/universidades/{id}/toggle",
    tag = "Universidades",
    params(("id" = Uuid, Path, description = "ID de la universidad")),
    responses(
        (status = 200, description = "Estado alternado", body = Universidad),
        (status = 404, description = "Universidad no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_university(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let universidad = app_state
        .university_repo
        .toggle(id)
        .await?
        .ok_or_else(|| AppError::not_found("Universidad no encontrada"))?;
    app_state.cache.invalidate(CacheScope::All);

    let message = if universidad.activa {
        "Universidad activada"
    } else {
        "Universidad desactivada"
    };
    Ok(Json(json!({ "success": true, "message": message, "data": universidad })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/universidades/{id}",
    tag = "Universidades",
    params(("id" = Uuid, Path, description = "ID de la universidad")),
    responses(
        (status = 200, description = "Universidad eliminada"),
        (status = 400, description = "Tiene periodos o estudiantes asociados"),
        (status = 404, description = "Universidad no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_university(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (periodos, estudiantes) = app_state.university_repo.count_dependents(id).await?;
    if periodos > 0 || estudiantes > 0 {
        return Err(AppError::bad_request(
            "No se puede eliminar la universidad porque tiene periodos o estudiantes asociados",
        ));
    }

    if !app_state.university_repo.delete(id).await? {
        return Err(AppError::not_found("Universidad no encontrada"));
    }
    app_state.cache.invalidate(CacheScope::All);

    Ok(Json(json!({ "success": true, "message": "Universidad eliminada exitosamente" })))
}
