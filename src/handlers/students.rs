// src/handlers/students.rs

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
    models::student::{
        CreateEstudiantePayload, Estudiante, ResetPasswordPayload, UpdateEstudiantePayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/estudiantes",
    tag = "Estudiantes",
    responses((status = 200, description = "Estudiantes con universidad y periodo")),
    security(("api_jwt" = []))
)]
pub async fn list_students(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let estudiantes = app_state.student_repo.list().await?;
    Ok(Json(json!({ "success": true, "data": estudiantes })))
}

// Perfil + horas somadas na hora, nunca lidas de contador.
#[utoipa::path(
    get,
    path = "/api/v1/admin/estudiantes/{id}",
    tag = "Estudiantes",
    params(("id" = Uuid, Path, description = "ID del estudiante")),
    responses(
        (status = 200, description = "Estudiante con sus registros y total de horas"),
        (status = 404, description = "Estudiante no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_student(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let estudiante = app_state
        .student_repo
        .find_detail(id)
        .await?
        .ok_or_else(|| AppError::not_found("Estudiante no encontrado"))?;
    let resumen = app_state.hour_log_repo.summary_for_student(id).await?;
    let registros = app_state.hour_log_repo.list_for_student(id).await?;

    Ok(Json(json!({
        "success": true,
        "data": estudiante,
        "totalHoras": resumen.total_horas,
        "registros": registros,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/estudiantes",
    tag = "Estudiantes",
    request_body = CreateEstudiantePayload,
    responses(
        (status = 201, description = "Estudiante creado (y matriculado si se indicó periodo)", body = Estudiante),
        (status = 400, description = "Datos inválidos o email en uso"),
        (status = 404, description = "Universidad o periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_student(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreateEstudiantePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let estudiante = app_state.student_service.create(&payload).await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Estudiante creado exitosamente",
            "data": estudiante,
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/estudiantes/{id}",
    tag = "Estudiantes",
    params(("id" = Uuid, Path, description = "ID del estudiante")),
    request_body = UpdateEstudiantePayload,
    responses(
        (status = 200, description = "Estudiante actualizado", body = Estudiante),
        (status = 404, description = "Estudiante o periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_student(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateEstudiantePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let estudiante = app_state.student_service.update(id, &payload).await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok(Json(json!({
        "success": true,
        "message": "Estudiante actualizado exitosamente",
        "data": estudiante,
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/estudiantes/{id}/toggle",
    tag = "Estudiantes",
    params(("id" = Uuid, Path, description = "ID del estudiante")),
    responses(
        (status = 200, description = "Estado alternado", body = Estudiante),
        (status = 404, description = "Estudiante no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_student(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let estudiante = app_state
        .student_repo
        .toggle(id)
        .await?
        .ok_or_else(|| AppError::not_found("Estudiante no encontrado"))?;
    app_state.cache.invalidate(CacheScope::All);

    let message = if estudiante.activo {
        "Estudiante activado"
    } else {
        "Estudiante desactivado"
    };
    Ok(Json(json!({ "success": true, "message": message, "data": estudiante })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/estudiantes/{id}/reestablecer-password",
    tag = "Estudiantes",
    params(("id" = Uuid, Path, description = "ID del estudiante")),
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Contraseña reestablecida"),
        (status = 404, description = "Estudiante no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_student_password(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .student_service
        .reset_password(id, &payload.nueva_password)
        .await?;

    Ok(Json(json!({ "success": true, "message": "Contraseña reestablecida exitosamente" })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/estudiantes/{id}",
    tag = "Estudiantes",
    params(("id" = Uuid, Path, description = "ID del estudiante")),
    responses(
        (status = 200, description = "Estudiante eliminado"),
        (status = 400, description = "Tiene registros de horas"),
        (status = 404, description = "Estudiante no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_student(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.student_service.delete(id).await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok(Json(json!({ "success": true, "message": "Estudiante eliminado exitosamente" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/estudiantes/{id}/estadisticas",
    tag = "Estudiantes",
    params(("id" = Uuid, Path, description = "ID del estudiante")),
    responses(
        (status = 200, description = "Totales, horas por mes y últimos registros"),
        (status = 404, description = "Estudiante no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn student_statistics(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if app_state.student_repo.find_by_id(id).await?.is_none() {
        return Err(AppError::not_found("Estudiante no encontrado"));
    }

    let estadisticas = app_state.hour_log_service.statistics(id).await?;
    Ok(Json(json!({ "success": true, "data": estadisticas })))
}
