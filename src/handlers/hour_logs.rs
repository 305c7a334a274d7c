// src/handlers/hour_logs.rs

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        cache::{CacheScope, ResponseCache},
        error::AppError,
        extract::JsonBody,
    },
    config::AppState,
    handlers::dashboard::ADMIN_DASHBOARD_PATH,
    middleware::auth::{AdminUser, StudentUser},
    models::{
        activity::{CreateEvidenciaPayload, Evidencia},
        hour_log::{CreateRegistroPayload, RegistroHora, RevisarRegistroPayload, UpdateRegistroPayload},
    },
};

// Criar, editar ou apagar um registro muda também o total de horas do painel do admin.
fn invalidate_after_log_change(cache: &dyn ResponseCache, student_id: Uuid) {
    cache.invalidate(CacheScope::User(student_id));
    cache.invalidate(CacheScope::Path(ADMIN_DASHBOARD_PATH));
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/perfil",
    tag = "Estudiante",
    responses((status = 200, description = "Estudiante con universidad y periodo")),
    security(("api_jwt" = []))
)]
pub async fn my_profile(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
) -> Result<impl IntoResponse, AppError> {
    let perfil = app_state
        .student_repo
        .find_detail(student.id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(Json(json!({ "success": true, "data": perfil })))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/dashboard",
    tag = "Estudiante",
    responses((status = 200, description = "Progreso de la matrícula activa (cache 60 s)")),
    security(("api_jwt" = []))
)]
pub async fn my_dashboard(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = app_state.hour_log_service.dashboard(student.id).await?;
    Ok(Json(json!({ "success": true, "data": dashboard })))
}

#[utoipa::path(
    post,
    path = "/api/v1/estudiante/registrar-horas",
    tag = "Estudiante",
    request_body = CreateRegistroPayload,
    responses(
        (status = 201, description = "Registro creado", body = RegistroHora),
        (status = 400, description = "Fecha futura, horas fuera de rango, descripción corta, fecha duplicada o sin matrícula activa")
    ),
    security(("api_jwt" = []))
)]
pub async fn log_hours(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
    JsonBody(payload): JsonBody<CreateRegistroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let today = Local::now().date_naive();
    let registro = app_state
        .hour_log_service
        .create(student.id, &payload, today)
        .await?;
    invalidate_after_log_change(app_state.cache.as_ref(), student.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Horas registradas exitosamente",
            "data": registro,
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/registros",
    tag = "Estudiante",
    responses((status = 200, description = "Registros propios con cantidad y total de horas")),
    security(("api_jwt" = []))
)]
pub async fn my_logs(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
) -> Result<impl IntoResponse, AppError> {
    let registros = app_state.hour_log_repo.list_for_student(student.id).await?;
    let resumen = app_state.hour_log_repo.summary_for_student(student.id).await?;

    Ok(Json(json!({
        "success": true,
        "count": resumen.total_registros,
        "totalHoras": resumen.total_horas,
        "data": registros,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/registros/{id}",
    tag = "Estudiante",
    params(("id" = Uuid, Path, description = "ID del registro")),
    responses(
        (status = 200, description = "Registro", body = RegistroHora),
        (status = 404, description = "Registro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_log(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let registro = app_state.hour_log_service.find(student.id, id).await?;
    Ok(Json(json!({ "success": true, "data": registro })))
}

#[utoipa::path(
    put,
    path = "/api/v1/estudiante/registros/{id}",
    tag = "Estudiante",
    params(("id" = Uuid, Path, description = "ID del registro")),
    request_body = UpdateRegistroPayload,
    responses(
        (status = 200, description = "Registro actualizado", body = RegistroHora),
        (status = 404, description = "Registro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_my_log(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateRegistroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let registro = app_state
        .hour_log_service
        .update(student.id, id, &payload)
        .await?;
    invalidate_after_log_change(app_state.cache.as_ref(), student.id);

    Ok(Json(json!({
        "success": true,
        "message": "Registro actualizado exitosamente",
        "data": registro,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/estudiante/registros/{id}",
    tag = "Estudiante",
    params(("id" = Uuid, Path, description = "ID del registro")),
    responses(
        (status = 200, description = "Registro eliminado"),
        (status = 404, description = "Registro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_my_log(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.hour_log_service.delete(student.id, id).await?;
    invalidate_after_log_change(app_state.cache.as_ref(), student.id);

    Ok(Json(json!({ "success": true, "message": "Registro eliminado exitosamente" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/estadisticas",
    tag = "Estudiante",
    responses((status = 200, description = "Totales, horas por mes y últimos registros")),
    security(("api_jwt" = []))
)]
pub async fn my_statistics(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
) -> Result<impl IntoResponse, AppError> {
    let estadisticas = app_state.hour_log_service.statistics(student.id).await?;
    Ok(Json(json!({ "success": true, "data": estadisticas })))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/exportar-registros",
    tag = "Estudiante",
    responses((status = 200, description = "CSV con los registros", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_my_logs(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state.hour_log_service.export_csv(student.id).await?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"registros_horas.csv\""),
        ],
        csv,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/estudiante/registros/{id}/evidencias",
    tag = "Estudiante",
    params(("id" = Uuid, Path, description = "ID del registro")),
    request_body = CreateEvidenciaPayload,
    responses(
        (status = 201, description = "Evidencia adjuntada", body = Evidencia),
        (status = 404, description = "Registro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_evidence(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<CreateEvidenciaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let evidencia = app_state
        .hour_log_service
        .add_evidence(student.id, id, &payload)
        .await?;
    app_state.cache.invalidate(CacheScope::User(student.id));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Evidencia registrada exitosamente",
            "data": evidencia,
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/estudiante/registros/{id}/evidencias",
    tag = "Estudiante",
    params(("id" = Uuid, Path, description = "ID del registro")),
    responses(
        (status = 200, description = "Evidencias del registro", body = Vec<Evidencia>),
        (status = 404, description = "Registro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_evidence(
    State(app_state): State<AppState>,
    StudentUser(student): StudentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let evidencias = app_state.hour_log_service.list_evidence(student.id, id).await?;
    Ok(Json(json!({ "success": true, "data": evidencias })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/registros/{id}/estado",
    tag = "Registros",
    params(("id" = Uuid, Path, description = "ID del registro")),
    request_body = RevisarRegistroPayload,
    responses(
        (status = 200, description = "Registro revisado", body = RegistroHora),
        (status = 404, description = "Registro no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn review_log(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<RevisarRegistroPayload>,
) -> Result<impl IntoResponse, AppError> {
    let registro = app_state
        .hour_log_service
        .review(id, payload.estado, admin.id)
        .await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok(Json(json!({
        "success": true,
        "message": format!("Registro marcado como {}", payload.estado.as_str()),
        "data": registro,
    })))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Bytes;

    use super::*;
    use crate::common::cache::{CacheKey, InMemoryResponseCache};

    #[test]
    fn log_changes_refresh_student_and_admin_dashboards() {
        let cache = InMemoryResponseCache::new();
        let ttl = Duration::from_secs(60);
        let ana = Uuid::new_v4();
        let bruno_dashboard = CacheKey::new("/api/v1/estudiante/dashboard", Some(Uuid::new_v4()));

        cache.put(CacheKey::new("/api/v1/estudiante/dashboard", Some(ana)), Bytes::from_static(b"ana"), ttl);
        cache.put(CacheKey::new(ADMIN_DASHBOARD_PATH, Some(Uuid::new_v4())), Bytes::from_static(b"admin"), ttl);
        cache.put(bruno_dashboard.clone(), Bytes::from_static(b"bruno"), ttl);

        invalidate_after_log_change(&cache, ana);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&bruno_dashboard), Some(Bytes::from_static(b"bruno")));
    }
}
