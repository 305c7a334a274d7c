// src/handlers/periods.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{cache::CacheScope, error::AppError, extract::JsonBody},
    config::AppState,
    models::{
        enrollment::{MatriculaMasivaPayload, MatriculaMasivaResultado},
        period::{CreatePeriodoPayload, Periodo, UpdatePeriodoPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/periodos",
    tag = "Periodos",
    responses((status = 200, description = "Periodos con el nombre de la universidad (cache 300 s)")),
    security(("api_jwt" = []))
)]
pub async fn list_periods(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let periodos = app_state.period_repo.list().await?;
    Ok(Json(json!({ "success": true, "data": periodos })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/periodos/{id}",
    tag = "Periodos",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    responses(
        (status = 200, description = "Periodo", body = Periodo),
        (status = 404, description = "Periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let periodo = app_state.period_service.find(id).await?;
    let vencido = periodo.is_expired_on(Local::now().date_naive());

    Ok(Json(json!({ "success": true, "data": periodo, "vencido": vencido })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/periodos",
    tag = "Periodos",
    request_body = CreatePeriodoPayload,
    responses(
        (status = 201, description = "Periodo creado", body = Periodo),
        (status = 400, description = "Fechas u horas inválidas"),
        (status = 404, description = "Universidad no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_period(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePeriodoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let periodo = app_state.period_service.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Periodo creado exitosamente",
            "data": periodo,
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/periodos/{id}",
    tag = "Periodos",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    request_body = UpdatePeriodoPayload,
    responses(
        (status = 200, description = "Periodo actualizado", body = Periodo),
        (status = 400, description = "Fechas inválidas"),
        (status = 404, description = "Periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdatePeriodoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let periodo = app_state.period_service.update(id, &payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Periodo actualizado exitosamente",
        "data": periodo,
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/periodos/{id}/toggle",
    tag = "Periodos",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    responses(
        (status = 200, description = "Estado alternado", body = Periodo),
        (status = 404, description = "Periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let periodo = app_state.period_service.toggle(id).await?;
    let message = if periodo.activo {
        "Periodo activado"
    } else {
        "Periodo desactivado"
    };
    Ok(Json(json!({ "success": true, "message": message, "data": periodo })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/periodos/{id}",
    tag = "Periodos",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    responses(
        (status = 200, description = "Periodo eliminado"),
        (status = 400, description = "Tiene estudiantes o matrículas asociadas"),
        (status = 404, description = "Periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_period(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.period_service.delete(id).await?;
    Ok(Json(json!({ "success": true, "message": "Periodo eliminado exitosamente" })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/periodos/verificar-vencimiento",
    tag = "Periodos",
    responses((status = 200, description = "Cantidad de periodos desactivados")),
    security(("api_jwt" = []))
)]
pub async fn expire_periods(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let today = Local::now().date_naive();
    let desactivados = app_state.period_service.run_sweep(today).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{desactivados} periodo(s) desactivado(s)"),
        "desactivados": desactivados,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/periodos/{id}/matricula-masiva",
    tag = "Periodos",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    request_body = MatriculaMasivaPayload,
    responses(
        (status = 200, description = "Resultado por estudiante", body = Vec<MatriculaMasivaResultado>),
        (status = 404, description = "Periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_enroll(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<MatriculaMasivaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let periodo = app_state.period_service.find(id).await?;
    let resultados = app_state
        .enrollment_service
        .bulk_enroll(&periodo, &payload.estudiante_ids)
        .await?;
    app_state.cache.invalidate(CacheScope::All);

    let exitosos = resultados.iter().filter(|r| r.error.is_none()).count();
    Ok(Json(json!({
        "success": true,
        "message": format!("{exitosos} de {} estudiante(s) matriculado(s)", resultados.len()),
        "data": resultados,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/periodos/{id}/resumen",
    tag = "Periodos",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    responses(
        (status = 200, description = "Horas acumuladas y aprobadas por matrícula"),
        (status = 404, description = "Periodo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn period_summary(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let periodo = app_state.period_service.find(id).await?;
    let progreso = app_state.enrollment_service.period_summary(&periodo).await?;

    Ok(Json(json!({
        "success": true,
        "periodo": periodo,
        "data": progreso,
    })))
}
