// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{error::AppError, extract::JsonBody},
    config::AppState,
    middleware::auth::AdminUser,
    models::{
        audit::{AuditQuery, ManualAuditPayload, NewAuditEntry, Pagination},
        auth::{ClientInfo, Role},
    },
};

#[utoipa::path(
    get,
    path = "/api/v1/auditoria",
    tag = "Auditoría",
    params(AuditQuery),
    responses((status = 200, description = "Registros de auditoría paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_audit(
    State(app_state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (registros, total) = app_state.audit_repo.list(&query).await?;

    Ok(Json(json!({
        "success": true,
        "data": registros,
        "pagination": Pagination::new(total, query.page(), query.limit()),
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/auditoria/log",
    tag = "Auditoría",
    request_body = ManualAuditPayload,
    responses((status = 201, description = "Acción registrada")),
    security(("api_jwt" = []))
)]
pub async fn log_manual_action(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    client: ClientInfo,
    JsonBody(payload): JsonBody<ManualAuditPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .audit_repo
        .insert(&NewAuditEntry {
            usuario_id: Some(admin.id),
            usuario_tipo: Some(Role::Administrador.as_str().to_string()),
            accion: payload.accion,
            tabla_afectada: payload.tabla_afectada,
            registro_id: payload.registro_id,
            detalles: payload.detalles,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Acción registrada en auditoría" })),
    ))
}
