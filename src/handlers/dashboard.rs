// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{common::error::AppError, config::AppState};

pub const ADMIN_DASHBOARD_PATH: &str = "/api/v1/admin/dashboard";

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "Administración",
    responses(
        (status = 200, description = "Contadores generales (cache 60 s)"),
        (status = 401, description = "No autenticado"),
        (status = 403, description = "Requiere rol de administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_dashboard(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let resumo = app_state.dashboard_repo.admin_summary().await?;
    Ok(Json(json!({ "success": true, "data": resumo })))
}
