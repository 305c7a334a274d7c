// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use utoipa::OpenApi;

use crate::{common::error::AppError, config::AppState, docs::ApiDoc};

// Responde mesmo com o banco fora do ar; o estado da conexão vai no corpo.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Sistema",
    responses((status = 200, description = "Estado del servicio y de la base de datos"))
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "status": "OK",
        "database": app_state.db.status(),
        "environment": app_state.config.environment,
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "API de Control de Prácticas",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/v1/health",
            "auth": "/api/v1/auth",
            "admin": "/api/v1/admin",
            "estudiante": "/api/v1/estudiante",
            "public": "/api/v1/public",
            "auditoria": "/api/v1/auditoria",
            "docs": "/api/v1/openapi.json",
        },
    }))
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

pub async fn not_found() -> AppError {
    AppError::not_found("Ruta no encontrada")
}
