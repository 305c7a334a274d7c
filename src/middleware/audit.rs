// src/middleware/audit.rs

use std::{net::SocketAddr, time::Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{client_ip, user_agent},
    models::{audit::NewAuditEntry, auth::AuthUser},
};

const SKIPPED_PATHS: [&str; 5] = ["/health", "/favicon", "/auditoria", "/auth/login", "/openapi.json"];

// Ordem importa: o primeiro trecho encontrado define a tabela.
const TABLES: [(&str, &str); 12] = [
    ("/universidades", "universidades"),
    ("/periodos", "periodos"),
    ("/estudiantes", "estudiantes"),
    ("/administradores", "administradores"),
    ("/evidencias", "evidencias"),
    ("/registros", "registros_horas"),
    ("/registrar-horas", "registros_horas"),
    ("/tipos-actividad", "tipos_actividad"),
    ("/leads", "solicitudes_demo"),
    ("/create-lead", "solicitudes_demo"),
    ("/auth", "autenticacion"),
    ("/admin", "administracion"),
];

pub fn should_skip(path: &str) -> bool {
    SKIPPED_PATHS.iter().any(|skipped| path.contains(skipped))
}

pub fn action_for(method: &Method, status: StatusCode) -> String {
    if status.is_client_error() || status.is_server_error() {
        return format!("FAILED_{method}");
    }
    match *method {
        Method::GET => "READ".to_string(),
        Method::POST => "CREATE".to_string(),
        Method::PUT | Method::PATCH => "UPDATE".to_string(),
        Method::DELETE => "DELETE".to_string(),
        _ => method.to_string(),
    }
}

pub fn table_for(path: &str) -> &'static str {
    TABLES
        .iter()
        .find(|(fragment, _)| path.contains(fragment))
        .map(|(_, table)| *table)
        .unwrap_or("sistema")
}

pub fn record_id(path: &str) -> Option<Uuid> {
    path.split('/').find_map(|segment| Uuid::parse_str(segment).ok())
}

// Registra cada requisição na tabela auditoria sem atrasar a resposta.
pub async fn audit_trail(State(app_state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if should_skip(&path) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let query = request.uri().query().map(str::to_owned);
    let ip_address = client_ip(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
    );
    let agent = user_agent(request.headers());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started.elapsed().as_millis() as u64;
    let user = response.extensions().get::<AuthUser>();

    tracing::info!(%method, %path, status = status.as_u16(), duration_ms, "Requisição atendida");

    let entry = NewAuditEntry {
        usuario_id: user.map(AuthUser::id),
        usuario_tipo: user.map(|u| u.role().as_str().to_string()),
        accion: action_for(&method, status),
        tabla_afectada: Some(table_for(&path).to_string()),
        registro_id: record_id(&path),
        detalles: Some(json!({
            "method": method.as_str(),
            "path": path,
            "query": query,
            "statusCode": status.as_u16(),
            "durationMs": duration_ms,
        })),
        ip_address,
        user_agent: agent,
    };

    let audit_repo = app_state.audit_repo.clone();
    tokio::spawn(async move {
        match audit_repo.insert(&entry).await {
            Ok(()) => {}
            Err(AppError::DatabaseUnavailable) => {
                tracing::debug!("Auditoria descartada: banco indisponível");
            }
            Err(e) => tracing::warn!("Falha ao gravar auditoria: {}", e),
        }
    });

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_requests_are_prefixed() {
        assert_eq!(action_for(&Method::POST, StatusCode::CREATED), "CREATE");
        assert_eq!(action_for(&Method::PATCH, StatusCode::OK), "UPDATE");
        assert_eq!(action_for(&Method::DELETE, StatusCode::NOT_FOUND), "FAILED_DELETE");
        assert_eq!(action_for(&Method::GET, StatusCode::SERVICE_UNAVAILABLE), "FAILED_GET");
    }

    #[test]
    fn table_comes_from_the_path() {
        assert_eq!(table_for("/api/v1/admin/periodos/abc/resumen"), "periodos");
        assert_eq!(table_for("/api/v1/estudiante/registrar-horas"), "registros_horas");
        assert_eq!(
            table_for("/api/v1/estudiante/registros/1/evidencias"),
            "evidencias"
        );
        assert_eq!(table_for("/api/v1/admin/dashboard"), "administracion");
        assert_eq!(table_for("/api/v1/estudiante/dashboard"), "sistema");
    }

    #[test]
    fn first_uuid_segment_is_the_record() {
        let id = Uuid::new_v4();

        assert_eq!(record_id(&format!("/api/v1/admin/estudiantes/{id}/toggle")), Some(id));
        assert_eq!(record_id("/api/v1/admin/leads/12"), None);
    }

    #[test]
    fn noisy_paths_are_skipped() {
        assert!(should_skip("/api/v1/health"));
        assert!(should_skip("/api/v1/auditoria"));
        assert!(should_skip("/api/v1/auth/login"));
        assert!(!should_skip("/api/v1/auth/logout"));
    }
}
