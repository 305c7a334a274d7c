// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    config::AppState,
    handlers,
    middleware::{
        audit::audit_trail,
        auth::{admin_guard, auth_guard, student_guard},
        cache::{cache_response, CachePolicy},
    },
};

const DASHBOARD_TTL_SECS: u64 = 60;
const PERIODS_TTL_SECS: u64 = 300;

// Layers de rota: o último .layer() é o mais externo, então auth_guard
// roda antes dos guards de papel e do cache.
pub fn build_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/crear-admin", post(handlers::auth::create_admin))
        .route("/logout", post(handlers::auth::logout))
        .route("/perfil", get(handlers::auth::profile))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .route("/login", post(handlers::auth::login))
        .route("/primer-admin", post(handlers::auth::first_admin))
        .route("/registro-estudiante", post(handlers::auth::register_student));

    let admin_routes = Router::new()
        .route(
            "/dashboard",
            get(handlers::dashboard::admin_dashboard).layer(axum_middleware::from_fn_with_state(
                CachePolicy::new(app_state.cache.clone(), DASHBOARD_TTL_SECS),
                cache_response,
            )),
        )
        .route("/cambiar-password", put(handlers::auth::change_password))
        // Universidades
        .route(
            "/universidades",
            get(handlers::universities::list_universities)
                .post(handlers::universities::create_university),
        )
        .route(
            "/universidades/{id}",
            get(handlers::universities::get_university)
                .put(handlers::universities::update_university)
                .delete(handlers::universities::delete_university),
        )
        .route(
            "/universidades/{id}/toggle",
            put(handlers::universities::toggle_university),
        )
        // Períodos
        .route(
            "/periodos",
            get(handlers::periods::list_periods)
                .layer(axum_middleware::from_fn_with_state(
                    CachePolicy::new(app_state.cache.clone(), PERIODS_TTL_SECS),
                    cache_response,
                ))
                .post(handlers::periods::create_period),
        )
        .route(
            "/periodos/verificar-vencimiento",
            post(handlers::periods::expire_periods),
        )
        .route(
            "/periodos/{id}",
            get(handlers::periods::get_period)
                .put(handlers::periods::update_period)
                .delete(handlers::periods::delete_period),
        )
        .route("/periodos/{id}/toggle", put(handlers::periods::toggle_period))
        .route(
            "/periodos/{id}/matricula-masiva",
            post(handlers::periods::bulk_enroll),
        )
        .route("/periodos/{id}/resumen", get(handlers::periods::period_summary))
        // Estudiantes
        .route(
            "/estudiantes",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/estudiantes/{id}",
            get(handlers::students::get_student)
                .put(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        )
        .route("/estudiantes/{id}/toggle", put(handlers::students::toggle_student))
        .route(
            "/estudiantes/{id}/reestablecer-password",
            put(handlers::students::reset_student_password),
        )
        .route(
            "/estudiantes/{id}/estadisticas",
            get(handlers::students::student_statistics),
        )
        // Revisão, catálogos, leads e auditoria manual
        .route("/registros/{id}/estado", put(handlers::hour_logs::review_log))
        .route(
            "/tipos-actividad",
            get(handlers::activity::list_all_types).post(handlers::activity::create_type),
        )
        .route("/leads", get(handlers::leads::list_leads))
        .route("/leads/{id}", put(handlers::leads::update_lead))
        .route("/auditoria/log", post(handlers::audit::log_manual_action))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let student_routes = Router::new()
        .route("/perfil", get(handlers::hour_logs::my_profile))
        .route(
            "/dashboard",
            get(handlers::hour_logs::my_dashboard).layer(axum_middleware::from_fn_with_state(
                CachePolicy::new(app_state.cache.clone(), DASHBOARD_TTL_SECS),
                cache_response,
            )),
        )
        .route("/registrar-horas", post(handlers::hour_logs::log_hours))
        .route("/registros", get(handlers::hour_logs::my_logs))
        .route(
            "/registros/{id}",
            get(handlers::hour_logs::get_my_log)
                .put(handlers::hour_logs::update_my_log)
                .delete(handlers::hour_logs::delete_my_log),
        )
        .route(
            "/registros/{id}/evidencias",
            get(handlers::hour_logs::list_evidence).post(handlers::hour_logs::add_evidence),
        )
        .route("/estadisticas", get(handlers::hour_logs::my_statistics))
        .route("/exportar-registros", get(handlers::hour_logs::export_my_logs))
        .route("/tipos-actividad", get(handlers::activity::list_active_types))
        .layer(axum_middleware::from_fn(student_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let audit_routes = Router::new()
        .route("/", get(handlers::audit::list_audit))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let public_routes = Router::new().route("/create-lead", post(handlers::leads::create_lead));

    let api = Router::new()
        .route("/", get(handlers::health::api_root))
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(handlers::health::openapi_json))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .nest("/estudiante", student_routes)
        .nest("/auditoria", audit_routes)
        .nest("/public", public_routes);

    Router::new()
        .route("/", get(handlers::health::api_root))
        .nest("/api/v1", api)
        .fallback(handlers::health::not_found)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            audit_trail,
        ))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use testresult::{TestError, TestResult};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        common::cache::NoopResponseCache,
        config::AppConfig,
        db::Database,
    };

    fn app() -> Router {
        let state = AppState::build(
            AppConfig::for_tests(),
            Database::disconnected("sem banco nos testes"),
            Arc::new(NoopResponseCache),
        );
        build_router(state)
    }

    async fn send(request: Request<Body>) -> Result<(StatusCode, serde_json::Value), TestError> {
        let response = app().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    fn json_post(uri: &str, body: &str) -> Result<Request<Body>, TestError> {
        Ok(Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))?)
    }

    #[tokio::test]
    async fn health_answers_without_database() -> TestResult {
        let (status, body) = send(Request::get("/api/v1/health").body(Body::empty())?).await?;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "disconnected");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_returns_error_envelope() -> TestResult {
        let (status, body) = send(Request::get("/api/v1/nao-existe").body(Body::empty())?).await?;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Ruta no encontrada");
        Ok(())
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() -> TestResult {
        let (status, body) =
            send(Request::get("/api/v1/admin/dashboard").body(Body::empty())?).await?;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token de acceso requerido");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_token_is_forbidden() -> TestResult {
        let request = Request::get("/api/v1/estudiante/dashboard")
            .header(AUTHORIZATION, "Bearer nao-e-um-jwt")
            .body(Body::empty())?;

        let (status, body) = send(request).await?;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Token inválido o expirado");
        Ok(())
    }

    #[tokio::test]
    async fn lead_with_missing_fields_is_rejected() -> TestResult {
        let (status, body) = send(json_post(
            "/api/v1/public/create-lead",
            r#"{"nombre":"","codigo_pais":"+593","telefono":"0999999999"}"#,
        )?)
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn valid_lead_without_database_is_unavailable() -> TestResult {
        let (status, body) = send(json_post(
            "/api/v1/public/create-lead",
            r#"{"nombre":"Test","codigo_pais":"+593","telefono":"0999999999"}"#,
        )?)
        .await?;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Base de datos no disponible");
        Ok(())
    }

    #[tokio::test]
    async fn login_validates_before_touching_the_database() -> TestResult {
        let (status, body) = send(json_post(
            "/api/v1/auth/login",
            r#"{"email":"nao-e-email","password":"x"}"#,
        )?)
        .await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["email"].is_array());
        Ok(())
    }
}
