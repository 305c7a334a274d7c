// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::{cache::CacheScope, error::AppError, extract::JsonBody},
    config::AppState,
    middleware::auth::{AdminUser, BearerToken, CurrentUser},
    models::auth::{
        Administrador, ChangePasswordPayload, ClientInfo, CreateAdminPayload, LoginPayload,
        RegisterStudentPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token y usuario autenticado"),
        (status = 401, description = "Credenciales inválidas"),
        (status = 403, description = "Usuario inactivo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    client: ClientInfo,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state.auth_service.login(&payload, &client).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/primer-admin",
    tag = "Auth",
    request_body = CreateAdminPayload,
    responses(
        (status = 201, description = "Super administrador creado"),
        (status = 403, description = "Ya existe un administrador")
    )
)]
pub async fn first_admin(
    State(app_state): State<AppState>,
    client: ClientInfo,
    JsonBody(payload): JsonBody<CreateAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state.auth_service.first_admin(&payload, &client).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/registro-estudiante",
    tag = "Auth",
    request_body = RegisterStudentPayload,
    responses(
        (status = 201, description = "Estudiante registrado"),
        (status = 400, description = "Datos inválidos o email en uso")
    )
)]
pub async fn register_student(
    State(app_state): State<AppState>,
    client: ClientInfo,
    JsonBody(payload): JsonBody<RegisterStudentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .register_student(&payload, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/crear-admin",
    tag = "Auth",
    request_body = CreateAdminPayload,
    responses(
        (status = 201, description = "Administrador creado", body = Administrador),
        (status = 403, description = "Sin permisos para crear super administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_admin(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(payload): JsonBody<CreateAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let nuevo = app_state.auth_service.create_admin(&admin, &payload).await?;
    app_state.cache.invalidate(CacheScope::All);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Administrador creado exitosamente",
            "data": nuevo,
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Sesión cerrada")),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, AppError> {
    app_state.auth_service.logout(&user, &token).await?;
    Ok(Json(json!({ "success": true, "message": "Sesión cerrada exitosamente" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/perfil",
    tag = "Auth",
    responses((status = 200, description = "Usuario autenticado")),
    security(("api_jwt" = []))
)]
pub async fn profile(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(json!({ "success": true, "usuario": user }))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/cambiar-password",
    tag = "Administración",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Contraseña actualizada"),
        (status = 400, description = "Contraseña actual incorrecta")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(payload): JsonBody<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state.auth_service.change_password(&user, &payload).await?;
    Ok(Json(json!({ "success": true, "message": "Contraseña actualizada exitosamente" })))
}
