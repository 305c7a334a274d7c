// src/middleware/auth.rs

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{AdminContext, AuthUser, ClientInfo, StudentContext},
};

// Token cru da requisição (o logout fecha a sessão correspondente)
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

// Valida o Bearer token e anexa o usuário à requisição. O usuário também vai
// para as extensions da resposta, onde a trilha de auditoria o encontra.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
        .ok_or(AppError::MissingToken)?;

    let user = app_state.auth_service.validate_token(&token).await?;

    request.extensions_mut().insert(user.clone());
    request.extensions_mut().insert(BearerToken(token));

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

pub async fn admin_guard(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(AuthUser::Administrador(_)) => Ok(next.run(request).await),
        Some(_) => Err(AppError::Forbidden(
            "Acceso denegado: se requiere rol de administrador".to_string(),
        )),
        None => Err(AppError::MissingToken),
    }
}

pub async fn student_guard(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(AuthUser::Estudiante(_)) => Ok(next.run(request).await),
        Some(_) => Err(AppError::Forbidden(
            "Acceso denegado: se requiere rol de estudiante".to_string(),
        )),
        None => Err(AppError::MissingToken),
    }
}

// x-forwarded-for (primeiro salto) > x-real-ip > endereço do socket
pub fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

// --- Extratores ---

pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::MissingToken)
    }
}

pub struct AdminUser(pub AdminContext);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await?.0 {
            AuthUser::Administrador(admin) => Ok(AdminUser(admin)),
            AuthUser::Estudiante(_) => Err(AppError::Forbidden(
                "Acceso denegado: se requiere rol de administrador".to_string(),
            )),
        }
    }
}

pub struct StudentUser(pub StudentContext);

impl<S> FromRequestParts<S> for StudentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await?.0 {
            AuthUser::Estudiante(student) => Ok(StudentUser(student)),
            AuthUser::Administrador(_) => Err(AppError::Forbidden(
                "Acceso denegado: se requiere rol de estudiante".to_string(),
            )),
        }
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or(AppError::MissingToken)
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo {
            ip_address: client_ip(&parts.headers, parts.extensions.get()),
            user_agent: user_agent(&parts.headers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let peer = ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000)));

        assert_eq!(client_ip(&headers, Some(&peer)).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn peer_address_is_the_fallback() {
        let peer = ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 4000)));

        assert_eq!(
            client_ip(&HeaderMap::new(), Some(&peer)).as_deref(),
            Some("192.168.1.20")
        );
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }
}
