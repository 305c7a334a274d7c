// src/middleware/cache.rs

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    extract::{OriginalUri, Request, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    common::{
        cache::{CacheKey, ResponseCache},
        error::AppError,
    },
    models::auth::AuthUser,
};

// Estado do layer de cache de uma rota: onde guardar e por quanto tempo.
#[derive(Clone)]
pub struct CachePolicy {
    pub cache: Arc<dyn ResponseCache>,
    pub ttl: Duration,
}

impl CachePolicy {
    pub fn new(cache: Arc<dyn ResponseCache>, ttl_secs: u64) -> Self {
        Self {
            cache,
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

// O cliente nunca deve cachear: o cache é só do servidor.
fn no_store(headers: &mut HeaderMap) {
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
}

// Precisa rodar depois do auth_guard (layer de rota), para a chave levar o usuário.
pub async fn cache_response(
    State(policy): State<CachePolicy>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let url = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or(request.uri())
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_default();
    let user_id = request.extensions().get::<AuthUser>().map(AuthUser::id);
    let key = CacheKey::new(url, user_id);

    if let Some(body) = policy.cache.get(&key) {
        tracing::debug!(url = %key.url, "Cache HIT");
        let mut response = Response::new(Body::from(body));
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-cache", HeaderValue::from_static("HIT"));
        no_store(headers);
        return response;
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        let mut response = response;
        no_store(response.headers_mut());
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::InternalServerError(anyhow::anyhow!("Falha ao ler a resposta: {e}"))
                .into_response();
        }
    };

    policy.cache.put(key, bytes.clone(), policy.ttl);
    no_store(&mut parts.headers);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::cache::InMemoryResponseCache,
        models::auth::{AuthUser, StudentContext},
    };
    use axum::{middleware, routing::get, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use testresult::TestResult;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(cache: Arc<InMemoryResponseCache>, hits: Arc<AtomicUsize>, status: StatusCode) -> Router {
        let policy = CachePolicy::new(cache, 60);
        Router::new().route(
            "/dashboard",
            get(move || {
                let hits = hits.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    (status, format!("{{\"n\":{n}}}"))
                }
            })
            .layer(middleware::from_fn_with_state(policy, cache_response)),
        )
    }

    fn student(id: Uuid) -> AuthUser {
        AuthUser::Estudiante(StudentContext {
            id,
            nombres: "Ana".into(),
            apellidos: "Pérez".into(),
            email: "ana@uni.edu".into(),
            universidad_id: None,
            periodo_id: None,
        })
    }

    fn get_as(uri: &str, user: Option<AuthUser>) -> Request {
        let mut request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request válido");
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        request
    }

    async fn body_text(response: Response) -> Result<String, testresult::TestError> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache() -> TestResult {
        let cache = Arc::new(InMemoryResponseCache::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let app = app(cache, hits.clone(), StatusCode::OK);

        let first = app.clone().oneshot(get_as("/dashboard", None)).await?;
        assert!(first.headers().get("x-cache").is_none());
        assert_eq!(
            first.headers().get(CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store, no-cache, must-revalidate, private"))
        );
        let first_body = body_text(first).await?;

        let second = app.oneshot(get_as("/dashboard", None)).await?;
        assert_eq!(second.headers().get("x-cache"), Some(&HeaderValue::from_static("HIT")));
        assert_eq!(second.headers().get(PRAGMA), Some(&HeaderValue::from_static("no-cache")));
        assert_eq!(body_text(second).await?, first_body);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn query_string_and_user_are_part_of_the_key() -> TestResult {
        let cache = Arc::new(InMemoryResponseCache::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let app = app(cache, hits.clone(), StatusCode::OK);

        app.clone().oneshot(get_as("/dashboard", Some(student(Uuid::new_v4())))).await?;
        app.clone().oneshot(get_as("/dashboard", Some(student(Uuid::new_v4())))).await?;
        app.oneshot(get_as("/dashboard?page=2", None)).await?;

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test]
    async fn error_responses_are_not_stored() -> TestResult {
        let cache = Arc::new(InMemoryResponseCache::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let app = app(cache.clone(), hits.clone(), StatusCode::SERVICE_UNAVAILABLE);

        app.clone().oneshot(get_as("/dashboard", None)).await?;
        app.oneshot(get_as("/dashboard", None)).await?;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn invalidation_forces_a_fresh_read() -> TestResult {
        let cache = Arc::new(InMemoryResponseCache::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let app = app(cache.clone(), hits.clone(), StatusCode::OK);

        app.clone().oneshot(get_as("/dashboard", None)).await?;
        cache.invalidate(crate::common::cache::CacheScope::All);
        let fresh = app.oneshot(get_as("/dashboard", None)).await?;

        assert!(fresh.headers().get("x-cache").is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        Ok(())
    }
}
