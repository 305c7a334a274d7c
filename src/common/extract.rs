// src/common/extract.rs

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::common::error::AppError;

// Igual ao axum::Json, mas a rejeição sai no envelope de erro da API (400).
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Datos inválidos: {}", rejection.body_text()))
    }
}
