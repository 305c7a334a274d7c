// src/models/university.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Universidad {
    pub id: Uuid,
    #[schema(example = "Universidad Central")]
    pub nombre: String,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUniversidadPayload {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    #[schema(example = "Universidad Central")]
    pub nombre: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUniversidadPayload {
    #[validate(length(min = 2, max = 255, message = "El nombre debe tener entre 2 y 255 caracteres"))]
    pub nombre: Option<String>,
    pub activa: Option<bool>,
}
