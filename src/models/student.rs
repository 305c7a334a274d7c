// src/models/student.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Estudiante {
    pub id: Uuid,
    pub universidad_id: Option<Uuid>,
    pub periodo_id: Option<Uuid>,
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Estudante com os nomes da universidade e do período (listagens e perfil)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EstudianteDetalle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub estudiante: Estudiante,
    pub universidad_nombre: Option<String>,
    pub periodo_nombre: Option<String>,
    pub horas_totales_requeridas: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEstudiantePayload {
    #[validate(length(min = 2, max = 100, message = "Los nombres deben tener entre 2 y 100 caracteres"))]
    pub nombres: String,
    #[validate(length(min = 2, max = 100, message = "Los apellidos deben tener entre 2 y 100 caracteres"))]
    pub apellidos: String,
    #[validate(email(message = "El email no es válido"))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    pub universidad_id: Option<Uuid>,
    pub periodo_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEstudiantePayload {
    #[validate(length(min = 2, max = 100, message = "Los nombres deben tener entre 2 y 100 caracteres"))]
    pub nombres: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Los apellidos deben tener entre 2 y 100 caracteres"))]
    pub apellidos: Option<String>,
    #[validate(email(message = "El email no es válido"))]
    pub email: Option<String>,
    pub universidad_id: Option<Uuid>,
    pub periodo_id: Option<Uuid>,
    pub activo: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub nueva_password: String,
}
