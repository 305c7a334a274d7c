// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TipoActividad {
    pub id: Uuid,
    #[schema(example = "Desarrollo de software")]
    pub nombre: String,
    pub descripcion: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTipoActividadPayload {
    #[validate(length(min = 2, max = 100, message = "El nombre debe tener entre 2 y 100 caracteres"))]
    pub nombre: String,
    pub descripcion: Option<String>,
}

// Metadados de evidência. O arquivo em si fica em armazenamento externo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Evidencia {
    pub id: Uuid,
    pub registro_id: Uuid,
    pub nombre_archivo: String,
    pub url: String,
    pub tipo_archivo: Option<String>,
    pub tamano_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEvidenciaPayload {
    #[validate(length(min = 1, max = 255, message = "El nombre del archivo es requerido"))]
    pub nombre_archivo: String,
    #[validate(url(message = "La URL de la evidencia no es válida"))]
    pub url: String,
    #[validate(length(max = 100, message = "Tipo de archivo demasiado largo"))]
    pub tipo_archivo: Option<String>,
    #[validate(range(min = 0, message = "El tamaño no puede ser negativo"))]
    pub tamano_bytes: Option<i64>,
}
