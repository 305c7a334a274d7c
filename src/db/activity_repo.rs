// src/db/activity_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::activity::{CreateEvidenciaPayload, CreateTipoActividadPayload, Evidencia, TipoActividad},
};

// Tipos de atividade e evidências anexadas aos registros de horas.
#[derive(Clone)]
pub struct ActivityRepository {
    db: Database,
}

impl ActivityRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list_types(&self, only_active: bool) -> Result<Vec<TipoActividad>, AppError> {
        let pool = self.db.pool()?;
        let tipos = sqlx::query_as::<_, TipoActividad>(
            "SELECT * FROM tipos_actividad WHERE ($1 = FALSE OR activo) ORDER BY nombre",
        )
        .bind(only_active)
        .fetch_all(&pool)
        .await?;
        Ok(tipos)
    }

    pub async fn is_active_type(&self, id: Uuid) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let active = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tipos_actividad WHERE id = $1 AND activo)",
        )
        .bind(id)
        .fetch_one(&pool)
        .await?;
        Ok(active)
    }

    pub async fn create_type(&self, input: &CreateTipoActividadPayload) -> Result<TipoActividad, AppError> {
        let pool = self.db.pool()?;
        let tipo = sqlx::query_as::<_, TipoActividad>(
            "INSERT INTO tipos_actividad (nombre, descripcion) VALUES ($1, $2) RETURNING *",
        )
        .bind(input.nombre.trim())
        .bind(input.descripcion.as_deref())
        .fetch_one(&pool)
        .await?;
        Ok(tipo)
    }

    pub async fn add_evidence(
        &self,
        registro_id: Uuid,
        input: &CreateEvidenciaPayload,
    ) -> Result<Evidencia, AppError> {
        let pool = self.db.pool()?;
        let evidencia = sqlx::query_as::<_, Evidencia>(
            r#"
            INSERT INTO evidencias (registro_id, nombre_archivo, url, tipo_archivo, tamano_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(registro_id)
        .bind(input.nombre_archivo.trim())
        .bind(&input.url)
        .bind(input.tipo_archivo.as_deref())
        .bind(input.tamano_bytes)
        .fetch_one(&pool)
        .await?;
        Ok(evidencia)
    }

    pub async fn list_evidence(&self, registro_id: Uuid) -> Result<Vec<Evidencia>, AppError> {
        let pool = self.db.pool()?;
        let evidencias = sqlx::query_as::<_, Evidencia>(
            "SELECT * FROM evidencias WHERE registro_id = $1 ORDER BY created_at",
        )
        .bind(registro_id)
        .fetch_all(&pool)
        .await?;
        Ok(evidencias)
    }
}
