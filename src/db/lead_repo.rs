// src/db/lead_repo.rs

use crate::{
    common::error::AppError,
    db::Database,
    models::lead::{CreateLeadPayload, SolicitudDemo},
};

#[derive(Clone)]
pub struct LeadRepository {
    db: Database,
}

impl LeadRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // fecha_solicitud usa o DEFAULT NOW() da coluna TIMESTAMPTZ (UTC).
    pub async fn create(&self, input: &CreateLeadPayload) -> Result<SolicitudDemo, AppError> {
        let pool = self.db.pool()?;
        let lead = sqlx::query_as::<_, SolicitudDemo>(
            r#"
            INSERT INTO solicitudes_demo (nombre_completo, codigo_pais, telefono)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.nombre.trim())
        .bind(input.codigo_pais.trim())
        .bind(input.telefono.trim())
        .fetch_one(&pool)
        .await?;
        Ok(lead)
    }

    pub async fn list(&self) -> Result<Vec<SolicitudDemo>, AppError> {
        let pool = self.db.pool()?;
        let leads = sqlx::query_as::<_, SolicitudDemo>(
            "SELECT * FROM solicitudes_demo ORDER BY fecha_solicitud DESC",
        )
        .fetch_all(&pool)
        .await?;
        Ok(leads)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<SolicitudDemo>, AppError> {
        let pool = self.db.pool()?;
        let lead = sqlx::query_as::<_, SolicitudDemo>("SELECT * FROM solicitudes_demo WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(lead)
    }

    pub async fn update_status(
        &self,
        id: i32,
        estado: &str,
        notas: Option<&str>,
    ) -> Result<Option<SolicitudDemo>, AppError> {
        let pool = self.db.pool()?;
        let lead = sqlx::query_as::<_, SolicitudDemo>(
            r#"
            UPDATE solicitudes_demo
            SET estado = $2, notas = COALESCE($3, notas)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(estado)
        .bind(notas)
        .fetch_optional(&pool)
        .await?;
        Ok(lead)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query("DELETE FROM solicitudes_demo WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
