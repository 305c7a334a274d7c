// src/db/period_repo.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::period::{CreatePeriodoPayload, Periodo, PeriodoListado},
};

#[derive(Clone)]
pub struct PeriodRepository {
    db: Database,
}

impl PeriodRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<PeriodoListado>, AppError> {
        let pool = self.db.pool()?;
        let periodos = sqlx::query_as::<_, PeriodoListado>(
            r#"
            SELECT p.*, u.nombre AS universidad_nombre
            FROM periodos p
            JOIN universidades u ON u.id = p.universidad_id
            ORDER BY p.fecha_inicio DESC
            "#,
        )
        .fetch_all(&pool)
        .await?;
        Ok(periodos)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Periodo>, AppError> {
        let pool = self.db.pool()?;
        let periodo = sqlx::query_as::<_, Periodo>("SELECT * FROM periodos WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(periodo)
    }

    pub async fn create(&self, input: &CreatePeriodoPayload) -> Result<Periodo, AppError> {
        let pool = self.db.pool()?;
        let periodo = sqlx::query_as::<_, Periodo>(
            r#"
            INSERT INTO periodos (universidad_id, nombre, fecha_inicio, fecha_fin, horas_totales_requeridas)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.universidad_id)
        .bind(input.nombre.trim())
        .bind(input.fecha_inicio)
        .bind(input.fecha_fin)
        .bind(input.horas_totales_requeridas)
        .fetch_one(&pool)
        .await?;
        Ok(periodo)
    }

    // Grava o período já mesclado e validado pelo serviço.
    pub async fn update(&self, periodo: &Periodo) -> Result<Periodo, AppError> {
        let pool = self.db.pool()?;
        let updated = sqlx::query_as::<_, Periodo>(
            r#"
            UPDATE periodos
            SET universidad_id = $2, nombre = $3, fecha_inicio = $4, fecha_fin = $5,
                horas_totales_requeridas = $6, activo = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(periodo.id)
        .bind(periodo.universidad_id)
        .bind(&periodo.nombre)
        .bind(periodo.fecha_inicio)
        .bind(periodo.fecha_fin)
        .bind(periodo.horas_totales_requeridas)
        .bind(periodo.activo)
        .fetch_one(&pool)
        .await?;
        Ok(updated)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Option<Periodo>, AppError> {
        let pool = self.db.pool()?;
        let periodo = sqlx::query_as::<_, Periodo>(
            "UPDATE periodos SET activo = NOT activo, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;
        Ok(periodo)
    }

    // Estudantes ligados diretamente e matrículas existentes no período.
    pub async fn count_dependents(&self, id: Uuid) -> Result<(i64, i64), AppError> {
        let pool = self.db.pool()?;
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM estudiantes WHERE periodo_id = $1),
                (SELECT COUNT(*) FROM matriculaciones WHERE periodo_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&pool)
        .await?;
        Ok(counts)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query("DELETE FROM periodos WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::from_delete(
                e,
                "No se puede eliminar el periodo porque tiene estudiantes o matrículas asociadas",
            ))?;
        Ok(result.rows_affected() > 0)
    }

    // Desativa em lote todo período ativo cuja data de fim já passou.
    pub async fn deactivate_expired(&self, today: NaiveDate) -> Result<u64, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query(
            "UPDATE periodos SET activo = FALSE, updated_at = NOW() WHERE activo AND fecha_fin < $1",
        )
        .bind(today)
        .execute(&pool)
        .await?;
        Ok(result.rows_affected())
    }
}
