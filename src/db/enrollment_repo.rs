// src/db/enrollment_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::enrollment::{MatriculaActiva, Matriculacion, ProgresoMatricula},
};

#[derive(Clone)]
pub struct EnrollmentRepository {
    db: Database,
}

impl EnrollmentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // Trava as matrículas do estudante até o fim da transação.
    pub async fn lock_for_student<'e, E>(
        &self,
        executor: E,
        estudiante_id: Uuid,
    ) -> Result<Vec<Matriculacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let matriculas = sqlx::query_as::<_, Matriculacion>(
            "SELECT * FROM matriculaciones WHERE estudiante_id = $1 ORDER BY fecha_matricula FOR UPDATE",
        )
        .bind(estudiante_id)
        .fetch_all(executor)
        .await?;
        Ok(matriculas)
    }

    pub async fn deactivate<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE matriculaciones SET activa = FALSE, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn reactivate<'e, E>(&self, executor: E, id: Uuid) -> Result<Matriculacion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let matricula = sqlx::query_as::<_, Matriculacion>(
            r#"
            UPDATE matriculaciones
            SET activa = TRUE, fecha_matricula = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(matricula)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        estudiante_id: Uuid,
        periodo_id: Uuid,
    ) -> Result<Matriculacion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let matricula = sqlx::query_as::<_, Matriculacion>(
            "INSERT INTO matriculaciones (estudiante_id, periodo_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(estudiante_id)
        .bind(periodo_id)
        .fetch_one(executor)
        .await?;
        Ok(matricula)
    }

    pub async fn set_student_period<'e, E>(
        &self,
        executor: E,
        estudiante_id: Uuid,
        periodo_id: Uuid,
        universidad_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE estudiantes SET periodo_id = $2, universidad_id = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(estudiante_id)
        .bind(periodo_id)
        .bind(universidad_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_active(&self, estudiante_id: Uuid) -> Result<Option<MatriculaActiva>, AppError> {
        let pool = self.db.pool()?;
        let matricula = sqlx::query_as::<_, MatriculaActiva>(
            r#"
            SELECT m.id, m.periodo_id, p.nombre AS periodo_nombre, p.horas_totales_requeridas
            FROM matriculaciones m
            JOIN periodos p ON p.id = m.periodo_id
            WHERE m.estudiante_id = $1 AND m.activa
            "#,
        )
        .bind(estudiante_id)
        .fetch_optional(&pool)
        .await?;
        Ok(matricula)
    }

    // Soma viva das horas por matrícula do período.
    pub async fn progress_for_period(&self, periodo_id: Uuid) -> Result<Vec<ProgresoMatricula>, AppError> {
        let pool = self.db.pool()?;
        let progreso = sqlx::query_as::<_, ProgresoMatricula>(
            r#"
            SELECT
                m.id AS matriculacion_id,
                e.id AS estudiante_id,
                e.nombres, e.apellidos, e.email,
                m.activa,
                COUNT(r.id) AS total_registros,
                COALESCE(SUM(r.horas), 0) AS horas_acumuladas,
                COALESCE(SUM(r.horas) FILTER (WHERE r.estado = 'aprobado'), 0) AS horas_aprobadas
            FROM matriculaciones m
            JOIN estudiantes e ON e.id = m.estudiante_id
            LEFT JOIN registros_horas r ON r.matriculacion_id = m.id
            WHERE m.periodo_id = $1
            GROUP BY m.id, e.id
            ORDER BY e.apellidos, e.nombres
            "#,
        )
        .bind(periodo_id)
        .fetch_all(&pool)
        .await?;
        Ok(progreso)
    }
}
