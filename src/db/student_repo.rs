// src/db/student_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::student::{Estudiante, EstudianteDetalle},
};

const DETAIL_SELECT: &str = r#"
    SELECT e.*,
           u.nombre AS universidad_nombre,
           p.nombre AS periodo_nombre,
           p.horas_totales_requeridas
    FROM estudiantes e
    LEFT JOIN universidades u ON u.id = e.universidad_id
    LEFT JOIN periodos p ON p.id = e.periodo_id
"#;

pub struct NewStudent<'a> {
    pub nombres: &'a str,
    pub apellidos: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub universidad_id: Option<Uuid>,
    pub periodo_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct StudentRepository {
    db: Database,
}

impl StudentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Estudiante>, AppError> {
        let pool = self.db.pool()?;
        self.find_by_id_with(&pool, id).await
    }

    pub async fn find_by_id_with<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Estudiante>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let estudiante = sqlx::query_as::<_, Estudiante>("SELECT * FROM estudiantes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(estudiante)
    }

    pub async fn find_detail(&self, id: Uuid) -> Result<Option<EstudianteDetalle>, AppError> {
        let pool = self.db.pool()?;
        let sql = format!("{DETAIL_SELECT} WHERE e.id = $1");
        let estudiante = sqlx::query_as::<_, EstudianteDetalle>(&sql)
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(estudiante)
    }

    pub async fn list(&self) -> Result<Vec<EstudianteDetalle>, AppError> {
        let pool = self.db.pool()?;
        let sql = format!("{DETAIL_SELECT} ORDER BY e.apellidos, e.nombres");
        let estudiantes = sqlx::query_as::<_, EstudianteDetalle>(&sql)
            .fetch_all(&pool)
            .await?;
        Ok(estudiantes)
    }

    pub async fn create<'e, E>(&self, executor: E, input: NewStudent<'_>) -> Result<Estudiante, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let estudiante = sqlx::query_as::<_, Estudiante>(
            r#"
            INSERT INTO estudiantes (nombres, apellidos, email, password_hash, universidad_id, periodo_id)
            VALUES ($1, $2, LOWER($3), $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.nombres.trim())
        .bind(input.apellidos.trim())
        .bind(input.email.trim())
        .bind(input.password_hash)
        .bind(input.universidad_id)
        .bind(input.periodo_id)
        .fetch_one(executor)
        .await?;
        Ok(estudiante)
    }

    // Grava o estudante já mesclado pelo serviço.
    pub async fn update<'e, E>(&self, executor: E, estudiante: &Estudiante) -> Result<Estudiante, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Estudiante>(
            r#"
            UPDATE estudiantes
            SET nombres = $2, apellidos = $3, email = LOWER($4), universidad_id = $5,
                periodo_id = $6, activo = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(estudiante.id)
        .bind(estudiante.nombres.trim())
        .bind(estudiante.apellidos.trim())
        .bind(estudiante.email.trim())
        .bind(estudiante.universidad_id)
        .bind(estudiante.periodo_id)
        .bind(estudiante.activo)
        .fetch_one(executor)
        .await?;
        Ok(updated)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Option<Estudiante>, AppError> {
        let pool = self.db.pool()?;
        let estudiante = sqlx::query_as::<_, Estudiante>(
            "UPDATE estudiantes SET activo = NOT activo, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;
        Ok(estudiante)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query(
            "UPDATE estudiantes SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query("DELETE FROM estudiantes WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::from_delete(
                e,
                "No se puede eliminar el estudiante porque tiene registros de horas",
            ))?;
        Ok(result.rows_affected() > 0)
    }
}
