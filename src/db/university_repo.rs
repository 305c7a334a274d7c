// src/db/university_repo.rs

use uuid::Uuid;

use crate::{common::error::AppError, db::Database, models::university::Universidad};

#[derive(Clone)]
pub struct UniversityRepository {
    db: Database,
}

impl UniversityRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Universidad>, AppError> {
        let pool = self.db.pool()?;
        let universidades =
            sqlx::query_as::<_, Universidad>("SELECT * FROM universidades ORDER BY nombre")
                .fetch_all(&pool)
                .await?;
        Ok(universidades)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Universidad>, AppError> {
        let pool = self.db.pool()?;
        let universidad = sqlx::query_as::<_, Universidad>("SELECT * FROM universidades WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(universidad)
    }

    pub async fn create(&self, nombre: &str) -> Result<Universidad, AppError> {
        let pool = self.db.pool()?;
        let universidad = sqlx::query_as::<_, Universidad>(
            "INSERT INTO universidades (nombre) VALUES ($1) RETURNING *",
        )
        .bind(nombre.trim())
        .fetch_one(&pool)
        .await?;
        Ok(universidad)
    }

    pub async fn update(
        &self,
        id: Uuid,
        nombre: Option<&str>,
        activa: Option<bool>,
    ) -> Result<Option<Universidad>, AppError> {
        let pool = self.db.pool()?;
        let universidad = sqlx::query_as::<_, Universidad>(
            r#"
            UPDATE universidades
            SET nombre = COALESCE($2, nombre),
                activa = COALESCE($3, activa),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(nombre.map(str::trim))
        .bind(activa)
        .fetch_optional(&pool)
        .await?;
        Ok(universidad)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Option<Universidad>, AppError> {
        let pool = self.db.pool()?;
        let universidad = sqlx::query_as::<_, Universidad>(
            "UPDATE universidades SET activa = NOT activa, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;
        Ok(universidad)
    }

    // Quantos períodos e estudantes ainda apontam para a universidade.
    pub async fn count_dependents(&self, id: Uuid) -> Result<(i64, i64), AppError> {
        let pool = self.db.pool()?;
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM periodos WHERE universidad_id = $1),
                (SELECT COUNT(*) FROM estudiantes WHERE universidad_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&pool)
        .await?;
        Ok(counts)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query("DELETE FROM universidades WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::from_delete(
                e,
                "No se puede eliminar la universidad porque tiene periodos o estudiantes asociados",
            ))?;
        Ok(result.rows_affected() > 0)
    }
}
