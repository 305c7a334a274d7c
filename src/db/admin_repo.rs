// src/db/admin_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, db::Database, models::auth::Administrador};

#[derive(Clone)]
pub struct AdminRepository {
    db: Database,
}

impl AdminRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn count<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar("SELECT COUNT(*) FROM administradores")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Administrador>, AppError> {
        let pool = self.db.pool()?;
        let admin = sqlx::query_as::<_, Administrador>("SELECT * FROM administradores WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
        Ok(admin)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        nombres: &str,
        email: &str,
        password_hash: &str,
        super_admin: bool,
    ) -> Result<Administrador, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let admin = sqlx::query_as::<_, Administrador>(
            r#"
            INSERT INTO administradores (nombres, email, password_hash, super_admin)
            VALUES ($1, LOWER($2), $3, $4)
            RETURNING *
            "#,
        )
        .bind(nombres)
        .bind(email)
        .bind(password_hash)
        .bind(super_admin)
        .fetch_one(executor)
        .await?;
        Ok(admin)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let pool = self.db.pool()?;
        sqlx::query("UPDATE administradores SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&pool)
            .await?;
        Ok(())
    }
}
