// src/db/user_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::auth::CredentialRow,
};

// Consultas que atravessam as duas tabelas de usuários (administradores e estudiantes).
#[derive(Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // Uma única consulta; administradores têm prioridade caso o e-mail exista nas duas.
    pub async fn find_credentials(&self, email: &str) -> Result<Option<CredentialRow>, AppError> {
        let pool = self.db.pool()?;

        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, rol, password_hash, activo FROM (
                SELECT id, 'administrador' AS rol, nombres, email, password_hash, activo, 0 AS prioridad
                FROM administradores WHERE LOWER(email) = LOWER($1)
                UNION ALL
                SELECT id, 'estudiante' AS rol, nombres, email, password_hash, activo, 1 AS prioridad
                FROM estudiantes WHERE LOWER(email) = LOWER($1)
            ) AS cuentas
            ORDER BY prioridad
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&pool)
        .await?;

        Ok(row)
    }

    // O e-mail precisa ser único entre as duas tabelas. `exclude_id` ignora o próprio usuário.
    pub async fn email_in_use<'e, E>(
        &self,
        executor: E,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let in_use: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM administradores
                WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
                UNION ALL
                SELECT 1 FROM estudiantes
                WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;

        Ok(in_use)
    }
}
