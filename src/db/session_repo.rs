// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::auth::{Role, Sesion},
};

#[derive(Clone)]
pub struct SessionRepository {
    db: Database,
}

pub struct NewSession<'a> {
    pub usuario_id: Uuid,
    pub role: Role,
    pub token_hash: &'a str,
    pub expira_en: DateTime<Utc>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

impl SessionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, session: NewSession<'_>) -> Result<(), AppError> {
        let pool = self.db.pool()?;
        sqlx::query(
            r#"
            INSERT INTO sesiones (usuario_id, usuario_tipo, token_hash, expira_en, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.usuario_id)
        .bind(session.role.as_str())
        .bind(session.token_hash)
        .bind(session.expira_en)
        .bind(session.ip_address)
        .bind(session.user_agent)
        .execute(&pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_hash(&self, token_hash: &str) -> Result<Option<Sesion>, AppError> {
        let pool = self.db.pool()?;
        let session = sqlx::query_as::<_, Sesion>(
            "SELECT usuario_id, activa, expira_en FROM sesiones WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&pool)
        .await?;
        Ok(session)
    }

    pub async fn close(&self, token_hash: &str) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query("UPDATE sesiones SET activa = FALSE WHERE token_hash = $1 AND activa")
            .bind(token_hash)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
