// src/db/audit_repo.rs

use crate::{
    common::error::AppError,
    db::Database,
    models::audit::{AuditQuery, Auditoria, NewAuditEntry},
};

#[derive(Clone)]
pub struct AuditRepository {
    db: Database,
}

impl AuditRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, entry: &NewAuditEntry) -> Result<(), AppError> {
        let pool = self.db.pool()?;
        sqlx::query(
            r#"
            INSERT INTO auditoria
                (usuario_id, usuario_tipo, accion, tabla_afectada, registro_id, detalles, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.usuario_id)
        .bind(entry.usuario_tipo.as_deref())
        .bind(&entry.accion)
        .bind(entry.tabla_afectada.as_deref())
        .bind(entry.registro_id)
        .bind(entry.detalles.as_ref())
        .bind(entry.ip_address.as_deref())
        .bind(entry.user_agent.as_deref())
        .execute(&pool)
        .await?;
        Ok(())
    }

    // Página de registros (mais recentes primeiro) e o total que casa com os filtros.
    pub async fn list(&self, query: &AuditQuery) -> Result<(Vec<Auditoria>, i64), AppError> {
        let pool = self.db.pool()?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM auditoria
            WHERE ($1::text IS NULL OR usuario_tipo = $1)
              AND ($2::text IS NULL OR accion = $2)
            "#,
        )
        .bind(query.usuario_tipo.as_deref())
        .bind(query.accion.as_deref())
        .fetch_one(&pool)
        .await?;

        let registros = sqlx::query_as::<_, Auditoria>(
            r#"
            SELECT * FROM auditoria
            WHERE ($1::text IS NULL OR usuario_tipo = $1)
              AND ($2::text IS NULL OR accion = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.usuario_tipo.as_deref())
        .bind(query.accion.as_deref())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&pool)
        .await?;

        Ok((registros, total))
    }
}
