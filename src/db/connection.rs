// src/db/connection.rs

use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::common::error::AppError;

// Estados possíveis da conexão com o Postgres.
// Disconnected -> Connecting -> Connected, e Connected -> Disconnected quando o ping falha.
#[derive(Debug, Clone)]
pub enum ConnectionState {
    Disconnected { reason: String },
    Connecting,
    Connected(PgPool),
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected { .. } => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected(_) => "connected",
        }
    }
}

// Handle barato de clonar, compartilhado por todos os repositórios.
#[derive(Debug, Clone)]
pub struct Database {
    state: Arc<RwLock<ConnectionState>>,
}

impl Database {
    fn with_state(state: ConnectionState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn disconnected(reason: &str) -> Self {
        tracing::warn!("Banco de dados indisponível: {}", reason);
        Self::with_state(ConnectionState::Disconnected {
            reason: reason.to_string(),
        })
    }

    pub fn connecting() -> Self {
        Self::with_state(ConnectionState::Connecting)
    }

    #[cfg(test)]
    pub fn connected(pool: PgPool) -> Self {
        Self::with_state(ConnectionState::Connected(pool))
    }

    pub fn state(&self) -> ConnectionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status(&self) -> &'static str {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .label()
    }

    // Pool atual, ou DatabaseUnavailable (503) fora do estado Connected.
    pub fn pool(&self) -> Result<PgPool, AppError> {
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            ConnectionState::Connected(pool) => Ok(pool.clone()),
            _ => Err(AppError::DatabaseUnavailable),
        }
    }

    fn transition(&self, next: ConnectionState) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if guard.label() != next.label() {
            match &next {
                ConnectionState::Disconnected { reason } => {
                    tracing::warn!("Banco de dados: {} -> disconnected ({})", guard.label(), reason);
                }
                _ => tracing::info!("Banco de dados: {} -> {}", guard.label(), next.label()),
            }
        }
        *guard = next;
    }

    pub fn mark_disconnected(&self, reason: &str) {
        self.transition(ConnectionState::Disconnected {
            reason: reason.to_string(),
        });
    }

    // Tarefa de fundo: conecta, roda as migrações e depois pinga periodicamente.
    // Um ping com falha derruba o estado para Disconnected; o próximo tick reconecta.
    pub fn spawn_supervisor(
        &self,
        database_url: String,
        max_connections: u32,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let db = self.clone();

        tokio::spawn(async move {
            let mut migrated = false;

            loop {
                match db.state() {
                    ConnectionState::Connected(pool) => {
                        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
                            tracing::error!("❌ Health-check do banco falhou: {}", e);
                            pool.close().await;
                            db.mark_disconnected(&e.to_string());
                        }
                    }
                    ConnectionState::Connecting | ConnectionState::Disconnected { .. } => {
                        db.transition(ConnectionState::Connecting);

                        match connect(&database_url, max_connections, migrated).await {
                            Ok(pool) => {
                                migrated = true;
                                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                                db.transition(ConnectionState::Connected(pool));
                            }
                            Err(e) => {
                                tracing::error!("❌ Falha ao conectar ao banco: {:#}", e);
                                db.mark_disconnected(&e.to_string());
                            }
                        }
                    }
                }

                tokio::time::sleep(interval).await;
            }
        })
    }
}

async fn connect(
    database_url: &str,
    max_connections: u32,
    already_migrated: bool,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    if !already_migrated {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_database_refuses_queries() {
        let db = Database::disconnected("sem url");

        assert_eq!(db.status(), "disconnected");
        assert!(matches!(db.pool(), Err(AppError::DatabaseUnavailable)));
    }

    #[test]
    fn connecting_database_is_not_usable_yet() {
        let db = Database::connecting();

        assert_eq!(db.status(), "connecting");
        assert!(db.pool().is_err());
    }

    #[tokio::test]
    async fn failed_health_check_drops_back_to_disconnected() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/practicas")
            .expect("url válida");
        let db = Database::connected(pool);
        let shared = db.clone();

        assert_eq!(db.status(), "connected");
        assert!(db.pool().is_ok());

        shared.mark_disconnected("timeout");

        assert_eq!(db.status(), "disconnected");
        assert!(matches!(
            db.state(),
            ConnectionState::Disconnected { ref reason } if reason == "timeout"
        ));
    }
}
