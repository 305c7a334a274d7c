// src/db/dashboard_repo.rs

use crate::{common::error::AppError, db::Database, models::dashboard::AdminDashboard};

#[derive(Clone)]
pub struct DashboardRepository {
    db: Database,
}

impl DashboardRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn admin_summary(&self) -> Result<AdminDashboard, AppError> {
        let pool = self.db.pool()?;
        let resumo = sqlx::query_as::<_, AdminDashboard>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM universidades) AS total_universidades,
                (SELECT COUNT(*) FROM universidades WHERE activa) AS universidades_activas,
                (SELECT COUNT(*) FROM estudiantes) AS total_estudiantes,
                (SELECT COUNT(*) FROM estudiantes WHERE activo) AS estudiantes_activos,
                (SELECT COUNT(*) FROM periodos) AS total_periodos,
                (SELECT COUNT(*) FROM periodos WHERE activo) AS periodos_activos,
                (SELECT COUNT(*) FROM matriculaciones WHERE activa) AS matriculas_activas,
                (SELECT COALESCE(SUM(horas), 0) FROM registros_horas) AS total_horas
            "#,
        )
        .fetch_one(&pool)
        .await?;
        Ok(resumo)
    }
}
