// src/db/hour_log_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Database,
    models::hour_log::{EstadoRegistro, HorasPorMes, RegistroHora, ResumenHoras},
};

pub struct NewHourLog<'a> {
    pub estudiante_id: Uuid,
    pub matriculacion_id: Uuid,
    pub tipo_actividad_id: Option<Uuid>,
    pub fecha: NaiveDate,
    pub horas: Decimal,
    pub descripcion: &'a str,
    pub ubicacion: Option<&'a str>,
}

pub struct HourLogChanges<'a> {
    pub horas: Decimal,
    pub descripcion: &'a str,
    pub tipo_actividad_id: Option<Uuid>,
    pub ubicacion: Option<&'a str>,
}

#[derive(Clone)]
pub struct HourLogRepository {
    db: Database,
}

impl HourLogRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // A unicidade (estudiante_id, fecha) fica a cargo da constraint do banco.
    pub async fn create(&self, input: NewHourLog<'_>) -> Result<RegistroHora, AppError> {
        let pool = self.db.pool()?;
        let registro = sqlx::query_as::<_, RegistroHora>(
            r#"
            INSERT INTO registros_horas
                (estudiante_id, matriculacion_id, tipo_actividad_id, fecha, horas, descripcion, ubicacion)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.estudiante_id)
        .bind(input.matriculacion_id)
        .bind(input.tipo_actividad_id)
        .bind(input.fecha)
        .bind(input.horas)
        .bind(input.descripcion.trim())
        .bind(input.ubicacion)
        .fetch_one(&pool)
        .await?;
        Ok(registro)
    }

    pub async fn find_for_student(
        &self,
        id: Uuid,
        estudiante_id: Uuid,
    ) -> Result<Option<RegistroHora>, AppError> {
        let pool = self.db.pool()?;
        let registro = sqlx::query_as::<_, RegistroHora>(
            "SELECT * FROM registros_horas WHERE id = $1 AND estudiante_id = $2",
        )
        .bind(id)
        .bind(estudiante_id)
        .fetch_optional(&pool)
        .await?;
        Ok(registro)
    }

    pub async fn list_for_student(&self, estudiante_id: Uuid) -> Result<Vec<RegistroHora>, AppError> {
        let pool = self.db.pool()?;
        let registros = sqlx::query_as::<_, RegistroHora>(
            "SELECT * FROM registros_horas WHERE estudiante_id = $1 ORDER BY fecha DESC",
        )
        .bind(estudiante_id)
        .fetch_all(&pool)
        .await?;
        Ok(registros)
    }

    pub async fn recent_for_student(
        &self,
        estudiante_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RegistroHora>, AppError> {
        let pool = self.db.pool()?;
        let registros = sqlx::query_as::<_, RegistroHora>(
            "SELECT * FROM registros_horas WHERE estudiante_id = $1 ORDER BY fecha DESC LIMIT $2",
        )
        .bind(estudiante_id)
        .bind(limit)
        .fetch_all(&pool)
        .await?;
        Ok(registros)
    }

    pub async fn recent_for_enrollment(
        &self,
        matriculacion_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RegistroHora>, AppError> {
        let pool = self.db.pool()?;
        let registros = sqlx::query_as::<_, RegistroHora>(
            "SELECT * FROM registros_horas WHERE matriculacion_id = $1 ORDER BY fecha DESC LIMIT $2",
        )
        .bind(matriculacion_id)
        .bind(limit)
        .fetch_all(&pool)
        .await?;
        Ok(registros)
    }

    pub async fn summary_for_student(&self, estudiante_id: Uuid) -> Result<ResumenHoras, AppError> {
        let pool = self.db.pool()?;
        let resumen = sqlx::query_as::<_, ResumenHoras>(
            r#"
            SELECT COUNT(*) AS total_registros, COALESCE(SUM(horas), 0) AS total_horas
            FROM registros_horas WHERE estudiante_id = $1
            "#,
        )
        .bind(estudiante_id)
        .fetch_one(&pool)
        .await?;
        Ok(resumen)
    }

    pub async fn summary_for_enrollment(&self, matriculacion_id: Uuid) -> Result<ResumenHoras, AppError> {
        let pool = self.db.pool()?;
        let resumen = sqlx::query_as::<_, ResumenHoras>(
            r#"
            SELECT COUNT(*) AS total_registros, COALESCE(SUM(horas), 0) AS total_horas
            FROM registros_horas WHERE matriculacion_id = $1
            "#,
        )
        .bind(matriculacion_id)
        .fetch_one(&pool)
        .await?;
        Ok(resumen)
    }

    pub async fn hours_by_month(&self, estudiante_id: Uuid) -> Result<Vec<HorasPorMes>, AppError> {
        let pool = self.db.pool()?;
        let meses = sqlx::query_as::<_, HorasPorMes>(
            r#"
            SELECT to_char(fecha, 'YYYY-MM') AS mes, SUM(horas) AS horas
            FROM registros_horas
            WHERE estudiante_id = $1
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(estudiante_id)
        .fetch_all(&pool)
        .await?;
        Ok(meses)
    }

    pub async fn update_for_student(
        &self,
        id: Uuid,
        estudiante_id: Uuid,
        changes: HourLogChanges<'_>,
    ) -> Result<Option<RegistroHora>, AppError> {
        let pool = self.db.pool()?;
        let registro = sqlx::query_as::<_, RegistroHora>(
            r#"
            UPDATE registros_horas
            SET horas = $3, descripcion = $4, tipo_actividad_id = $5, ubicacion = $6, updated_at = NOW()
            WHERE id = $1 AND estudiante_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(estudiante_id)
        .bind(changes.horas)
        .bind(changes.descripcion.trim())
        .bind(changes.tipo_actividad_id)
        .bind(changes.ubicacion)
        .fetch_optional(&pool)
        .await?;
        Ok(registro)
    }

    pub async fn delete_for_student(&self, id: Uuid, estudiante_id: Uuid) -> Result<bool, AppError> {
        let pool = self.db.pool()?;
        let result = sqlx::query("DELETE FROM registros_horas WHERE id = $1 AND estudiante_id = $2")
            .bind(id)
            .bind(estudiante_id)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Aprovação/rejeição feita por um administrador.
    pub async fn review(
        &self,
        id: Uuid,
        estado: EstadoRegistro,
        admin_id: Uuid,
    ) -> Result<Option<RegistroHora>, AppError> {
        let pool = self.db.pool()?;
        let registro = sqlx::query_as::<_, RegistroHora>(
            r#"
            UPDATE registros_horas
            SET estado = $2,
                aprobado_por = CASE WHEN $2 = 'pendiente' THEN NULL ELSE $3 END,
                fecha_aprobacion = CASE WHEN $2 = 'pendiente' THEN NULL ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(estado.as_str())
        .bind(admin_id)
        .fetch_optional(&pool)
        .await?;
        Ok(registro)
    }
}
