// src/services/hour_log_service.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppConfig,
    db::{
        hour_log_repo::{HourLogChanges, NewHourLog},
        ActivityRepository, EnrollmentRepository, HourLogRepository,
    },
    models::{
        activity::{CreateEvidenciaPayload, Evidencia},
        dashboard::{HourStatistics, StudentDashboard},
        enrollment::{completion_percentage, missing_hours},
        hour_log::{CreateRegistroPayload, EstadoRegistro, RegistroHora, UpdateRegistroPayload},
    },
};

const RECENT_LOGS: i64 = 10;

#[derive(Clone)]
pub struct HourLogService {
    hour_log_repo: HourLogRepository,
    enrollment_repo: EnrollmentRepository,
    activity_repo: ActivityRepository,
    config: Arc<AppConfig>,
}

pub fn check_log_date(fecha: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if fecha > today {
        return Err(AppError::bad_request(
            "No se pueden registrar horas en fechas futuras",
        ));
    }
    Ok(())
}

// Conta caracteres, não bytes: acentos valem um.
pub fn check_description(descripcion: &str, min_length: usize) -> Result<(), AppError> {
    if descripcion.trim().chars().count() < min_length {
        return Err(AppError::BadRequest(format!(
            "La descripción debe tener al menos {min_length} caracteres"
        )));
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn render_csv(registros: &[RegistroHora]) -> String {
    let mut csv = String::from("Fecha,Horas,Descripción,Fecha de Registro\n");
    for registro in registros {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            registro.fecha.format("%Y-%m-%d"),
            registro.horas.normalize(),
            csv_field(&registro.descripcion),
            registro.created_at.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    csv
}

impl HourLogService {
    pub fn new(
        hour_log_repo: HourLogRepository,
        enrollment_repo: EnrollmentRepository,
        activity_repo: ActivityRepository,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            hour_log_repo,
            enrollment_repo,
            activity_repo,
            config,
        }
    }

    // O registro é carimbado com a matrícula ativa. Data duplicada cai na
    // constraint única (estudiante_id, fecha) e volta como 400.
    pub async fn create(
        &self,
        estudiante_id: Uuid,
        payload: &CreateRegistroPayload,
        today: NaiveDate,
    ) -> Result<RegistroHora, AppError> {
        check_log_date(payload.fecha, today)?;
        check_description(&payload.descripcion, self.config.min_description_length)?;

        let matricula = self
            .enrollment_repo
            .find_active(estudiante_id)
            .await?
            .ok_or_else(|| {
                AppError::bad_request("No tienes una matrícula activa en ningún periodo")
            })?;

        if let Some(tipo_id) = payload.tipo_actividad_id {
            self.ensure_activity_type(tipo_id).await?;
        }

        let registro = self
            .hour_log_repo
            .create(NewHourLog {
                estudiante_id,
                matriculacion_id: matricula.id,
                tipo_actividad_id: payload.tipo_actividad_id,
                fecha: payload.fecha,
                horas: payload.horas,
                descripcion: &payload.descripcion,
                ubicacion: payload.ubicacion.as_deref(),
            })
            .await?;

        tracing::info!(%estudiante_id, registro = %registro.id, "Horas registradas");
        Ok(registro)
    }

    pub async fn find(&self, estudiante_id: Uuid, id: Uuid) -> Result<RegistroHora, AppError> {
        self.hour_log_repo
            .find_for_student(id, estudiante_id)
            .await?
            .ok_or_else(|| AppError::not_found("Registro no encontrado"))
    }

    pub async fn update(
        &self,
        estudiante_id: Uuid,
        id: Uuid,
        changes: &UpdateRegistroPayload,
    ) -> Result<RegistroHora, AppError> {
        let current = self.find(estudiante_id, id).await?;

        let descripcion = changes.descripcion.as_deref().unwrap_or(&current.descripcion);
        check_description(descripcion, self.config.min_description_length)?;

        let tipo_actividad_id = changes.tipo_actividad_id.or(current.tipo_actividad_id);
        if let Some(tipo_id) = changes.tipo_actividad_id {
            self.ensure_activity_type(tipo_id).await?;
        }

        self.hour_log_repo
            .update_for_student(
                id,
                estudiante_id,
                HourLogChanges {
                    horas: changes.horas.unwrap_or(current.horas),
                    descripcion,
                    tipo_actividad_id,
                    ubicacion: changes.ubicacion.as_deref().or(current.ubicacion.as_deref()),
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("Registro no encontrado"))
    }

    pub async fn delete(&self, estudiante_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.hour_log_repo.delete_for_student(id, estudiante_id).await? {
            return Err(AppError::not_found("Registro no encontrado"));
        }
        Ok(())
    }

    pub async fn review(
        &self,
        id: Uuid,
        estado: EstadoRegistro,
        admin_id: Uuid,
    ) -> Result<RegistroHora, AppError> {
        let registro = self
            .hour_log_repo
            .review(id, estado, admin_id)
            .await?
            .ok_or_else(|| AppError::not_found("Registro no encontrado"))?;
        tracing::info!(registro = %id, estado = estado.as_str(), %admin_id, "Registro revisado");
        Ok(registro)
    }

    // Sem matrícula ativa o painel sai zerado.
    pub async fn dashboard(&self, estudiante_id: Uuid) -> Result<StudentDashboard, AppError> {
        let Some(matricula) = self.enrollment_repo.find_active(estudiante_id).await? else {
            return Ok(StudentDashboard {
                total_registros: 0,
                total_horas: Default::default(),
                horas_requeridas: 0,
                horas_faltantes: Default::default(),
                porcentaje: 0.0,
                ultimos_registros: Vec::new(),
            });
        };

        let resumen = self.hour_log_repo.summary_for_enrollment(matricula.id).await?;
        let ultimos = self
            .hour_log_repo
            .recent_for_enrollment(matricula.id, RECENT_LOGS)
            .await?;
        let requeridas = matricula.horas_totales_requeridas;

        Ok(StudentDashboard {
            total_registros: resumen.total_registros,
            total_horas: resumen.total_horas,
            horas_requeridas: requeridas,
            horas_faltantes: missing_hours(resumen.total_horas, requeridas),
            porcentaje: completion_percentage(resumen.total_horas, requeridas),
            ultimos_registros: ultimos,
        })
    }

    pub async fn statistics(&self, estudiante_id: Uuid) -> Result<HourStatistics, AppError> {
        let resumen = self.hour_log_repo.summary_for_student(estudiante_id).await?;
        let por_mes = self.hour_log_repo.hours_by_month(estudiante_id).await?;
        let ultimos = self
            .hour_log_repo
            .recent_for_student(estudiante_id, RECENT_LOGS)
            .await?;

        Ok(HourStatistics {
            total_registros: resumen.total_registros,
            total_horas: resumen.total_horas,
            horas_por_mes: por_mes.into_iter().map(|m| (m.mes, m.horas)).collect::<BTreeMap<_, _>>(),
            ultimos_registros: ultimos,
        })
    }

    pub async fn export_csv(&self, estudiante_id: Uuid) -> Result<String, AppError> {
        let registros = self.hour_log_repo.list_for_student(estudiante_id).await?;
        Ok(render_csv(&registros))
    }

    pub async fn add_evidence(
        &self,
        estudiante_id: Uuid,
        registro_id: Uuid,
        payload: &CreateEvidenciaPayload,
    ) -> Result<Evidencia, AppError> {
        self.find(estudiante_id, registro_id).await?;
        self.activity_repo.add_evidence(registro_id, payload).await
    }

    pub async fn list_evidence(
        &self,
        estudiante_id: Uuid,
        registro_id: Uuid,
    ) -> Result<Vec<Evidencia>, AppError> {
        self.find(estudiante_id, registro_id).await?;
        self.activity_repo.list_evidence(registro_id).await
    }

    async fn ensure_activity_type(&self, id: Uuid) -> Result<(), AppError> {
        if !self.activity_repo.is_active_type(id).await? {
            return Err(AppError::not_found("Tipo de actividad no encontrado"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("data válida")
    }

    fn registro(descripcion: &str) -> RegistroHora {
        RegistroHora {
            id: Uuid::nil(),
            estudiante_id: Uuid::nil(),
            matriculacion_id: Uuid::nil(),
            tipo_actividad_id: None,
            fecha: date(2025, 4, 10),
            horas: "4.50".parse().expect("decimal"),
            descripcion: descripcion.into(),
            estado: "pendiente".into(),
            aprobado_por: None,
            fecha_aprobacion: None,
            ubicacion: None,
            created_at: Utc.with_ymd_and_hms(2025, 4, 10, 18, 5, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 4, 10, 18, 5, 0).unwrap(),
        }
    }

    #[test]
    fn today_is_accepted_tomorrow_is_not() {
        let today = date(2025, 4, 10);

        assert!(check_log_date(today, today).is_ok());
        assert!(check_log_date(date(2025, 4, 9), today).is_ok());
        assert!(matches!(
            check_log_date(date(2025, 4, 11), today),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn description_length_counts_characters_after_trim() {
        assert!(check_description("Reunión de", 10).is_ok());
        assert!(check_description("   corta   ", 10).is_err());
        assert!(check_description("ñññññññññ", 10).is_err());
    }

    #[test]
    fn csv_has_header_and_escapes_quotes() {
        let csv = render_csv(&[registro("Revisión del módulo \"pagos\"")]);
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("Fecha,Horas,Descripción,Fecha de Registro"));
        assert_eq!(
            lines.next(),
            Some("2025-04-10,4.5,\"Revisión del módulo \"\"pagos\"\"\",2025-04-10 18:05:00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_export_is_just_the_header() {
        assert_eq!(render_csv(&[]), "Fecha,Horas,Descripción,Fecha de Registro\n");
    }
}
