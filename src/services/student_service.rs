// src/services/student_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppConfig,
    db::{
        student_repo::NewStudent, Database, HourLogRepository, PeriodRepository,
        StudentRepository, UserRepository,
    },
    models::{
        period::Periodo,
        student::{CreateEstudiantePayload, Estudiante, UpdateEstudiantePayload},
    },
    services::{auth::hash_password, enrollment_service::EnrollmentService},
};

#[derive(Clone)]
pub struct StudentService {
    db: Database,
    student_repo: StudentRepository,
    user_repo: UserRepository,
    period_repo: PeriodRepository,
    enrollment_service: EnrollmentService,
    hour_log_repo: HourLogRepository,
    config: Arc<AppConfig>,
}

// A universidade do estudante acompanha a do período; informar as duas só vale se batem.
pub fn resolve_university(
    universidad_id: Option<Uuid>,
    periodo: Option<&Periodo>,
) -> Result<Option<Uuid>, AppError> {
    match (universidad_id, periodo) {
        (Some(u), Some(p)) if u != p.universidad_id => Err(AppError::bad_request(
            "El periodo no pertenece a la universidad indicada",
        )),
        (_, Some(p)) => Ok(Some(p.universidad_id)),
        (u, None) => Ok(u),
    }
}

impl StudentService {
    pub fn new(
        db: Database,
        student_repo: StudentRepository,
        user_repo: UserRepository,
        period_repo: PeriodRepository,
        enrollment_service: EnrollmentService,
        hour_log_repo: HourLogRepository,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            student_repo,
            user_repo,
            period_repo,
            enrollment_service,
            hour_log_repo,
            config,
        }
    }

    // Estudante + matrícula no período informado, tudo na mesma transação.
    pub async fn create(&self, payload: &CreateEstudiantePayload) -> Result<Estudiante, AppError> {
        let periodo = self.find_period(payload.periodo_id).await?;
        let universidad_id = resolve_university(payload.universidad_id, periodo.as_ref())?;
        let password_hash = hash_password(&payload.password, self.config.bcrypt_cost).await?;

        let pool = self.db.pool()?;
        let mut tx = pool.begin().await?;

        if self.user_repo.email_in_use(&mut *tx, &payload.email, None).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        let estudiante = self
            .student_repo
            .create(
                &mut *tx,
                NewStudent {
                    nombres: &payload.nombres,
                    apellidos: &payload.apellidos,
                    email: &payload.email,
                    password_hash: &password_hash,
                    universidad_id,
                    periodo_id: periodo.as_ref().map(|p| p.id),
                },
            )
            .await?;

        if let Some(periodo) = &periodo {
            self.enrollment_service
                .assign(&mut tx, estudiante.id, periodo.id)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(estudiante = %estudiante.id, "Estudante criado");
        Ok(estudiante)
    }

    pub async fn update(&self, id: Uuid, changes: &UpdateEstudiantePayload) -> Result<Estudiante, AppError> {
        let periodo = self.find_period(changes.periodo_id).await?;

        let pool = self.db.pool()?;
        let mut tx = pool.begin().await?;

        let mut estudiante = self
            .student_repo
            .find_by_id_with(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Estudiante no encontrado"))?;

        if let Some(email) = &changes.email {
            if !email.trim().eq_ignore_ascii_case(&estudiante.email)
                && self.user_repo.email_in_use(&mut *tx, email.trim(), Some(id)).await?
            {
                return Err(AppError::Conflict("El email ya está registrado".to_string()));
            }
            estudiante.email = email.trim().to_string();
        }
        if let Some(nombres) = &changes.nombres {
            estudiante.nombres = nombres.clone();
        }
        if let Some(apellidos) = &changes.apellidos {
            estudiante.apellidos = apellidos.clone();
        }
        if let Some(activo) = changes.activo {
            estudiante.activo = activo;
        }

        match &periodo {
            Some(p) => {
                estudiante.universidad_id = resolve_university(changes.universidad_id, Some(p))?;
                estudiante.periodo_id = Some(p.id);
            }
            None => {
                if let Some(universidad_id) = changes.universidad_id {
                    estudiante.universidad_id = Some(universidad_id);
                }
            }
        }

        let updated = self.student_repo.update(&mut *tx, &estudiante).await?;

        // KeepActive é no-op; cobre também quem ainda não tinha matrícula ativa.
        if let Some(p) = &periodo {
            self.enrollment_service.assign(&mut tx, id, p.id).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let resumen = self.hour_log_repo.summary_for_student(id).await?;
        if resumen.total_registros > 0 {
            return Err(AppError::bad_request(
                "No se puede eliminar el estudiante porque tiene registros de horas",
            ));
        }

        if !self.student_repo.delete(id).await? {
            return Err(AppError::not_found("Estudiante no encontrado"));
        }
        tracing::info!(estudiante = %id, "Estudante removido");
        Ok(())
    }

    pub async fn reset_password(&self, id: Uuid, nueva_password: &str) -> Result<(), AppError> {
        let password_hash = hash_password(nueva_password, self.config.bcrypt_cost).await?;

        if !self.student_repo.update_password(id, &password_hash).await? {
            return Err(AppError::not_found("Estudiante no encontrado"));
        }
        Ok(())
    }

    async fn find_period(&self, periodo_id: Option<Uuid>) -> Result<Option<Periodo>, AppError> {
        match periodo_id {
            Some(id) => self
                .period_repo
                .find_by_id(id)
                .await?
                .map(Some)
                .ok_or_else(|| AppError::not_found("Periodo no encontrado")),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn periodo(universidad_id: Uuid) -> Periodo {
        Periodo {
            id: Uuid::new_v4(),
            universidad_id,
            nombre: "2025-I".into(),
            fecha_inicio: NaiveDate::from_ymd_opt(2025, 3, 1).expect("data"),
            fecha_fin: NaiveDate::from_ymd_opt(2025, 7, 31).expect("data"),
            horas_totales_requeridas: 240,
            activo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn university_follows_the_period() {
        let uni = Uuid::new_v4();
        let p = periodo(uni);

        assert_eq!(resolve_university(None, Some(&p)).ok(), Some(Some(uni)));
        assert_eq!(resolve_university(Some(uni), Some(&p)).ok(), Some(Some(uni)));
    }

    #[test]
    fn mismatched_university_is_rejected() {
        let p = periodo(Uuid::new_v4());

        let result = resolve_university(Some(Uuid::new_v4()), Some(&p));

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn without_period_the_given_university_is_kept() {
        let uni = Uuid::new_v4();

        assert_eq!(resolve_university(Some(uni), None).ok(), Some(Some(uni)));
        assert_eq!(resolve_university(None, None).ok(), Some(None));
    }
}
