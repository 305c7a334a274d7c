// src/services/enrollment_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Database, EnrollmentRepository},
    models::{
        enrollment::{
            plan_enrollment, EnrollmentAction, EnrollmentOutcome, MatriculaMasivaResultado,
            ProgresoMatricula,
        },
        period::Periodo,
    },
};

#[derive(Clone)]
pub struct EnrollmentService {
    db: Database,
    enrollment_repo: EnrollmentRepository,
}

impl EnrollmentService {
    pub fn new(db: Database, enrollment_repo: EnrollmentRepository) -> Self {
        Self { db, enrollment_repo }
    }

    // Aplica a troca de período dentro da transação do chamador.
    // As matrículas do estudante ficam travadas (FOR UPDATE) até o commit.
    pub async fn assign(
        &self,
        conn: &mut PgConnection,
        estudiante_id: Uuid,
        periodo_id: Uuid,
    ) -> Result<EnrollmentOutcome, AppError> {
        let existing = self
            .enrollment_repo
            .lock_for_student(&mut *conn, estudiante_id)
            .await?;
        let plan = plan_enrollment(&existing, periodo_id);

        if !plan.deactivate.is_empty() {
            self.enrollment_repo
                .deactivate(&mut *conn, &plan.deactivate)
                .await?;
        }

        match plan.action {
            EnrollmentAction::KeepActive(_) => {}
            EnrollmentAction::Reactivate(id) => {
                self.enrollment_repo.reactivate(&mut *conn, id).await?;
            }
            EnrollmentAction::Create => {
                self.enrollment_repo
                    .create(&mut *conn, estudiante_id, periodo_id)
                    .await?;
            }
        }

        let outcome = EnrollmentOutcome::from(plan.action);
        tracing::debug!(%estudiante_id, %periodo_id, ?outcome, "Matrícula ajustada");
        Ok(outcome)
    }

    // Cada estudante em sua própria transação: uma falha não desfaz os demais.
    pub async fn bulk_enroll(
        &self,
        periodo: &Periodo,
        estudiante_ids: &[Uuid],
    ) -> Result<Vec<MatriculaMasivaResultado>, AppError> {
        let pool = self.db.pool()?;
        let mut resultados = Vec::with_capacity(estudiante_ids.len());

        for &estudiante_id in estudiante_ids {
            let outcome = async {
                let mut tx = pool.begin().await?;

                let found = self
                    .enrollment_repo
                    .set_student_period(&mut *tx, estudiante_id, periodo.id, periodo.universidad_id)
                    .await?;
                if !found {
                    return Err(AppError::not_found("Estudiante no encontrado"));
                }

                let outcome = self.assign(&mut tx, estudiante_id, periodo.id).await?;
                tx.commit().await?;
                Ok::<_, AppError>(outcome)
            }
            .await;

            resultados.push(match outcome {
                Ok(resultado) => MatriculaMasivaResultado {
                    estudiante_id,
                    resultado: Some(resultado),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(%estudiante_id, "Matrícula em lote falhou: {}", e);
                    MatriculaMasivaResultado {
                        estudiante_id,
                        resultado: None,
                        error: Some(e.client_message()),
                    }
                }
            });
        }

        Ok(resultados)
    }

    pub async fn period_summary(&self, periodo: &Periodo) -> Result<Vec<ProgresoMatricula>, AppError> {
        let progreso = self
            .enrollment_repo
            .progress_for_period(periodo.id)
            .await?
            .into_iter()
            .map(|p| p.with_percentage(periodo.horas_totales_requeridas))
            .collect();
        Ok(progreso)
    }
}
