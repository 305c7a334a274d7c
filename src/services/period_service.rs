// src/services/period_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{
        cache::{CacheScope, ResponseCache},
        error::AppError,
    },
    db::{PeriodRepository, UniversityRepository},
    jobs::period_sweeper,
    models::period::{CreatePeriodoPayload, Periodo, UpdatePeriodoPayload},
};

#[derive(Clone)]
pub struct PeriodService {
    period_repo: PeriodRepository,
    university_repo: UniversityRepository,
    cache: Arc<dyn ResponseCache>,
}

impl PeriodService {
    pub fn new(
        period_repo: PeriodRepository,
        university_repo: UniversityRepository,
        cache: Arc<dyn ResponseCache>,
    ) -> Self {
        Self {
            period_repo,
            university_repo,
            cache,
        }
    }

    pub async fn find(&self, id: Uuid) -> Result<Periodo, AppError> {
        self.period_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Periodo no encontrado"))
    }

    pub async fn create(&self, payload: &CreatePeriodoPayload) -> Result<Periodo, AppError> {
        self.ensure_university(payload.universidad_id).await?;

        let periodo = self.period_repo.create(payload).await?;
        self.cache.invalidate(CacheScope::All);
        tracing::info!(periodo = %periodo.id, "Período criado");
        Ok(periodo)
    }

    // As datas são validadas contra o resultado da mescla, não só contra o payload.
    pub async fn update(&self, id: Uuid, changes: &UpdatePeriodoPayload) -> Result<Periodo, AppError> {
        let current = self.find(id).await?;

        if let Some(universidad_id) = changes.universidad_id {
            if universidad_id != current.universidad_id {
                self.ensure_university(universidad_id).await?;
            }
        }

        let merged = current.merged_with(changes).map_err(|e| {
            AppError::BadRequest(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Fechas inválidas".to_string()),
            )
        })?;

        let periodo = self.period_repo.update(&merged).await?;
        self.cache.invalidate(CacheScope::All);
        Ok(periodo)
    }

    pub async fn toggle(&self, id: Uuid) -> Result<Periodo, AppError> {
        let periodo = self
            .period_repo
            .toggle(id)
            .await?
            .ok_or_else(|| AppError::not_found("Periodo no encontrado"))?;
        self.cache.invalidate(CacheScope::All);
        Ok(periodo)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let (estudiantes, matriculas) = self.period_repo.count_dependents(id).await?;
        if estudiantes > 0 || matriculas > 0 {
            return Err(AppError::bad_request(
                "No se puede eliminar el periodo porque tiene estudiantes o matrículas asociadas",
            ));
        }

        if !self.period_repo.delete(id).await? {
            return Err(AppError::not_found("Periodo no encontrado"));
        }
        self.cache.invalidate(CacheScope::All);
        Ok(())
    }

    // Mesmo caminho da tarefa diária, disparado manualmente.
    pub async fn run_sweep(&self, today: NaiveDate) -> Result<u64, AppError> {
        period_sweeper::sweep_once(&self.period_repo, self.cache.as_ref(), today).await
    }

    async fn ensure_university(&self, id: Uuid) -> Result<(), AppError> {
        self.university_repo
            .find_by_id(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Universidad no encontrada"))
    }
}
