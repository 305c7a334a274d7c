// src/services/lead_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::FixedOffset;
#[cfg(test)]
use mockall::automock;

use crate::{
    common::error::AppError,
    config::AppConfig,
    db::LeadRepository,
    models::lead::{
        CreateLeadPayload, LeadStatus, LeadUpdate, SolicitudDemo, SolicitudDemoView,
        UpdateLeadPayload,
    },
};

#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    config: Arc<AppConfig>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LeadStatusStore: Send + Sync {
    async fn lead_exists(&self, id: i32) -> Result<bool, AppError>;
    async fn remove_lead(&self, id: i32) -> Result<bool, AppError>;
    async fn set_lead_status(
        &self,
        id: i32,
        estado: LeadStatus,
        notas: Option<String>,
    ) -> Result<Option<SolicitudDemo>, AppError>;
}

#[async_trait]
impl LeadStatusStore for LeadRepository {
    async fn lead_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    async fn remove_lead(&self, id: i32) -> Result<bool, AppError> {
        self.delete(id).await
    }

    async fn set_lead_status(
        &self,
        id: i32,
        estado: LeadStatus,
        notas: Option<String>,
    ) -> Result<Option<SolicitudDemo>, AppError> {
        self.update_status(id, estado.as_str(), notas.as_deref()).await
    }
}

// Marcar como contactado tira a solicitação da fila (a linha é apagada).
pub async fn apply_status_update(
    store: &dyn LeadStatusStore,
    id: i32,
    payload: &UpdateLeadPayload,
) -> Result<LeadUpdate, AppError> {
    if !store.lead_exists(id).await? {
        return Err(AppError::not_found("Lead no encontrado"));
    }

    if payload.estado == LeadStatus::Contactado {
        store.remove_lead(id).await?;
        tracing::info!(lead = id, "Lead contactado e removido");
        return Ok(LeadUpdate::Removed);
    }

    store
        .set_lead_status(id, payload.estado, payload.notas.clone())
        .await?
        .map(LeadUpdate::Updated)
        .ok_or_else(|| AppError::not_found("Lead no encontrado"))
}

pub fn display_offset(hours: i32) -> Result<FixedOffset, AppError> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow::anyhow!("LEAD_DISPLAY_UTC_OFFSET_HOURS fora do intervalo: {hours}").into())
}

impl LeadService {
    pub fn new(lead_repo: LeadRepository, config: Arc<AppConfig>) -> Self {
        Self { lead_repo, config }
    }

    pub async fn create(&self, payload: &CreateLeadPayload) -> Result<SolicitudDemo, AppError> {
        let lead = self.lead_repo.create(payload).await?;
        tracing::info!(lead = lead.id, "Nova solicitação de demo");
        Ok(lead)
    }

    pub async fn list(&self) -> Result<Vec<SolicitudDemoView>, AppError> {
        let offset = display_offset(self.config.lead_display_offset_hours)?;
        let leads = self.lead_repo.list().await?;
        Ok(leads.into_iter().map(|lead| lead.presented_at(offset)).collect())
    }

    pub async fn update(&self, id: i32, payload: &UpdateLeadPayload) -> Result<LeadUpdate, AppError> {
        apply_status_update(&self.lead_repo, id, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use testresult::TestResult;

    fn payload(estado: LeadStatus) -> UpdateLeadPayload {
        UpdateLeadPayload { estado, notas: Some("Llamar el lunes".into()) }
    }

    fn lead(id: i32, estado: &str) -> SolicitudDemo {
        SolicitudDemo {
            id,
            nombre_completo: "Test".into(),
            codigo_pais: "+593".into(),
            telefono: "0999999999".into(),
            fecha_solicitud: Utc.with_ymd_and_hms(2025, 5, 2, 3, 30, 0).unwrap(),
            estado: estado.into(),
            notas: Some("Llamar el lunes".into()),
        }
    }

    #[tokio::test]
    async fn contacted_lead_is_removed_instead_of_updated() -> TestResult {
        let mut store = MockLeadStatusStore::new();
        store.expect_lead_exists().with(eq(7)).returning(|_| Ok(true));
        store.expect_remove_lead().with(eq(7)).times(1).returning(|_| Ok(true));
        store.expect_set_lead_status().never();

        let outcome = apply_status_update(&store, 7, &payload(LeadStatus::Contactado)).await?;

        assert!(matches!(outcome, LeadUpdate::Removed));
        Ok(())
    }

    #[tokio::test]
    async fn discarded_lead_keeps_its_row() -> TestResult {
        let mut store = MockLeadStatusStore::new();
        store.expect_lead_exists().returning(|_| Ok(true));
        store.expect_remove_lead().never();
        store
            .expect_set_lead_status()
            .with(eq(7), eq(LeadStatus::Descartado), eq(Some("Llamar el lunes".to_string())))
            .times(1)
            .returning(|id, _, _| Ok(Some(lead(id, "descartado"))));

        let outcome = apply_status_update(&store, 7, &payload(LeadStatus::Descartado)).await?;

        match outcome {
            LeadUpdate::Updated(updated) => assert_eq!(updated.estado, "descartado"),
            LeadUpdate::Removed => return Err("lead descartado não deveria sumir".into()),
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_lead_is_not_found() {
        let mut store = MockLeadStatusStore::new();
        store.expect_lead_exists().returning(|_| Ok(false));
        store.expect_remove_lead().never();

        let result = apply_status_update(&store, 99, &payload(LeadStatus::Contactado)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn offset_is_built_from_whole_hours() {
        assert_eq!(display_offset(-5).ok(), FixedOffset::west_opt(5 * 3600));
        assert_eq!(display_offset(0).ok(), FixedOffset::east_opt(0));
    }

    #[test]
    fn absurd_offsets_are_rejected() {
        assert!(display_offset(30).is_err());
        assert!(display_offset(i32::MAX).is_err());
    }
}
