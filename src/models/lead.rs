// src/models/lead.rs

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SolicitudDemo {
    pub id: i32,
    pub nombre_completo: String,
    pub codigo_pais: String,
    pub telefono: String,
    // Sempre em UTC; a conversão para o fuso local é feita na apresentação.
    pub fecha_solicitud: DateTime<Utc>,
    pub estado: String,
    pub notas: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolicitudDemoView {
    #[serde(flatten)]
    pub solicitud: SolicitudDemo,
    pub fecha_solicitud_local: String,
}

impl SolicitudDemo {
    pub fn presented_at(self, offset: FixedOffset) -> SolicitudDemoView {
        let local = self.fecha_solicitud.with_timezone(&offset);
        SolicitudDemoView {
            fecha_solicitud_local: local.format("%Y-%m-%d %H:%M:%S").to_string(),
            solicitud: self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Pendiente,
    Contactado,
    Descartado,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pendiente => "pendiente",
            LeadStatus::Contactado => "contactado",
            LeadStatus::Descartado => "descartado",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido"))]
    #[schema(example = "Test")]
    pub nombre: String,
    #[validate(length(min = 1, max = 10, message = "El código de país es requerido"))]
    #[schema(example = "+593")]
    pub codigo_pais: String,
    #[validate(length(min = 1, max = 20, message = "El teléfono es requerido"))]
    #[schema(example = "0999999999")]
    pub telefono: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeadPayload {
    pub estado: LeadStatus,
    pub notas: Option<String>,
}

// Resultado de uma troca de status: "contactado" remove a solicitação.
#[derive(Debug)]
pub enum LeadUpdate {
    Updated(SolicitudDemo),
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_rendering_applies_offset_to_utc() {
        let lead = SolicitudDemo {
            id: 1,
            nombre_completo: "Test".into(),
            codigo_pais: "+593".into(),
            telefono: "0999999999".into(),
            fecha_solicitud: Utc.with_ymd_and_hms(2025, 5, 2, 3, 30, 0).unwrap(),
            estado: "pendiente".into(),
            notas: None,
        };

        let view = lead.presented_at(FixedOffset::west_opt(5 * 3600).unwrap());

        assert_eq!(view.fecha_solicitud_local, "2025-05-01 22:30:00");
    }

    #[test]
    fn blank_fields_fail_validation() {
        let payload = CreateLeadPayload {
            nombre: "".into(),
            codigo_pais: "+593".into(),
            telefono: "".into(),
        };

        let errors = payload.validate().expect_err("campos vazios");
        assert!(errors.field_errors().contains_key("nombre"));
        assert!(errors.field_errors().contains_key("telefono"));
    }
}
