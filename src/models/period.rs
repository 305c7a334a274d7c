// src/models/period.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Periodo {
    pub id: Uuid,
    pub universidad_id: Uuid,
    #[schema(example = "2025-I")]
    pub nombre: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[schema(example = 240)]
    pub horas_totales_requeridas: i32,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Período com o nome da universidade, para as listagens
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PeriodoListado {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub periodo: Periodo,
    pub universidad_nombre: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_dates", skip_on_field_errors = false))]
pub struct CreatePeriodoPayload {
    pub universidad_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido (máximo 100 caracteres)"))]
    pub nombre: String,
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[validate(range(min = 1, message = "Las horas requeridas deben ser al menos 1"))]
    pub horas_totales_requeridas: i32,
}

fn validate_create_dates(payload: &CreatePeriodoPayload) -> Result<(), ValidationError> {
    check_date_order(payload.fecha_inicio, payload.fecha_fin)
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePeriodoPayload {
    pub universidad_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "El nombre es requerido (máximo 100 caracteres)"))]
    pub nombre: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Las horas requeridas deben ser al menos 1"))]
    pub horas_totales_requeridas: Option<i32>,
    pub activo: Option<bool>,
}

pub fn check_date_order(inicio: NaiveDate, fin: NaiveDate) -> Result<(), ValidationError> {
    if inicio < fin {
        Ok(())
    } else {
        Err(ValidationError::new("fechas")
            .with_message("La fecha de inicio debe ser anterior a la fecha de fin".into()))
    }
}

impl Periodo {
    // Aplica a atualização parcial, validando as datas contra os valores resultantes.
    pub fn merged_with(&self, changes: &UpdatePeriodoPayload) -> Result<Periodo, ValidationError> {
        let mut merged = self.clone();

        if let Some(universidad_id) = changes.universidad_id {
            merged.universidad_id = universidad_id;
        }
        if let Some(nombre) = &changes.nombre {
            merged.nombre = nombre.clone();
        }
        if let Some(inicio) = changes.fecha_inicio {
            merged.fecha_inicio = inicio;
        }
        if let Some(fin) = changes.fecha_fin {
            merged.fecha_fin = fin;
        }
        if let Some(horas) = changes.horas_totales_requeridas {
            merged.horas_totales_requeridas = horas;
        }
        if let Some(activo) = changes.activo {
            merged.activo = activo;
        }

        check_date_order(merged.fecha_inicio, merged.fecha_fin)?;
        Ok(merged)
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.fecha_fin < today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("data válida")
    }

    fn periodo() -> Periodo {
        Periodo {
            id: Uuid::nil(),
            universidad_id: Uuid::nil(),
            nombre: "2025-I".into(),
            fecha_inicio: date(2025, 3, 1),
            fecha_fin: date(2025, 7, 31),
            horas_totales_requeridas: 240,
            activo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_payload_rejects_inverted_dates() {
        let payload = CreatePeriodoPayload {
            universidad_id: Uuid::nil(),
            nombre: "2025-II".into(),
            fecha_inicio: date(2025, 12, 1),
            fecha_fin: date(2025, 8, 1),
            horas_totales_requeridas: 240,
        };

        assert!(payload.validate().is_err());
    }

    #[test]
    fn create_payload_rejects_zero_hours() {
        let payload = CreatePeriodoPayload {
            universidad_id: Uuid::nil(),
            nombre: "2025-II".into(),
            fecha_inicio: date(2025, 8, 1),
            fecha_fin: date(2025, 12, 1),
            horas_totales_requeridas: 0,
        };

        let errors = payload.validate().expect_err("horas zeradas");
        assert!(errors.field_errors().contains_key("horas_totales_requeridas"));
    }

    #[test]
    fn partial_update_checks_dates_against_stored_values() {
        let changes = UpdatePeriodoPayload {
            fecha_inicio: Some(date(2025, 9, 1)),
            ..Default::default()
        };

        assert!(periodo().merged_with(&changes).is_err());
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let changes = UpdatePeriodoPayload {
            nombre: Some("2025-I bis".into()),
            ..Default::default()
        };

        let merged = periodo().merged_with(&changes).expect("datas intactas");
        assert_eq!(merged.nombre, "2025-I bis");
        assert_eq!(merged.horas_totales_requeridas, 240);
    }

    #[test]
    fn period_ending_today_is_not_yet_expired() {
        let p = periodo();

        assert!(!p.is_expired_on(date(2025, 7, 31)));
        assert!(p.is_expired_on(date(2025, 8, 1)));
    }
}
