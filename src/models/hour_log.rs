// src/models/hour_log.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RegistroHora {
    pub id: Uuid,
    pub estudiante_id: Uuid,
    pub matriculacion_id: Uuid,
    pub tipo_actividad_id: Option<Uuid>,
    pub fecha: NaiveDate,
    #[schema(value_type = f64, example = 4.5)]
    pub horas: Decimal,
    pub descripcion: String,
    #[schema(example = "pendiente")]
    pub estado: String,
    pub aprobado_por: Option<Uuid>,
    pub fecha_aprobacion: Option<DateTime<Utc>>,
    pub ubicacion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EstadoRegistro {
    Pendiente,
    Aprobado,
    Rechazado,
}

impl EstadoRegistro {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoRegistro::Pendiente => "pendiente",
            EstadoRegistro::Aprobado => "aprobado",
            EstadoRegistro::Rechazado => "rechazado",
        }
    }
}

pub const MIN_HORAS: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
pub const MAX_HORAS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

pub fn validate_horas(horas: &Decimal) -> Result<(), ValidationError> {
    if *horas < MIN_HORAS || *horas > MAX_HORAS {
        return Err(ValidationError::new("horas")
            .with_message("Las horas deben estar entre 0.5 y 24".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRegistroPayload {
    pub fecha: NaiveDate,
    #[validate(custom(function = "validate_horas"))]
    #[schema(value_type = f64, example = 4.5)]
    pub horas: Decimal,
    #[validate(length(min = 1, message = "La descripción es requerida"))]
    pub descripcion: String,
    pub tipo_actividad_id: Option<Uuid>,
    #[validate(length(max = 255, message = "La ubicación admite como máximo 255 caracteres"))]
    pub ubicacion: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRegistroPayload {
    #[validate(custom(function = "validate_horas"))]
    #[schema(value_type = Option<f64>)]
    pub horas: Option<Decimal>,
    #[validate(length(min = 1, message = "La descripción es requerida"))]
    pub descripcion: Option<String>,
    pub tipo_actividad_id: Option<Uuid>,
    #[validate(length(max = 255, message = "La ubicación admite como máximo 255 caracteres"))]
    pub ubicacion: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevisarRegistroPayload {
    pub estado: EstadoRegistro,
}

// Total de horas por mês (chave "YYYY-MM")
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HorasPorMes {
    pub mes: String,
    pub horas: Decimal,
}

// Resumo agregado de registros (contagem + soma)
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow)]
pub struct ResumenHoras {
    pub total_registros: i64,
    pub total_horas: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(horas: &str) -> CreateRegistroPayload {
        CreateRegistroPayload {
            fecha: NaiveDate::from_ymd_opt(2025, 4, 10).expect("data"),
            horas: horas.parse().expect("decimal"),
            descripcion: "Soporte al área de sistemas".into(),
            tipo_actividad_id: None,
            ubicacion: None,
        }
    }

    #[test]
    fn hour_bounds_are_inclusive() {
        assert!(payload("0.5").validate().is_ok());
        assert!(payload("24").validate().is_ok());
    }

    #[test]
    fn hours_outside_bounds_are_rejected() {
        assert!(payload("0.49").validate().is_err());
        assert!(payload("24.01").validate().is_err());
        assert!(payload("0").validate().is_err());
    }

    #[test]
    fn review_status_uses_lowercase_names() {
        let revisar: RevisarRegistroPayload =
            serde_json::from_str(r#"{"estado":"aprobado"}"#).expect("desserializa");

        assert_eq!(revisar.estado, EstadoRegistro::Aprobado);
        assert_eq!(revisar.estado.as_str(), "aprobado");
        assert!(serde_json::from_str::<RevisarRegistroPayload>(r#"{"estado":"ok"}"#).is_err());
    }
}
