// src/models/enrollment.rs

use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Matriculacion {
    pub id: Uuid,
    pub estudiante_id: Uuid,
    pub periodo_id: Uuid,
    pub fecha_matricula: DateTime<Utc>,
    pub activa: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Matrícula ativa do estudante com a meta de horas do período.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MatriculaActiva {
    pub id: Uuid,
    pub periodo_id: Uuid,
    pub periodo_nombre: String,
    pub horas_totales_requeridas: i32,
}

// O que fazer com a matrícula do período de destino.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentAction {
    KeepActive(Uuid),
    Reactivate(Uuid),
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentPlan {
    pub deactivate: Vec<Uuid>,
    pub action: EnrollmentAction,
}

// Regras de troca de período: desativa toda matrícula ativa de outro período,
// reaproveita a matrícula existente do destino (reativando se preciso) ou cria uma nova.
pub fn plan_enrollment(existing: &[Matriculacion], periodo_id: Uuid) -> EnrollmentPlan {
    let deactivate = existing
        .iter()
        .filter(|m| m.activa && m.periodo_id != periodo_id)
        .map(|m| m.id)
        .collect();

    let action = match existing.iter().find(|m| m.periodo_id == periodo_id) {
        Some(m) if m.activa => EnrollmentAction::KeepActive(m.id),
        Some(m) => EnrollmentAction::Reactivate(m.id),
        None => EnrollmentAction::Create,
    };

    EnrollmentPlan { deactivate, action }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentOutcome {
    Creada,
    Reactivada,
    SinCambios,
}

impl From<EnrollmentAction> for EnrollmentOutcome {
    fn from(action: EnrollmentAction) -> Self {
        match action {
            EnrollmentAction::KeepActive(_) => EnrollmentOutcome::SinCambios,
            EnrollmentAction::Reactivate(_) => EnrollmentOutcome::Reactivada,
            EnrollmentAction::Create => EnrollmentOutcome::Creada,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MatriculaMasivaPayload {
    #[validate(length(min = 1, message = "Debe indicar al menos un estudiante"))]
    pub estudiante_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatriculaMasivaResultado {
    pub estudiante_id: Uuid,
    pub resultado: Option<EnrollmentOutcome>,
    pub error: Option<String>,
}

// Horas agregadas de uma matrícula. Nada disso é armazenado: sai sempre de SUM().
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgresoMatricula {
    pub matriculacion_id: Uuid,
    pub estudiante_id: Uuid,
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    pub activa: bool,
    pub total_registros: i64,
    pub horas_acumuladas: Decimal,
    pub horas_aprobadas: Decimal,
    #[sqlx(skip)]
    pub porcentaje_completado: f64,
}

impl ProgresoMatricula {
    pub fn with_percentage(mut self, horas_requeridas: i32) -> Self {
        self.porcentaje_completado = completion_percentage(self.horas_acumuladas, horas_requeridas);
        self
    }
}

// Percentual arredondado a 2 casas e limitado a 100 na apresentação.
pub fn completion_percentage(horas: Decimal, horas_requeridas: i32) -> f64 {
    if horas_requeridas <= 0 {
        return 0.0;
    }
    let ratio = horas * Decimal::from(100) / Decimal::from(horas_requeridas);
    ratio
        .min(Decimal::from(100))
        .round_dp(2)
        .to_f64()
        .unwrap_or(0.0)
}

// Horas que faltam, nunca negativas.
pub fn missing_hours(horas: Decimal, horas_requeridas: i32) -> Decimal {
    (Decimal::from(horas_requeridas) - horas).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal válido")
    }

    fn matricula(periodo_id: Uuid, activa: bool) -> Matriculacion {
        Matriculacion {
            id: Uuid::new_v4(),
            estudiante_id: Uuid::nil(),
            periodo_id,
            fecha_matricula: Utc::now(),
            activa,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn first_assignment_creates_enrollment() {
        let plan = plan_enrollment(&[], Uuid::new_v4());

        assert!(plan.deactivate.is_empty());
        assert_eq!(plan.action, EnrollmentAction::Create);
    }

    #[test]
    fn changing_period_deactivates_previous_and_creates_new() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let anterior = matricula(p1, true);

        let plan = plan_enrollment(std::slice::from_ref(&anterior), p2);

        assert_eq!(plan.deactivate, vec![anterior.id]);
        assert_eq!(plan.action, EnrollmentAction::Create);
    }

    #[test]
    fn returning_to_old_period_reactivates_it() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let antiga = matricula(p1, false);
        let atual = matricula(p2, true);

        let plan = plan_enrollment(&[antiga.clone(), atual.clone()], p1);

        assert_eq!(plan.deactivate, vec![atual.id]);
        assert_eq!(plan.action, EnrollmentAction::Reactivate(antiga.id));
    }

    #[test]
    fn same_period_is_a_no_op() {
        let p1 = Uuid::new_v4();
        let atual = matricula(p1, true);

        let plan = plan_enrollment(std::slice::from_ref(&atual), p1);

        assert!(plan.deactivate.is_empty());
        assert_eq!(plan.action, EnrollmentAction::KeepActive(atual.id));
        assert_eq!(EnrollmentOutcome::from(plan.action), EnrollmentOutcome::SinCambios);
    }

    #[test]
    fn percentage_is_capped_and_rounded() {
        assert!((completion_percentage(dec("80"), 240) - 33.33).abs() < 1e-9);
        assert_eq!(completion_percentage(dec("300"), 240), 100.0);
        assert_eq!(completion_percentage(dec("10"), 0), 0.0);
    }

    #[test]
    fn missing_hours_never_go_negative() {
        assert_eq!(missing_hours(dec("100.5"), 240), dec("139.5"));
        assert_eq!(missing_hours(dec("250"), 240), Decimal::ZERO);
    }
}
