// src/models/dashboard.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::hour_log::RegistroHora;

// 1. Cards do painel do administrador
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub total_universidades: i64,
    pub universidades_activas: i64,
    pub total_estudiantes: i64,
    pub estudiantes_activos: i64,
    pub total_periodos: i64,
    pub periodos_activos: i64,
    pub matriculas_activas: i64,
    pub total_horas: Decimal,
}

// 2. Painel do estudante (matrícula ativa)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub total_registros: i64,
    pub total_horas: Decimal,
    pub horas_requeridas: i32,
    pub horas_faltantes: Decimal,
    pub porcentaje: f64,
    pub ultimos_registros: Vec<RegistroHora>,
}

// 3. Estatísticas de horas por mês
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourStatistics {
    pub total_registros: i64,
    pub total_horas: Decimal,
    pub horas_por_mes: BTreeMap<String, Decimal>,
    pub ultimos_registros: Vec<RegistroHora>,
}
