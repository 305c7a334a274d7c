// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::TimeDelta;

use crate::{
    common::cache::{InMemoryResponseCache, ResponseCache},
    db::{
        ActivityRepository, AdminRepository, AuditRepository, Database, DashboardRepository,
        EnrollmentRepository, HourLogRepository, LeadRepository, PeriodRepository,
        SessionRepository, StudentRepository, UniversityRepository, UserRepository,
    },
    services::{
        auth::AuthService, enrollment_service::EnrollmentService,
        hour_log_service::HourLogService, lead_service::LeadService,
        period_service::PeriodService, student_service::StudentService,
    },
};

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

// Configuração lida do ambiente na inicialização.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Sem DATABASE_URL a aplicação sobe em modo degradado (banco desconectado).
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl: TimeDelta,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub db_max_connections: u32,
    pub min_description_length: usize,
    pub lead_display_offset_hours: i32,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let jwt_ttl = match env::var("JWT_EXPIRES_IN") {
            Ok(raw) => parse_duration(&raw)?,
            Err(_) => TimeDelta::hours(24),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret,
            jwt_ttl,
            bcrypt_cost: parse_or("BCRYPT_ROUNDS", bcrypt::DEFAULT_COST)?.clamp(4, 31),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string()),
            ),
            port: parse_or("PORT", 3000)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            min_description_length: parse_or("MIN_DESCRIPTION_LENGTH", 10)?,
            lead_display_offset_hours: parse_or("LEAD_DISPLAY_UTC_OFFSET_HOURS", -5)?,
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt_secret: "segredo-de-teste".to_string(),
            jwt_ttl: TimeDelta::hours(1),
            bcrypt_cost: 4,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            port: 0,
            db_max_connections: 1,
            min_description_length: 10,
            lead_display_offset_hours: -5,
            environment: "test".to_string(),
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} possui um valor inválido: {raw}")),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

// Aceita o formato do JWT_EXPIRES_IN: "3600", "45m", "24h", "7d".
pub fn parse_duration(raw: &str) -> anyhow::Result<TimeDelta> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (amount, unit) = raw.split_at(split);

    let amount: i64 = amount
        .parse()
        .with_context(|| format!("JWT_EXPIRES_IN inválido: {raw}"))?;

    let delta = match unit {
        "" | "s" => TimeDelta::try_seconds(amount),
        "m" => TimeDelta::try_minutes(amount),
        "h" => TimeDelta::try_hours(amount),
        "d" => TimeDelta::try_days(amount),
        other => anyhow::bail!("Unidade de JWT_EXPIRES_IN desconhecida: {other}"),
    };

    delta
        .filter(|d| *d > TimeDelta::zero())
        .with_context(|| format!("JWT_EXPIRES_IN fora do intervalo: {raw}"))
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub cache: Arc<dyn ResponseCache>,

    // --- Repositórios ---
    pub university_repo: UniversityRepository,
    pub period_repo: PeriodRepository,
    pub student_repo: StudentRepository,
    pub hour_log_repo: HourLogRepository,
    pub activity_repo: ActivityRepository,
    pub audit_repo: AuditRepository,
    pub dashboard_repo: DashboardRepository,

    // --- Serviços ---
    pub auth_service: AuthService,
    pub enrollment_service: EnrollmentService,
    pub student_service: StudentService,
    pub hour_log_service: HourLogService,
    pub period_service: PeriodService,
    pub lead_service: LeadService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let db = match &config.database_url {
            Some(url) => {
                let db = Database::connecting();
                db.spawn_supervisor(url.clone(), config.db_max_connections, Duration::from_secs(30));
                db
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL não definida: rodando sem banco de dados.");
                Database::disconnected("DATABASE_URL não configurada")
            }
        };

        Ok(Self::build(config, db, Arc::new(InMemoryResponseCache::new())))
    }

    // Monta o gráfico de dependências a partir das peças já prontas.
    pub fn build(config: AppConfig, db: Database, cache: Arc<dyn ResponseCache>) -> Self {
        let config = Arc::new(config);

        let university_repo = UniversityRepository::new(db.clone());
        let period_repo = PeriodRepository::new(db.clone());
        let student_repo = StudentRepository::new(db.clone());
        let admin_repo = AdminRepository::new(db.clone());
        let user_repo = UserRepository::new(db.clone());
        let session_repo = SessionRepository::new(db.clone());
        let enrollment_repo = EnrollmentRepository::new(db.clone());
        let hour_log_repo = HourLogRepository::new(db.clone());
        let activity_repo = ActivityRepository::new(db.clone());
        let lead_repo = LeadRepository::new(db.clone());
        let audit_repo = AuditRepository::new(db.clone());
        let dashboard_repo = DashboardRepository::new(db.clone());

        let auth_service = AuthService::new(
            db.clone(),
            user_repo.clone(),
            admin_repo,
            student_repo.clone(),
            session_repo,
            cache.clone(),
            config.clone(),
        );
        let enrollment_service = EnrollmentService::new(db.clone(), enrollment_repo.clone());
        let student_service = StudentService::new(
            db.clone(),
            student_repo.clone(),
            user_repo,
            period_repo.clone(),
            enrollment_service.clone(),
            hour_log_repo.clone(),
            config.clone(),
        );
        let hour_log_service = HourLogService::new(
            hour_log_repo.clone(),
            enrollment_repo,
            activity_repo.clone(),
            config.clone(),
        );
        let period_service = PeriodService::new(
            period_repo.clone(),
            university_repo.clone(),
            cache.clone(),
        );
        let lead_service = LeadService::new(lead_repo, config.clone());

        Self {
            config,
            db,
            cache,
            university_repo,
            period_repo,
            student_repo,
            hour_log_repo,
            activity_repo,
            audit_repo,
            dashboard_repo,
            auth_service,
            enrollment_service,
            student_service,
            hour_log_service,
            period_service,
            lead_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jwt_expiry_units() {
        assert_eq!(parse_duration("24h").ok(), Some(TimeDelta::hours(24)));
        assert_eq!(parse_duration("7d").ok(), Some(TimeDelta::days(7)));
        assert_eq!(parse_duration("45m").ok(), Some(TimeDelta::minutes(45)));
        assert_eq!(parse_duration("3600").ok(), Some(TimeDelta::seconds(3600)));
    }

    #[test]
    fn rejects_malformed_expiry() {
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("12w").is_err());
        assert!(parse_duration("0h").is_err());
    }

    #[test]
    fn splits_cors_origins() {
        assert_eq!(
            parse_origins("http://localhost:4200, https://practicas.example.com ,"),
            vec![
                "http://localhost:4200".to_string(),
                "https://practicas.example.com".to_string()
            ]
        );
    }
}
