// src/jobs/period_sweeper.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone};
#[cfg(test)]
use mockall::automock;
use tokio::task::JoinHandle;

use crate::{
    common::{
        cache::{CacheScope, ResponseCache},
        error::AppError,
    },
    db::PeriodRepository,
};

// Horário local da varredura diária (00:01).
fn run_at() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 1, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PeriodExpirer: Send + Sync {
    // Desativa os períodos com fecha_fin < today; devolve quantos mudaram.
    async fn expire_periods(&self, today: NaiveDate) -> Result<u64, AppError>;
}

#[async_trait]
impl PeriodExpirer for PeriodRepository {
    async fn expire_periods(&self, today: NaiveDate) -> Result<u64, AppError> {
        self.deactivate_expired(today).await
    }
}

// Uma passada: se algum período mudou, o cache inteiro cai
// (os painéis agregam dados derivados dos períodos).
pub async fn sweep_once(
    expirer: &dyn PeriodExpirer,
    cache: &dyn ResponseCache,
    today: NaiveDate,
) -> Result<u64, AppError> {
    let affected = expirer.expire_periods(today).await?;

    if affected > 0 {
        cache.invalidate(CacheScope::All);
        tracing::info!("📅 {} período(s) vencido(s) desativado(s)", affected);
    } else {
        tracing::debug!("Nenhum período vencido em {}", today);
    }

    Ok(affected)
}

pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let time = run_at();
    let at = |day: NaiveDate| day.and_time(time).and_local_timezone(tz.clone()).earliest();
    let today = now.date_naive();

    at(today)
        .filter(|candidate| candidate > now)
        .or_else(|| today.succ_opt().and_then(|day| at(day)))
        .unwrap_or_else(|| now.clone() + TimeDelta::days(1))
}

// Sem retry dentro do mesmo dia: uma falha só é logada e a próxima execução é no dia seguinte.
pub fn spawn<E>(expirer: E, cache: Arc<dyn ResponseCache>) -> JoinHandle<()>
where
    E: PeriodExpirer + 'static,
{
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let next = next_run_after(&now);
            let wait = (next - now).to_std().unwrap_or(Duration::from_secs(60));

            tracing::info!("⏰ Próxima verificação de períodos vencidos: {}", next);
            tokio::time::sleep(wait).await;

            let today = Local::now().date_naive();
            if let Err(e) = sweep_once(&expirer, cache.as_ref(), today).await {
                tracing::error!("❌ Falha ao desativar períodos vencidos: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::cache::{CacheKey, InMemoryResponseCache};
    use axum::body::Bytes;
    use chrono::{FixedOffset, Timelike, Utc};
    use mockall::predicate::eq;
    use testresult::TestResult;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("data válida")
    }

    fn warm_cache() -> InMemoryResponseCache {
        let cache = InMemoryResponseCache::new();
        cache.put(
            CacheKey::new("/api/v1/admin/dashboard", None),
            Bytes::from_static(b"{}"),
            Duration::from_secs(60),
        );
        cache
    }

    #[tokio::test]
    async fn expiring_periods_clears_the_whole_cache() -> TestResult {
        let today = date(2025, 8, 1);
        let mut expirer = MockPeriodExpirer::new();
        expirer
            .expect_expire_periods()
            .with(eq(today))
            .times(1)
            .returning(|_| Ok(2));
        let cache = warm_cache();

        let affected = sweep_once(&expirer, &cache, today).await?;

        assert_eq!(affected, 2);
        assert_eq!(cache.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn quiet_sweep_keeps_cached_responses() -> TestResult {
        let mut expirer = MockPeriodExpirer::new();
        expirer.expect_expire_periods().times(1).returning(|_| Ok(0));
        let cache = warm_cache();

        let affected = sweep_once(&expirer, &cache, date(2025, 8, 1)).await?;

        assert_eq!(affected, 0);
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_sweep_reports_error_and_keeps_cache() {
        let mut expirer = MockPeriodExpirer::new();
        expirer
            .expect_expire_periods()
            .times(1)
            .returning(|_| Err(AppError::DatabaseUnavailable));
        let cache = warm_cache();

        let result = sweep_once(&expirer, &cache, date(2025, 8, 1)).await;

        assert!(matches!(result, Err(AppError::DatabaseUnavailable)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn next_run_is_later_today_before_one_past_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 30).unwrap();

        assert_eq!(next_run_after(&now), Utc.with_ymd_and_hms(2025, 8, 1, 0, 1, 0).unwrap());
    }

    #[test]
    fn next_run_rolls_over_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 0, 1, 0).unwrap();

        assert_eq!(next_run_after(&now), Utc.with_ymd_and_hms(2025, 8, 2, 0, 1, 0).unwrap());
    }

    #[test]
    fn next_run_respects_the_local_offset() {
        let quito = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = quito.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap();

        let next = next_run_after(&now);

        assert_eq!(next, quito.with_ymd_and_hms(2026, 1, 1, 0, 1, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc).hour(), 5);
    }
}
