// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Auditoria {
    pub id: Uuid,
    pub usuario_id: Option<Uuid>,
    pub usuario_tipo: Option<String>,
    pub accion: String,
    pub tabla_afectada: Option<String>,
    pub registro_id: Option<Uuid>,
    pub detalles: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAuditEntry {
    pub usuario_id: Option<Uuid>,
    pub usuario_tipo: Option<String>,
    pub accion: String,
    pub tabla_afectada: Option<String>,
    pub registro_id: Option<Uuid>,
    pub detalles: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub usuario_tipo: Option<String>,
    pub accion: Option<String>,
}

impl AuditQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ManualAuditPayload {
    #[validate(length(min = 1, max = 50, message = "La acción es requerida"))]
    pub accion: String,
    pub tabla_afectada: Option<String>,
    pub registro_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub detalles: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let query = AuditQuery::default();
        assert_eq!((query.page(), query.limit(), query.offset()), (1, 20, 0));

        let query = AuditQuery {
            page: Some(3),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!((query.page(), query.limit(), query.offset()), (3, 100, 200));
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(Pagination::new(41, 1, 20).pages, 3);
        assert_eq!(Pagination::new(0, 1, 20).pages, 0);
    }
}
