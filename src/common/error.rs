use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Tipo de erro único da aplicação. Toda falha vira o envelope
// { "success": false, "error": "..." } com o status correspondente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    // Conflitos de unicidade respondem 400, como o restante das validações.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token de acceso requerido")]
    MissingToken,

    #[error("Token inválido o expirado")]
    InvalidToken,

    #[error("La sesión fue cerrada o expiró")]
    SessionClosed,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Usuario inactivo")]
    AccountDisabled,

    #[error("Base de datos no disponible")]
    DatabaseUnavailable,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Violações de constraint viram erros de domínio pelo nome da constraint;
// o resto segue como erro de banco (500).
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        classify_constraint(&e).unwrap_or(AppError::DatabaseError(e))
    }
}

fn classify_constraint(e: &sqlx::Error) -> Option<AppError> {
    let sqlx::Error::Database(db_err) = e else {
        return None;
    };
    let constraint = db_err.constraint()?;

    if db_err.is_unique_violation() {
        let message = match constraint {
            "administradores_email_key" | "estudiantes_email_key" => "El email ya está registrado",
            "universidades_nombre_key" => "Ya existe una universidad con ese nombre",
            "registros_horas_estudiante_fecha_key" => "Ya existe un registro para esta fecha",
            "matriculaciones_una_activa_idx" => "El estudiante ya tiene una matrícula activa",
            "matriculaciones_estudiante_periodo_key" => {
                "El estudiante ya está matriculado en este periodo"
            }
            "tipos_actividad_nombre_key" => "Ya existe un tipo de actividad con ese nombre",
            _ => "El registro ya existe",
        };
        return Some(AppError::Conflict(message.to_string()));
    }

    if db_err.is_foreign_key_violation() {
        let message = match constraint {
            "periodos_universidad_id_fkey" | "estudiantes_universidad_id_fkey" => {
                "Universidad no encontrada"
            }
            "estudiantes_periodo_id_fkey" | "matriculaciones_periodo_id_fkey" => {
                "Periodo no encontrado"
            }
            "registros_horas_tipo_actividad_id_fkey" => "Tipo de actividad no encontrado",
            _ => return None,
        };
        return Some(AppError::NotFound(message.to_string()));
    }

    None
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::SessionClosed
            | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken | AppError::AccountDisabled | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(message: &str) -> Self {
        AppError::NotFound(message.to_string())
    }

    pub fn bad_request(message: &str) -> Self {
        AppError::BadRequest(message.to_string())
    }

    // Num DELETE, violação de FK significa que ainda há linhas dependentes,
    // não que o registro falte.
    pub fn from_delete(e: sqlx::Error, has_dependents: &str) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(has_dependents.to_string())
            }
            _ => e.into(),
        }
    }

    // Mensagem que pode ir para o cliente; erros 500 nunca expõem a causa.
    pub fn client_message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "Error interno del servidor".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "success": false,
                    "error": "Uno o más campos son inválidos",
                    "details": details,
                })
            }
            // Nunca vazamos detalhes internos: loga e devolve mensagem genérica.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "success": false, "error": "Error interno del servidor" })
            }
            e => json!({ "success": false, "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error as StdError, fmt};

    use axum::body::to_bytes;
    use sqlx::error::{DatabaseError, ErrorKind};
    use testresult::{TestError, TestResult};
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 2, message = "Muy corto"))]
        nombre: String,
    }

    async fn body_of(err: AppError) -> Result<(StatusCode, serde_json::Value), TestError> {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    #[tokio::test]
    async fn validation_errors_carry_field_details() -> TestResult {
        let errors = Payload { nombre: "a".into() }
            .validate()
            .err()
            .ok_or("esperava erro de validação")?;

        let (status, body) = body_of(AppError::from(errors)).await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["details"]["nombre"][0], "Muy corto");
        Ok(())
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() -> TestResult {
        let (status, body) =
            body_of(AppError::InternalServerError(anyhow::anyhow!("pool exhausted"))).await?;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error interno del servidor");
        Ok(())
    }

    #[test]
    fn auth_failures_split_between_401_and_403() {
        assert_eq!(AppError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UserNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AccountDisabled.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn conflicts_render_as_bad_request_with_message() -> TestResult {
        let (status, body) =
            body_of(AppError::Conflict("Ya existe un registro para esta fecha".into())).await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Ya existe un registro para esta fecha");
        Ok(())
    }

    #[derive(Debug)]
    struct ConstraintViolation {
        unique: bool,
        constraint: &'static str,
    }

    impl fmt::Display for ConstraintViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "violates constraint \"{}\"", self.constraint)
        }
    }

    impl StdError for ConstraintViolation {}

    impl DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            self.constraint
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::ForeignKeyViolation
            }
        }
    }

    fn unique(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintViolation { unique: true, constraint }))
    }

    fn foreign_key(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintViolation { unique: false, constraint }))
    }

    #[tokio::test]
    async fn second_log_on_the_same_date_is_a_bad_request() -> TestResult {
        let (status, body) = body_of(unique("registros_horas_estudiante_fecha_key").into()).await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Ya existe un registro para esta fecha");
        Ok(())
    }

    #[test]
    fn second_active_enrollment_is_a_conflict() {
        let err = AppError::from(unique("matriculaciones_una_activa_idx"));

        assert!(matches!(&err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "El estudiante ya tiene una matrícula activa");
    }

    #[test]
    fn missing_parent_on_insert_is_not_found() {
        let err = AppError::from(foreign_key("periodos_universidad_id_fkey"));

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Universidad no encontrada");
    }

    #[test]
    fn unknown_foreign_key_stays_a_database_error() {
        let err = AppError::from(foreign_key("algo_desconhecido_fkey"));

        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn delete_blocked_by_dependents_is_a_bad_request() {
        let err = AppError::from_delete(
            foreign_key("estudiantes_periodo_id_fkey"),
            "El periodo tiene dependientes",
        );

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "El periodo tiene dependientes");
    }

    #[test]
    fn delete_keeps_other_database_errors() {
        let err = AppError::from_delete(sqlx::Error::RowNotFound, "El periodo tiene dependientes");

        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn unavailable_database_is_503() {
        assert_eq!(
            AppError::DatabaseUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
