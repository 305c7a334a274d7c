// src/models/auth.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Os dois papéis do sistema. Fechado: não existe "tipo" fora destes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrador,
    Estudiante,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrador => "administrador",
            Role::Estudiante => "estudiante",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrador" => Ok(Role::Administrador),
            "estudiante" => Ok(Role::Estudiante),
            other => Err(format!("tipo de usuario desconocido: {other}")),
        }
    }
}

// Claims dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub nombres: String,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

// Linha devolvida pela busca de credenciais nas duas tabelas de usuários
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRow {
    pub id: Uuid,
    pub rol: String,
    pub password_hash: String,
    pub activo: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Administrador {
    pub id: Uuid,
    pub nombres: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    pub super_admin: bool,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminContext {
    pub id: Uuid,
    pub nombres: String,
    pub email: String,
    pub super_admin: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentContext {
    pub id: Uuid,
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    pub universidad_id: Option<Uuid>,
    pub periodo_id: Option<Uuid>,
}

// Usuário autenticado, normalizado pelo middleware e anexado à requisição.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum AuthUser {
    Administrador(AdminContext),
    Estudiante(StudentContext),
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        match self {
            AuthUser::Administrador(admin) => admin.id,
            AuthUser::Estudiante(student) => student.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            AuthUser::Administrador(_) => Role::Administrador,
            AuthUser::Estudiante(_) => Role::Estudiante,
        }
    }

    pub fn nombres(&self) -> &str {
        match self {
            AuthUser::Administrador(admin) => &admin.nombres,
            AuthUser::Estudiante(student) => &student.nombres,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            AuthUser::Administrador(admin) => &admin.email,
            AuthUser::Estudiante(student) => &student.email,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Sesion {
    pub usuario_id: Uuid,
    pub activa: bool,
    pub expira_en: DateTime<Utc>,
}

// Origem da requisição, gravada junto da sessão
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "El email no es válido"))]
    #[schema(example = "admin@universidad.edu")]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminPayload {
    #[validate(length(min = 2, max = 100, message = "Los nombres deben tener entre 2 y 100 caracteres"))]
    pub nombres: String,
    #[validate(email(message = "El email no es válido"))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    #[serde(default)]
    pub super_admin: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterStudentPayload {
    #[validate(length(min = 2, max = 100, message = "Los nombres deben tener entre 2 y 100 caracteres"))]
    pub nombres: String,
    #[validate(length(min = 2, max = 100, message = "Los apellidos deben tener entre 2 y 100 caracteres"))]
    pub apellidos: String,
    #[validate(email(message = "El email no es válido"))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "La contraseña actual es requerida"))]
    pub password_actual: String,
    #[validate(length(min = 6, message = "La nueva contraseña debe tener al menos 6 caracteres"))]
    pub nueva_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub usuario: AuthUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_wire_name() {
        assert_eq!("administrador".parse::<Role>(), Ok(Role::Administrador));
        assert_eq!("estudiante".parse::<Role>(), Ok(Role::Estudiante));
        assert!("docente".parse::<Role>().is_err());
    }

    #[test]
    fn auth_user_serializes_with_tipo_tag() {
        let user = AuthUser::Estudiante(StudentContext {
            id: Uuid::nil(),
            nombres: "Ana".into(),
            apellidos: "Pérez".into(),
            email: "ana@uni.edu".into(),
            universidad_id: None,
            periodo_id: None,
        });

        let json = serde_json::to_value(&user).expect("serializa");

        assert_eq!(json["tipo"], "estudiante");
        assert_eq!(json["apellidos"], "Pérez");
    }

    #[test]
    fn admin_payload_defaults_to_regular_admin() {
        let payload: CreateAdminPayload = serde_json::from_str(
            r#"{"nombres":"Carla","email":"carla@uni.edu","password":"secreta"}"#,
        )
        .expect("desserializa");

        assert!(!payload.super_admin);
        assert!(payload.validate().is_ok());
    }
}
