// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    common::{
        cache::{CacheScope, ResponseCache},
        error::AppError,
    },
    config::AppConfig,
    db::{
        session_repo::NewSession, student_repo::NewStudent, AdminRepository, Database,
        SessionRepository, StudentRepository, UserRepository,
    },
    models::auth::{
        AdminContext, Administrador, AuthResponse, AuthUser, ChangePasswordPayload, Claims,
        ClientInfo, CreateAdminPayload, LoginPayload, RegisterStudentPayload, Role,
        StudentContext,
    },
};

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    user_repo: UserRepository,
    admin_repo: AdminRepository,
    student_repo: StudentRepository,
    session_repo: SessionRepository,
    cache: Arc<dyn ResponseCache>,
    config: Arc<AppConfig>,
}

// bcrypt é caro: roda fora do executor assíncrono.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

// Só o hash do token vai para o banco.
pub fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

impl AuthService {
    pub fn new(
        db: Database,
        user_repo: UserRepository,
        admin_repo: AdminRepository,
        student_repo: StudentRepository,
        session_repo: SessionRepository,
        cache: Arc<dyn ResponseCache>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            user_repo,
            admin_repo,
            student_repo,
            session_repo,
            cache,
            config,
        }
    }

    pub async fn login(&self, payload: &LoginPayload, client: &ClientInfo) -> Result<AuthResponse, AppError> {
        let account = self
            .user_repo
            .find_credentials(payload.email.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&payload.password, &account.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }
        if !account.activo {
            return Err(AppError::AccountDisabled);
        }

        let role: Role = account.rol.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        let user = self.load_user(role, account.id).await?;
        let token = self.open_session(&user, client).await?;

        self.cache.invalidate(CacheScope::User(user.id()));
        tracing::info!(usuario = %user.id(), rol = %role, "Login realizado");

        Ok(AuthResponse {
            success: true,
            message: "Login exitoso".to_string(),
            token,
            usuario: user,
        })
    }

    // Só funciona enquanto não existe nenhum administrador.
    pub async fn first_admin(
        &self,
        payload: &CreateAdminPayload,
        client: &ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let password_hash = hash_password(&payload.password, self.config.bcrypt_cost).await?;

        let pool = self.db.pool()?;
        let mut tx = pool.begin().await?;

        if self.admin_repo.count(&mut *tx).await? > 0 {
            return Err(AppError::Forbidden(
                "Ya existe un administrador registrado".to_string(),
            ));
        }

        let admin = self
            .admin_repo
            .create(&mut *tx, payload.nombres.trim(), payload.email.trim(), &password_hash, true)
            .await?;

        tx.commit().await?;
        tracing::info!(admin = %admin.id, "Primeiro administrador criado");

        let user = AuthUser::Administrador(admin_context(&admin));
        let token = self.open_session(&user, client).await?;

        Ok(AuthResponse {
            success: true,
            message: "Administrador creado exitosamente".to_string(),
            token,
            usuario: user,
        })
    }

    pub async fn register_student(
        &self,
        payload: &RegisterStudentPayload,
        client: &ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let password_hash = hash_password(&payload.password, self.config.bcrypt_cost).await?;

        let pool = self.db.pool()?;
        let mut tx = pool.begin().await?;

        if self.user_repo.email_in_use(&mut *tx, &payload.email, None).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        let estudiante = self
            .student_repo
            .create(
                &mut *tx,
                NewStudent {
                    nombres: &payload.nombres,
                    apellidos: &payload.apellidos,
                    email: &payload.email,
                    password_hash: &password_hash,
                    universidad_id: None,
                    periodo_id: None,
                },
            )
            .await?;

        tx.commit().await?;

        let user = AuthUser::Estudiante(StudentContext {
            id: estudiante.id,
            nombres: estudiante.nombres,
            apellidos: estudiante.apellidos,
            email: estudiante.email,
            universidad_id: estudiante.universidad_id,
            periodo_id: estudiante.periodo_id,
        });
        let token = self.open_session(&user, client).await?;

        Ok(AuthResponse {
            success: true,
            message: "Estudiante registrado exitosamente".to_string(),
            token,
            usuario: user,
        })
    }

    pub async fn create_admin(
        &self,
        requester: &AdminContext,
        payload: &CreateAdminPayload,
    ) -> Result<Administrador, AppError> {
        if payload.super_admin && !requester.super_admin {
            return Err(AppError::Forbidden(
                "Solo un super administrador puede crear super administradores".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.password, self.config.bcrypt_cost).await?;

        let pool = self.db.pool()?;
        let mut tx = pool.begin().await?;

        if self.user_repo.email_in_use(&mut *tx, &payload.email, None).await? {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        let admin = self
            .admin_repo
            .create(
                &mut *tx,
                payload.nombres.trim(),
                payload.email.trim(),
                &password_hash,
                payload.super_admin,
            )
            .await?;

        tx.commit().await?;
        tracing::info!(admin = %admin.id, criado_por = %requester.id, "Administrador criado");

        Ok(admin)
    }

    pub async fn logout(&self, user: &AuthUser, token: &str) -> Result<(), AppError> {
        self.session_repo.close(&token_fingerprint(token)).await?;
        self.cache.invalidate(CacheScope::User(user.id()));
        Ok(())
    }

    // Token -> sessão ativa -> usuário ainda existente e ativo.
    pub async fn validate_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let claims = self.decode_claims(token)?;

        let session = self
            .session_repo
            .find_by_hash(&token_fingerprint(token))
            .await?
            .ok_or(AppError::SessionClosed)?;

        if !session.activa || session.expira_en <= Utc::now() || session.usuario_id != claims.sub {
            return Err(AppError::SessionClosed);
        }

        self.load_user(claims.role, claims.sub).await
    }

    pub async fn change_password(
        &self,
        user: &AuthUser,
        payload: &ChangePasswordPayload,
    ) -> Result<(), AppError> {
        let current_hash = match user {
            AuthUser::Administrador(admin) => self
                .admin_repo
                .find_by_id(admin.id)
                .await?
                .map(|a| a.password_hash),
            AuthUser::Estudiante(student) => self
                .student_repo
                .find_by_id(student.id)
                .await?
                .map(|e| e.password_hash),
        }
        .ok_or(AppError::UserNotFound)?;

        if !verify_password(&payload.password_actual, &current_hash).await? {
            return Err(AppError::bad_request("La contraseña actual es incorrecta"));
        }

        let new_hash = hash_password(&payload.nueva_password, self.config.bcrypt_cost).await?;
        match user {
            AuthUser::Administrador(admin) => {
                self.admin_repo.update_password(admin.id, &new_hash).await?;
            }
            AuthUser::Estudiante(student) => {
                self.student_repo.update_password(student.id, &new_hash).await?;
            }
        }

        tracing::info!(usuario = %user.id(), "Senha alterada");
        Ok(())
    }

    async fn load_user(&self, role: Role, id: Uuid) -> Result<AuthUser, AppError> {
        match role {
            Role::Administrador => {
                let admin = self
                    .admin_repo
                    .find_by_id(id)
                    .await?
                    .ok_or(AppError::UserNotFound)?;
                if !admin.activo {
                    return Err(AppError::AccountDisabled);
                }
                Ok(AuthUser::Administrador(admin_context(&admin)))
            }
            Role::Estudiante => {
                let estudiante = self
                    .student_repo
                    .find_by_id(id)
                    .await?
                    .ok_or(AppError::UserNotFound)?;
                if !estudiante.activo {
                    return Err(AppError::AccountDisabled);
                }
                Ok(AuthUser::Estudiante(StudentContext {
                    id: estudiante.id,
                    nombres: estudiante.nombres,
                    apellidos: estudiante.apellidos,
                    email: estudiante.email,
                    universidad_id: estudiante.universidad_id,
                    periodo_id: estudiante.periodo_id,
                }))
            }
        }
    }

    async fn open_session(&self, user: &AuthUser, client: &ClientInfo) -> Result<String, AppError> {
        let (token, expires_at) = self.create_token(user)?;

        self.session_repo
            .create(NewSession {
                usuario_id: user.id(),
                role: user.role(),
                token_hash: &token_fingerprint(&token),
                expira_en: expires_at,
                ip_address: client.ip_address.as_deref(),
                user_agent: client.user_agent.as_deref(),
            })
            .await?;

        Ok(token)
    }

    fn create_token(&self, user: &AuthUser) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.config.jwt_ttl;

        let claims = Claims {
            sub: user.id(),
            role: user.role(),
            nombres: user.nombres().to_string(),
            email: user.email().to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;
        Ok((token, expires_at))
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }
}

fn admin_context(admin: &Administrador) -> AdminContext {
    AdminContext {
        id: admin.id,
        nombres: admin.nombres.clone(),
        email: admin.email.clone(),
        super_admin: admin.super_admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::cache::NoopResponseCache;

    fn service(config: AppConfig) -> AuthService {
        let db = Database::disconnected("teste");
        AuthService::new(
            db.clone(),
            UserRepository::new(db.clone()),
            AdminRepository::new(db.clone()),
            StudentRepository::new(db.clone()),
            SessionRepository::new(db),
            Arc::new(NoopResponseCache),
            Arc::new(config),
        )
    }

    fn admin() -> AuthUser {
        AuthUser::Administrador(AdminContext {
            id: Uuid::new_v4(),
            nombres: "Carla".into(),
            email: "carla@uni.edu".into(),
            super_admin: false,
        })
    }

    #[test]
    fn issued_token_carries_role_and_identity() -> Result<(), AppError> {
        let auth = service(AppConfig::for_tests());
        let user = admin();

        let (token, expires_at) = auth.create_token(&user)?;
        let claims = auth.decode_claims(&token)?;

        assert_eq!(claims.sub, user.id());
        assert_eq!(claims.role, Role::Administrador);
        assert_eq!(claims.email, "carla@uni.edu");
        assert_eq!(claims.exp, expires_at.timestamp() as usize);
        Ok(())
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() -> Result<(), AppError> {
        let other = service(AppConfig {
            jwt_secret: "outro-segredo".into(),
            ..AppConfig::for_tests()
        });
        let (token, _) = other.create_token(&admin())?;

        let auth = service(AppConfig::for_tests());

        assert!(matches!(auth.decode_claims(&token), Err(AppError::InvalidToken)));
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> Result<(), AppError> {
        let auth = service(AppConfig {
            jwt_ttl: chrono::TimeDelta::hours(-2),
            ..AppConfig::for_tests()
        });
        let (token, _) = auth.create_token(&admin())?;

        assert!(matches!(auth.decode_claims(&token), Err(AppError::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn garbage_token_fails_before_touching_the_database() {
        let auth = service(AppConfig::for_tests());

        let result = auth.validate_token("nao-e-um-jwt").await;

        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn valid_token_needs_the_session_store() -> Result<(), AppError> {
        let auth = service(AppConfig::for_tests());
        let (token, _) = auth.create_token(&admin())?;

        let result = auth.validate_token(&token).await;

        assert!(matches!(result, Err(AppError::DatabaseUnavailable)));
        Ok(())
    }

    #[test]
    fn fingerprint_is_a_stable_sha256_hex() {
        let a = token_fingerprint("abc");

        assert_eq!(a.len(), 64);
        assert_eq!(a, token_fingerprint("abc"));
        assert_ne!(a, token_fingerprint("abd"));
        assert_eq!(
            a,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn password_hash_round_trip() -> Result<(), AppError> {
        let hashed = hash_password("secreta", 4).await?;

        assert!(verify_password("secreta", &hashed).await?);
        assert!(!verify_password("errada", &hashed).await?);
        Ok(())
    }

    #[tokio::test]
    async fn regular_admin_cannot_grant_super_admin() {
        let auth = service(AppConfig::for_tests());
        let requester = AdminContext {
            id: Uuid::new_v4(),
            nombres: "Carla".into(),
            email: "carla@uni.edu".into(),
            super_admin: false,
        };
        let payload = CreateAdminPayload {
            nombres: "Novo".into(),
            email: "novo@uni.edu".into(),
            password: "secreta".into(),
            super_admin: true,
        };

        let result = auth.create_admin(&requester, &payload).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
