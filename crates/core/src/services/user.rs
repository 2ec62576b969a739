//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use renthub_common::{AppError, AppResult, Config, IdGenerator, auth};
use renthub_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 20))]
    pub phone: String,
}

/// Input for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// A successful login: the user and a fresh access token.
#[derive(Debug)]
pub struct LoginOutput {
    pub user: user::Model,
    pub token: String,
}

/// User service for registration and authentication.
#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    id_gen: IdGenerator,
    jwt_secret: String,
    token_expire_secs: i64,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(repo: UserRepository, config: &Config) -> Self {
        Self {
            repo,
            id_gen: IdGenerator::new(),
            jwt_secret: config.jwt.secret.clone(),
            token_expire_secs: config.jwt.expire_secs,
        }
    }

    /// Register a new user.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            phone: Set(input.phone),
            password_hash: Set(password_hash),
            avatar: Set(None),
            last_login: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.repo.create(model).await
    }

    /// Verify credentials and issue an access token.
    ///
    /// A wrong username and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginOutput> {
        input.validate()?;

        let user = self
            .repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = auth::issue_token(&user.id, &self.jwt_secret, self.token_expire_secs)?;
        self.repo
            .touch_last_login(&user.id, Utc::now().into())
            .await?;

        Ok(LoginOutput { user, token })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = auth::verify_token(token, &self.jwt_secret)?;
        self.repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Fetch a user's profile.
    pub async fn get_profile(&self, id: &str) -> AppResult<user::Model> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id}")))
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use renthub_common::config::{Config, DatabaseConfig, JwtConfig, RedisConfig, ServerConfig};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/renthub_test".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost".to_string(),
                prefix: "renthub".to_string(),
                op_timeout_ms: 2000,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                expire_secs: 3600,
            },
        }
    }

    fn test_user(id: &str, username: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            phone: "555-0100".to_string(),
            password_hash: hash_password(password).unwrap(),
            avatar: None,
            last_login: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(
            UserRepository::new(Arc::new(db.into_connection())),
            &test_config(),
        )
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_taken_username() {
        let existing = test_user("u1", "alex", "password123");

        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let result = service(db)
            .register(RegisterInput {
                username: "alex".to_string(),
                password: "password123".to_string(),
                phone: "555-0100".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let existing = test_user("u1", "alex", "password123");

        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let result = service(db)
            .login(LoginInput {
                username: "alex".to_string(),
                password: "not-the-password".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db)
            .login(LoginInput {
                username: "ghost".to_string(),
                password: "whatever".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
