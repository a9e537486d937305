use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::{crypto, jwt};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, browser, os, screen_width, screen_height, created_at";

/// A concurrent registration can slip between the duplicate check and the
/// insert; the unique index then rejects the insert, and that race is
/// still a caller-visible duplicate, not a server fault.
fn map_registration_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::BadRequest("Username or email already exists".to_string())
        }
        _ => Error::from(err),
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a credentialed user and issues a session token. Duplicate
    /// username or email is a caller-visible 400, checked before insert.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<(String, User)> {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
                .bind(&username)
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(Error::BadRequest(
                "Username or email already exists".to_string(),
            ));
        }

        let password_hash = crypto::hash_password(&password)?;
        let id = Uuid::new_v4();

        let user: User = sqlx::query_as(&format!(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_registration_error)?;

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    /// Logs in by username or email. Unknown identity and wrong password
    /// are indistinguishable to the caller (both 401).
    pub async fn login(&self, username_or_email: String, password: String) -> Result<(String, User)> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1",
            USER_COLUMNS
        ))
        .bind(&username_or_email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        };
        let Some(ref hash) = user.password_hash else {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        };
        let valid = crypto::verify_password(&password, hash)?;
        if !valid {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        let config = get_config();
        jwt::issue_token(
            &config.jwt_secret,
            user.id,
            user.username.clone(),
            config.token_ttl_hours,
        )
    }
}
