use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::is_valid_email;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EMPLOYEE: &str = "employee";

const USER_COLUMNS: &str = "id, name, email, username, password_hash, refresh_token, \
     oauth_provider, role, archived, created_at, updated_at";

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    // Credentials never leave the server, in any response shape.
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub oauth_provider: Option<String>,
    pub role: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let any_blank = [&self.name, &self.username, &self.email, &self.password]
            .iter()
            .any(|field| field.trim().is_empty());
        if any_blank {
            return Err(AppError::Validation("Bad Request - Form Field Empty".into()));
        }

        if self.name.trim().chars().count() < 2 {
            return Err(AppError::Validation(
                "Name must be at least 2 characters long".into(),
            ));
        }

        if !is_valid_email(self.email.trim()) {
            return Err(AppError::Validation("Invalid email format".into()));
        }

        if self.password.chars().count() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters long".into(),
            ));
        }

        if let Some(role) = &self.role {
            if role != ROLE_ADMIN && role != ROLE_EMPLOYEE {
                return Err(AppError::Validation(
                    "Role must be either admin or employee".into(),
                ));
            }
        }

        Ok(())
    }
}

impl User {
    pub async fn exists_with_username_or_email(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        name: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (id, name, username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Single-column write: the refresh token update must not re-run any
    /// other field constraint.
    pub async fn store_refresh_token(
        pool: &PgPool,
        id: Uuid,
        refresh_token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET refresh_token = $1, updated_at = now() WHERE id = $2")
            .bind(refresh_token)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
