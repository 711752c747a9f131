//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postcraft_core::domain::{NewPrompt, Prompt, Social, User, UserCredentials};
use postcraft_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct PromptRecord {
    id: i64,
    user_id: Uuid,
    title: String,
    body: String,
    social: String,
    created_at: DateTime<Utc>,
}
impl PromptRecord {
    fn to_domain(self) -> PortResult<Prompt> {
        let social = self.social.parse::<Social>().map_err(PortError::Unexpected)?;
        Ok(Prompt {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            body: self.body,
            social,
            created_at: self.created_at,
        })
    }
}

const PROMPT_COLUMNS: &str = "id, user_id, title, body, social, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("User {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (session_id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE session_id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM auth_sessions WHERE session_id = $1 RETURNING user_id",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn list_prompts(&self, user_id: Uuid, social: Social) -> PortResult<Vec<Prompt>> {
        let records = sqlx::query_as::<_, PromptRecord>(&format!(
            "SELECT {} FROM prompts WHERE user_id = $1 AND social = $2 ORDER BY created_at DESC, id DESC",
            PROMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(social.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(PromptRecord::to_domain).collect()
    }

    async fn get_prompt(&self, user_id: Uuid, prompt_id: i64) -> PortResult<Prompt> {
        sqlx::query_as::<_, PromptRecord>(&format!(
            "SELECT {} FROM prompts WHERE id = $1 AND user_id = $2",
            PROMPT_COLUMNS
        ))
        .bind(prompt_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Prompt {} not found", prompt_id)))?
        .to_domain()
    }

    async fn insert_prompt(&self, user_id: Uuid, prompt: &NewPrompt) -> PortResult<Prompt> {
        sqlx::query_as::<_, PromptRecord>(&format!(
            "INSERT INTO prompts (user_id, title, body, social) VALUES ($1, $2, $3, $4) RETURNING {}",
            PROMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(&prompt.title)
        .bind(&prompt.body)
        .bind(prompt.social.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn update_prompt(
        &self,
        user_id: Uuid,
        prompt_id: i64,
        title: &str,
        body: &str,
    ) -> PortResult<Prompt> {
        sqlx::query_as::<_, PromptRecord>(&format!(
            "UPDATE prompts SET title = $1, body = $2 WHERE id = $3 AND user_id = $4 RETURNING {}",
            PROMPT_COLUMNS
        ))
        .bind(title)
        .bind(body)
        .bind(prompt_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found(format!("Prompt {} not found", prompt_id)))?
        .to_domain()
    }

    async fn delete_prompt(&self, user_id: Uuid, prompt_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1 AND user_id = $2")
            .bind(prompt_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Prompt {} not found", prompt_id)));
        }
        Ok(())
    }
}
