/// User model and database operations
///
/// Users own all other resources in TaskMaster. Passwords are stored as
/// Argon2id hashes (see [`crate::auth::password`]), never in plaintext,
/// and the reset-token pair of columns backs the forgot/reset-password
/// flow.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     full_name VARCHAR(255),
///     profile_picture VARCHAR(512),
///     status user_status NOT NULL DEFAULT 'active',
///     reset_token VARCHAR(64),
///     reset_token_expiry TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskmaster_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         full_name: Some("Jane Doe".to_string()),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&pool, "USER@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account status
///
/// Only `Active` accounts may log in; the generic login failure message
/// does not distinguish a banned account from a wrong password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Banned,
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, stored normalized (trimmed, lowercase)
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional display name
    pub full_name: Option<String>,

    /// Optional profile picture URL
    pub profile_picture: Option<String>,

    /// Account status
    pub status: UserStatus,

    /// Outstanding password-reset token, if one has been issued
    pub reset_token: Option<String>,

    /// When the outstanding reset token stops being valid
    pub reset_token_expiry: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// The email is normalized by [`User::create`]; the hash must already be
/// an Argon2id PHC string.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
}

/// Normalizes an email address for storage and lookup
///
/// Trim surrounding whitespace and lowercase, so `" User@Example.COM "`
/// and `"user@example.com"` name the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate email (unique constraint
    /// violation) or a connection failure. The API layer maps the
    /// unique violation to a 409 Conflict.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, full_name, profile_picture, status,
                      reset_token, reset_token_expiry, created_at, updated_at
            "#,
        )
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .bind(data.full_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, profile_picture, status,
                   reset_token, reset_token_expiry, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// The argument is normalized first, so lookup is case- and
    /// whitespace-insensitive.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, profile_picture, status,
                   reset_token, reset_token_expiry, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the user's password hash
    ///
    /// Only the hash changes; outstanding refresh tokens are not
    /// revoked here.
    pub async fn set_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Partially updates profile fields
    ///
    /// `None` leaves the corresponding column untouched.
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        full_name: Option<String>,
        profile_picture: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                profile_picture = COALESCE($3, profile_picture),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, full_name, profile_picture, status,
                      reset_token, reset_token_expiry, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(profile_picture)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Stores a password-reset token and its expiry on the user row
    ///
    /// Overwrites any previous token: only the most recently issued
    /// reset link works.
    pub async fn set_reset_token(
        pool: &PgPool,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $2, reset_token_expiry = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expiry)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears any outstanding reset token
    ///
    /// Used to roll back when the reset email cannot be dispatched.
    pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = NULL, reset_token_expiry = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes a reset token, setting the new password hash
    ///
    /// A single UPDATE matches the token and its expiry and clears both
    /// reset columns alongside the new hash, so a token is usable at
    /// most once even under concurrent attempts. Returns the updated
    /// user, or `None` when the token is unknown or expired.
    pub async fn consume_reset_token(
        pool: &PgPool,
        token: &str,
        new_password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2,
                reset_token = NULL,
                reset_token_expiry = NULL,
                updated_at = NOW()
            WHERE reset_token = $1 AND reset_token_expiry > NOW()
            RETURNING id, email, password_hash, full_name, profile_picture, status,
                      reset_token, reset_token_expiry, created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(new_password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Clears reset tokens whose expiry has passed
    ///
    /// Housekeeping for the periodic maintenance task; expired tokens
    /// are already unusable, this just tidies the rows.
    pub async fn clear_expired_reset_tokens(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_token = NULL, reset_token_expiry = NULL
            WHERE reset_token IS NOT NULL AND reset_token_expiry <= $1
            "#,
        )
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("User@Example.COM"), "user@example.com");
        assert_eq!(normalize_email("  a@b.c  "), "a@b.c");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_user_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&UserStatus::Banned).unwrap(),
            "\"banned\""
        );
    }

    // Database operations are exercised in tests/db_models_tests.rs.
}
