/// Category model and database operations
///
/// Categories group tasks and belong to exactly one user. Names are
/// unique per author, not globally, so two users can each have a
/// "Work" category.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE categories (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (author_id, name)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::authorization::Owned;

/// Task category
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID (UUID v4)
    pub id: Uuid,

    /// Category name, unique per author
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Owning user
    pub author_id: Uuid,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub author_id: Uuid,
}

impl Owned for Category {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

impl Category {
    /// Creates a new category
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate (author, name) pair or a
    /// connection failure.
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<Self, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, author_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.author_id)
        .fetch_one(pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by ID, regardless of owner
    ///
    /// The caller is expected to run the result through
    /// [`crate::auth::authorization::authorize_owned`] before using it.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, author_id, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Partially updates a category
    ///
    /// `None` leaves the corresponding column untouched. Returns `None`
    /// when the category does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Deletes a category and (via cascade) its tasks
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all categories owned by `author_id`, newest first
    pub async fn list_by_author(pool: &PgPool, author_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, author_id, created_at, updated_at
            FROM categories
            WHERE author_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_owner_id() {
        let author = Uuid::new_v4();
        let category = Category {
            id: Uuid::new_v4(),
            name: "Work".to_string(),
            description: None,
            author_id: author,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(category.owner_id(), author);
    }
}
