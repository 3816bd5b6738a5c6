/// Task model and database operations
///
/// Tasks belong to one category and one author; both foreign keys
/// cascade on delete. Search is a case-insensitive title substring
/// match scoped to the caller's own tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     due_date DATE,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'pending',
///     category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::authorization::Owned;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Inprogress,
    Completed,
}

/// Task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional due date (date only, no time component)
    pub due_date: Option<NaiveDate>,

    /// Priority level
    pub priority: TaskPriority,

    /// Completion status
    pub status: TaskStatus,

    /// Category the task belongs to
    pub category_id: Uuid,

    /// Owning user
    pub author_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: Option<TaskStatus>,
    pub category_id: Uuid,
    pub author_id: Uuid,
}

/// Partial update for a task
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category_id: Option<Uuid>,
}

impl Owned for Task {
    fn owner_id(&self) -> Uuid {
        self.author_id
    }
}

/// Escapes `%`, `_`, and `\` so user input matches literally in a LIKE
/// pattern
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl Task {
    /// Creates a new task
    ///
    /// The handler verifies category ownership before calling this; the
    /// foreign key still rejects a category that vanished in between.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, priority, status, category_id, author_id)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'pending'::task_status), $6, $7)
            RETURNING id, title, description, due_date, priority, status,
                      category_id, author_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.category_id)
        .bind(data.author_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, regardless of owner
    ///
    /// The caller is expected to run the result through
    /// [`crate::auth::authorization::authorize_owned`] before using it.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   category_id, author_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Partially updates a task
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                priority = COALESCE($5, priority),
                status = COALESCE($6, status),
                category_id = COALESCE($7, category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, due_date, priority, status,
                      category_id, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.category_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the tasks in one category, newest first
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   category_id, author_id, created_at, updated_at
            FROM tasks
            WHERE category_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Searches the caller's tasks by title substring
    ///
    /// Case-insensitive, scoped to `author_id`; LIKE metacharacters in
    /// the term are escaped so they match literally.
    pub async fn search_by_title(
        pool: &PgPool,
        author_id: Uuid,
        term: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   category_id, author_id, created_at, updated_at
            FROM tasks
            WHERE author_id = $1 AND title ILIKE $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Inprogress).unwrap(),
            "\"inprogress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskPriority::High).unwrap(),
            "\"high\""
        );
    }

    #[test]
    fn test_task_owner_id() {
        let author = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: None,
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            category_id: Uuid::new_v4(),
            author_id: author,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(task.owner_id(), author);
    }
}
