/// Task endpoints
///
/// All routes require authentication. Creating a task checks the target
/// category's ownership; every other operation checks the task's own
/// ownership with the same 404/403 policy as categories.
///
/// # Endpoints
///
/// - `POST /task/create`
/// - `POST /task/edit`
/// - `POST /task/delete`
/// - `GET  /task/:id`
/// - `GET  /task/search/:term`
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use taskmaster_shared::{
    auth::{authorization::authorize_owned, middleware::AuthContext},
    models::{
        category::Category,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create-task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,

    pub priority: TaskPriority,

    /// Defaults to `pending` when omitted
    pub status: Option<TaskStatus>,

    pub category_id: Uuid,
}

/// Edit-task request
///
/// Omitted fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct EditTaskRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub due_date: Option<NaiveDate>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    pub category_id: Option<Uuid>,
}

/// Delete-task request
#[derive(Debug, Deserialize)]
pub struct DeleteTaskRequest {
    pub id: Uuid,
}

/// Creates a task in one of the caller's categories
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `404 Not Found`: The category does not exist
/// - `403 Forbidden`: The category belongs to another user
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate().map_err(ApiError::from_validation)?;

    authorize_owned(
        auth.user_id,
        Category::find_by_id(&state.db, req.category_id).await?,
    )?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            status: req.status,
            category_id: req.category_id,
            author_id: auth.user_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Edits an owned task
///
/// Moving the task to another category re-checks ownership of the
/// target category.
pub async fn edit_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<EditTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from_validation)?;

    authorize_owned(auth.user_id, Task::find_by_id(&state.db, req.id).await?)?;

    if let Some(category_id) = req.category_id {
        authorize_owned(
            auth.user_id,
            Category::find_by_id(&state.db, category_id).await?,
        )?;
    }

    let task = Task::update(
        &state.db,
        req.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            status: req.status,
            category_id: req.category_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes an owned task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DeleteTaskRequest>,
) -> ApiResult<StatusCode> {
    authorize_owned(auth.user_id, Task::find_by_id(&state.db, req.id).await?)?;

    Task::delete(&state.db, req.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetches one owned task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = authorize_owned(auth.user_id, Task::find_by_id(&state.db, id).await?)?;

    Ok(Json(task))
}

/// Searches the caller's tasks by title substring
///
/// Case-insensitive, scoped to the authenticated user; an empty result
/// set answers 200 with an empty array.
pub async fn search_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(term): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::search_by_title(&state.db, auth.user_id, &term).await?;

    Ok(Json(tasks))
}
