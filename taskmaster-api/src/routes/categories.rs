/// Category endpoints
///
/// All routes require authentication; every operation checks ownership
/// of the category first. A category that exists under another user
/// answers 403, one that does not exist answers 404.
///
/// # Endpoints
///
/// - `POST /category/create`
/// - `POST /category/edit`
/// - `POST /category/delete`
/// - `GET  /category/list`
/// - `GET  /category/:id`
/// - `GET  /category/:id/tasks`
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskmaster_shared::{
    auth::{authorization::authorize_owned, middleware::AuthContext},
    models::{
        category::{Category, CreateCategory},
        task::Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create-category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,
}

/// Edit-category request
///
/// Omitted fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCategoryRequest {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

/// Delete-category request
#[derive(Debug, Deserialize)]
pub struct DeleteCategoryRequest {
    pub id: Uuid,
}

/// Creates a category for the authenticated user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: The user already has a category with this name
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let category = Category::create(
        &state.db,
        CreateCategory {
            name: req.name,
            description: req.description,
            author_id: auth.user_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Edits an owned category
pub async fn edit_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<EditCategoryRequest>,
) -> ApiResult<Json<Category>> {
    req.validate().map_err(ApiError::from_validation)?;

    authorize_owned(auth.user_id, Category::find_by_id(&state.db, req.id).await?)?;

    let category = Category::update(&state.db, req.id, req.name, req.description)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

/// Deletes an owned category and all its tasks
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DeleteCategoryRequest>,
) -> ApiResult<StatusCode> {
    authorize_owned(auth.user_id, Category::find_by_id(&state.db, req.id).await?)?;

    Category::delete(&state.db, req.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the authenticated user's categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::list_by_author(&state.db, auth.user_id).await?;

    Ok(Json(categories))
}

/// Fetches one owned category
pub async fn get_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Category>> {
    let category = authorize_owned(auth.user_id, Category::find_by_id(&state.db, id).await?)?;

    Ok(Json(category))
}

/// Lists the tasks in one owned category
pub async fn list_category_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    authorize_owned(auth.user_id, Category::find_by_id(&state.db, id).await?)?;

    let tasks = Task::list_by_category(&state.db, id).await?;

    Ok(Json(tasks))
}
