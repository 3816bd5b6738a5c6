/// Database models for TaskMaster
///
/// Each model owns its SQL: a struct deriving `sqlx::FromRow` plus
/// associated functions for the queries the API needs. Categories and
/// tasks are ownership-scoped — every query that touches them either
/// filters by `author_id` or returns the row for an explicit ownership
/// check via [`crate::auth::authorization`].
pub mod category;
pub mod task;
pub mod user;

pub use category::Category;
pub use task::Task;
pub use user::User;
