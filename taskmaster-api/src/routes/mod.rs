/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Account management (register, login, passwords, profile)
/// - `auth`: Token refresh
/// - `categories`: Category CRUD
/// - `tasks`: Task CRUD and search
pub mod auth;
pub mod categories;
pub mod health;
pub mod tasks;
pub mod users;
