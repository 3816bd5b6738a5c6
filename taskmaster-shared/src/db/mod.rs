/// Database plumbing: connection pool and migrations
pub mod migrations;
pub mod pool;

pub use migrations::{ensure_database_exists, run_migrations};
pub use pool::{create_pool, health_check, DatabaseConfig};
