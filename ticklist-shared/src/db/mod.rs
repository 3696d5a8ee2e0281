/// Database access for TickList
///
/// # Modules
///
/// - [`pool`]: PostgreSQL connection pool construction
/// - [`migrations`]: schema migration runner

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig};
