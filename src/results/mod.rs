// Public API
pub use models::GameResult;
pub use repository::{
    InMemoryResultRepository, ResultRepository, ResultStoreError, SqliteResultRepository,
};
pub use routes::router;

// Internal modules
mod models;
mod repository;
mod routes;
