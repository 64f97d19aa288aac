mod pg_pool;
mod repositories;

pub use repositories::InMemoryInterviewRepository;
pub use repositories::InMemoryJobRepository;
pub use repositories::PgInterviewRepository;
pub use repositories::PgJobRepository;

pub use pg_pool::{create_pool, run_migrations};
