pub mod entity;
pub mod pool;
pub mod sqlx_repo;
