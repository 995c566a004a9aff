mod memory_repository;
mod postgres_repository;
mod r#trait;

pub use memory_repository::MemoryGroupRepository;
pub use postgres_repository::PostgresGroupRepository;
pub use r#trait::GroupRepository;
