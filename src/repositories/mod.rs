pub mod log_repository;
pub mod memory_log_repository;

pub use log_repository::MongoLogRepository;
pub use memory_log_repository::MemoryLogRepository;
