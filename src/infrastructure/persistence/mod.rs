//! Lead store adapters

#[cfg(feature = "postgres")]
pub mod database;
#[cfg(feature = "postgres")]
pub mod lead_repository;
pub mod memory;

#[cfg(feature = "postgres")]
pub use database::{create_pool, run_migrations, DatabaseConfig};
#[cfg(feature = "postgres")]
pub use lead_repository::PgLeadRepository;
pub use memory::MemoryLeadRepository;
