pub mod memory;
pub mod postgres;

pub use memory::InMemoryRevocationStore;
pub use postgres::PostgresRevocationStore;
