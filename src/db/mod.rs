pub mod memory;
pub mod postgres;
pub mod redis;
pub mod seed;
pub mod store;

pub use memory::MemoryCatalogStore;
pub use postgres::{create_pool, run_migrations, PgCatalogStore};
pub use self::redis::create_redis_client;
pub use self::redis::{Cache, CacheKey, CacheWriterHandle};
pub use store::CatalogStore;

#[cfg(test)]
pub use store::MockCatalogStore;
