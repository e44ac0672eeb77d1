pub mod memory;
pub mod redis_cache;

pub use memory::InMemoryPageCache;
pub use redis_cache::RedisPageCache;
