//! Redis-backed page cache shared by every server instance.
//!
//! Each rendering is stored under `page:{key}` with `EX`. A set at
//! `page-index:{path}` remembers every key rendered for a path so that
//! `revalidate` can drop all query-string variants at once, and
//! `page-gen:{path}` counts revalidations. Writes and revalidations run as
//! Lua scripts, so Redis applies each one as a single step.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use crate::domain::invoice::{CacheError, PageCache, ports::path_of};

const PAGE_PREFIX: &str = "page:";

// KEYS: page, index, generation. ARGV: html, expected generation, ttl, key.
const PUT_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[3]) or '0'
if current ~= ARGV[2] then
  return 0
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
redis.call('SADD', KEYS[2], ARGV[4])
redis.call('EXPIRE', KEYS[2], ARGV[3])
return 1
";

// KEYS: index, bare path page, generation. ARGV: page prefix.
const REVALIDATE_SCRIPT: &str = r"
redis.call('INCR', KEYS[3])
local keys = redis.call('SMEMBERS', KEYS[1])
for _, key in ipairs(keys) do
  redis.call('DEL', ARGV[1] .. key)
end
redis.call('DEL', KEYS[1], KEYS[2])
return #keys
";

fn page_key(key: &str) -> String {
  format!("{}{}", PAGE_PREFIX, key)
}

fn index_key(path: &str) -> String {
  format!("page-index:{}", path)
}

fn generation_key(path: &str) -> String {
  format!("page-gen:{}", path)
}

#[derive(Clone)]
pub struct RedisPageCache {
  conn: ConnectionManager,
  ttl_seconds: u64,
  put_script: Script,
  revalidate_script: Script,
}

impl RedisPageCache {
  pub fn new(conn: ConnectionManager, ttl_seconds: u64) -> Self {
    Self {
      conn,
      ttl_seconds: ttl_seconds.max(1),
      put_script: Script::new(PUT_SCRIPT),
      revalidate_script: Script::new(REVALIDATE_SCRIPT),
    }
  }
}

#[async_trait]
impl PageCache for RedisPageCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    let mut conn = self.conn.clone();
    let html: Option<String> = conn.get(page_key(key)).await?;
    Ok(html)
  }

  async fn generation(&self, path: &str) -> Result<u64, CacheError> {
    let mut conn = self.conn.clone();
    let generation: Option<u64> = conn.get(generation_key(path)).await?;
    Ok(generation.unwrap_or(0))
  }

  async fn put(&self, key: &str, html: String, generation: u64) -> Result<bool, CacheError> {
    let mut conn = self.conn.clone();
    let path = path_of(key);

    let stored: i64 = self
      .put_script
      .key(page_key(key))
      .key(index_key(path))
      .key(generation_key(path))
      .arg(html)
      .arg(generation.to_string())
      .arg(self.ttl_seconds)
      .arg(key)
      .invoke_async(&mut conn)
      .await?;

    if stored == 0 {
      tracing::debug!("Dropping stale render of {}", key);
    }
    Ok(stored == 1)
  }

  async fn revalidate(&self, path: &str) -> Result<(), CacheError> {
    let mut conn = self.conn.clone();

    let dropped: i64 = self
      .revalidate_script
      .key(index_key(path))
      .key(page_key(path))
      .key(generation_key(path))
      .arg(PAGE_PREFIX)
      .invoke_async(&mut conn)
      .await?;

    tracing::debug!("Revalidated {} ({} cached pages dropped)", path, dropped);
    Ok(())
  }
}
