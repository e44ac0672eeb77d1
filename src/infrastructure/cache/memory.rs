//! In-process page cache.
//!
//! Entries live in a `DashMap` keyed by request path (plus query string).
//! Expired entries are dropped when read and swept on every write, so
//! one-off search pages do not pile up.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::invoice::{
  CacheError, PageCache,
  ports::{key_belongs_to_path, path_of},
};

struct CachedPage {
  html: String,
  expires_at: Option<Instant>,
}

impl CachedPage {
  fn is_expired(&self) -> bool {
    self.expires_at.is_some_and(|exp| Instant::now() > exp)
  }
}

#[derive(Clone)]
pub struct InMemoryPageCache {
  pages: Arc<DashMap<String, CachedPage>>,
  generations: Arc<DashMap<String, u64>>,
  ttl: Option<Duration>,
}

impl InMemoryPageCache {
  /// `ttl = None` keeps pages until they are revalidated.
  pub fn new(ttl: Option<Duration>) -> Self {
    Self {
      pages: Arc::new(DashMap::new()),
      generations: Arc::new(DashMap::new()),
      ttl,
    }
  }

  pub fn len(&self) -> usize {
    self.pages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }

  fn sweep_expired(&self) {
    if self.ttl.is_some() {
      self.pages.retain(|_, page| !page.is_expired());
    }
  }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    if let Some(page) = self.pages.get(key) {
      if !page.is_expired() {
        tracing::debug!("Page cache HIT {}", key);
        return Ok(Some(page.html.clone()));
      }
    }

    self.pages.remove(key);
    tracing::debug!("Page cache MISS {}", key);
    Ok(None)
  }

  async fn generation(&self, path: &str) -> Result<u64, CacheError> {
    Ok(self.generations.get(path).map(|g| *g).unwrap_or(0))
  }

  async fn put(&self, key: &str, html: String, generation: u64) -> Result<bool, CacheError> {
    self.sweep_expired();

    // The generation entry stays locked until the page is inserted, so a
    // concurrent revalidate either sees the page or makes this write a no-op.
    let current = self
      .generations
      .entry(path_of(key).to_string())
      .or_insert(0);
    if *current != generation {
      tracing::debug!("Dropping stale render of {}", key);
      return Ok(false);
    }

    let expires_at = self.ttl.map(|ttl| Instant::now() + ttl);
    self
      .pages
      .insert(key.to_string(), CachedPage { html, expires_at });
    Ok(true)
  }

  async fn revalidate(&self, path: &str) -> Result<(), CacheError> {
    *self.generations.entry(path.to_string()).or_insert(0) += 1;

    let before = self.pages.len();
    self.pages.retain(|key, _| !key_belongs_to_path(key, path));
    tracing::debug!(
      "Revalidated {} ({} cached pages dropped)",
      path,
      before.saturating_sub(self.pages.len())
    );
    Ok(())
  }
}
