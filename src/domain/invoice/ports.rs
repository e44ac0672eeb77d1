use async_trait::async_trait;
use uuid::Uuid;

use super::entities::{Customer, Invoice, InvoiceChanges, InvoiceSummary, NewInvoice};
use super::errors::{CacheError, InvoiceError};

/// Filter and page window for the invoice listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
  pub search: Option<String>,
  pub limit: i64,
  pub offset: i64,
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  /// INSERT a single row. The store assigns the id.
  async fn insert(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError>;
  /// UPDATE the editable columns. Returns the number of rows matched.
  async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<u64, InvoiceError>;
  /// DELETE a single row. Returns the number of rows removed.
  async fn delete(&self, id: Uuid) -> Result<u64, InvoiceError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError>;
  async fn search(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceSummary>, InvoiceError>;
  async fn count(&self, search: Option<&str>) -> Result<i64, InvoiceError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
  async fn find_all(&self) -> Result<Vec<Customer>, InvoiceError>;
}

/// Path-keyed cache of rendered pages.
///
/// Keys are request paths, optionally followed by `?` and a query string.
/// `revalidate(path)` marks every key for that path stale, query variants
/// included, so the next request renders it again.
///
/// Each path has a generation that `revalidate` bumps. A renderer reads the
/// generation before it reads the data and hands it back to `put`; a page
/// rendered from data older than the last revalidation is never stored.
#[async_trait]
pub trait PageCache: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
  async fn generation(&self, path: &str) -> Result<u64, CacheError>;
  /// Returns false when the page was dropped because `path_of(key)` was
  /// revalidated after `generation` was read.
  async fn put(&self, key: &str, html: String, generation: u64) -> Result<bool, CacheError>;
  async fn revalidate(&self, path: &str) -> Result<(), CacheError>;
}

/// Path part of a cache key.
pub fn path_of(key: &str) -> &str {
  key.split_once('?').map_or(key, |(path, _)| path)
}

/// True if `key` is a cached rendering of `path`.
pub fn key_belongs_to_path(key: &str, path: &str) -> bool {
  match key.strip_prefix(path) {
    Some(rest) => rest.is_empty() || rest.starts_with('?'),
    None => false,
  }
}
