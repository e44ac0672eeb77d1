use serde::{Deserialize, Serialize};

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  /// Machine-readable error type
  pub error: String,

  /// Human-readable message
  pub message: String,

  /// Optional structured details
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

/// Query string of the invoice listing
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListingQuery {
  #[serde(default)]
  pub query: Option<String>,
  #[serde(default)]
  pub page: Option<i64>,
}

impl ListingQuery {
  pub fn page(&self) -> i64 {
    self.page.unwrap_or(1).max(1)
  }

  pub fn search(&self) -> Option<String> {
    self
      .query
      .as_deref()
      .map(str::trim)
      .filter(|q| !q.is_empty())
      .map(str::to_string)
  }

  /// Canonical page-cache key for `path` with this query, so that equivalent
  /// URLs share one cached rendering.
  pub fn cache_key(&self, path: &str) -> String {
    let canonical = ListingQuery {
      query: self.search(),
      page: Some(self.page()),
    };
    match serde_urlencoded::to_string(&canonical) {
      Ok(qs) if !qs.is_empty() => format!("{}?{}", path, qs),
      _ => path.to_string(),
    }
  }
}
