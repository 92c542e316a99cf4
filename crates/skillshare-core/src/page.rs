//! Offset pagination shared by every listing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// A window into an ordered listing. Limits are clamped to `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub limit:  u32,
  pub offset: u32,
}

impl PageRequest {
  pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
    Self {
      limit:  limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
      offset: offset.unwrap_or(0),
    }
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(None, None) }
}

/// One page of results plus the size of the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:  Vec<T>,
  pub total:  u64,
  pub limit:  u32,
  pub offset: u32,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
    Self { items, total, limit: request.limit, offset: request.offset }
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items:  self.items.into_iter().map(f).collect(),
      total:  self.total,
      limit:  self.limit,
      offset: self.offset,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn limit_is_clamped() {
    assert_eq!(PageRequest::new(None, None).limit, DEFAULT_LIMIT);
    assert_eq!(PageRequest::new(Some(0), None).limit, 1);
    assert_eq!(PageRequest::new(Some(5000), Some(3)), PageRequest { limit: MAX_LIMIT, offset: 3 });
  }
}
