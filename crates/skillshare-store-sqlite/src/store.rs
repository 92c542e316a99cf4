//! [`SqliteStore`]: the SQLite implementation of the SkillShare store traits.

use std::path::Path;

use skillshare_core::{page::PageRequest, store::Store};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A SkillShare store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All access
/// goes through one connection thread, so writes are serialized.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl Store for SqliteStore {
  type Error = Error;
}

/// `LIMIT` and `OFFSET` bind values for a page request.
pub(crate) fn bounds(page: PageRequest) -> (i64, i64) {
  (i64::from(page.limit), i64::from(page.offset))
}
