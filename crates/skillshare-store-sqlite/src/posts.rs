//! [`PostStore`] for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  account::AccountSummary,
  page::{Page, PageRequest},
  post::{Engagement, NewPost, Post, PostUpdate},
  store::PostStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    ACCOUNT_COLUMNS, POST_COLUMNS, RawAccount, RawPost, decode_count, encode_dt, encode_media,
    encode_uuid, now,
  },
  store::{SqliteStore, bounds},
};

// ─── Connection-thread helpers ───────────────────────────────────────────────

fn load_tags(conn: &Connection, post_id: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt =
    conn.prepare_cached("SELECT account_id FROM post_tags WHERE post_id = ?1 ORDER BY rowid")?;
  stmt
    .query_map(rusqlite::params![post_id], |r| r.get(0))?
    .collect()
}

fn write_tags(conn: &Connection, post_id: &str, tagged: &[String]) -> rusqlite::Result<()> {
  conn.execute("DELETE FROM post_tags WHERE post_id = ?1", rusqlite::params![post_id])?;
  let mut stmt =
    conn.prepare_cached("INSERT OR IGNORE INTO post_tags (post_id, account_id) VALUES (?1, ?2)")?;
  for account_id in tagged {
    stmt.execute(rusqlite::params![post_id, account_id])?;
  }
  Ok(())
}

fn select_post(conn: &Connection, post_id: &str) -> rusqlite::Result<Option<RawPost>> {
  let raw = conn
    .query_row(
      &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.post_id = ?1"),
      rusqlite::params![post_id],
      RawPost::from_row,
    )
    .optional()?;
  match raw {
    Some(mut raw) => {
      raw.tagged = load_tags(conn, &raw.post_id)?;
      Ok(Some(raw))
    }
    None => Ok(None),
  }
}

/// One page of posts, newest first, optionally restricted to an author.
fn page_posts(
  conn: &Connection,
  author: Option<&str>,
  limit: i64,
  offset: i64,
) -> rusqlite::Result<(Vec<RawPost>, i64)> {
  let total: i64 = conn.query_row(
    "SELECT COUNT(*) FROM posts WHERE ?1 IS NULL OR author_id = ?1",
    rusqlite::params![author],
    |r| r.get(0),
  )?;

  let mut stmt = conn.prepare(&format!(
    "SELECT {POST_COLUMNS} FROM posts p
     WHERE ?1 IS NULL OR p.author_id = ?1
     ORDER BY p.posted_at DESC, p.rowid DESC
     LIMIT ?2 OFFSET ?3"
  ))?;
  let mut rows = stmt
    .query_map(rusqlite::params![author, limit, offset], RawPost::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  for raw in &mut rows {
    raw.tagged = load_tags(conn, &raw.post_id)?;
  }
  Ok((rows, total))
}

fn decode_page(raws: Vec<RawPost>, total: i64, page: PageRequest) -> Result<Page<Post>> {
  let items = raws
    .into_iter()
    .map(RawPost::into_post)
    .collect::<Result<Vec<_>>>()?;
  Ok(Page::new(items, decode_count(total)?, page))
}

// ─── PostStore impl ──────────────────────────────────────────────────────────

impl PostStore for SqliteStore {
  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let at = now();
    let post = Post {
      post_id:    Uuid::new_v4(),
      author_id:  input.author_id,
      caption:    input.caption,
      media:      input.media,
      tagged:     input.tagged,
      posted_at:  at,
      updated_at: at,
    };

    let id_str     = encode_uuid(post.post_id);
    let author_str = encode_uuid(post.author_id);
    let caption    = post.caption.clone();
    let media_json = encode_media(&post.media)?;
    let tagged: Vec<String> = post.tagged.iter().copied().map(encode_uuid).collect();
    let at_str     = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO posts (post_id, author_id, caption, media_json, posted_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, author_str, caption, media_json, at_str],
        )?;
        write_tags(&tx, &id_str, &tagged)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_post(conn, &id_str)?))
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self, page: PageRequest) -> Result<Page<Post>> {
    let (limit, offset) = bounds(page);
    let (raws, total) = self
      .conn
      .call(move |conn| Ok(page_posts(conn, None, limit, offset)?))
      .await?;
    decode_page(raws, total, page)
  }

  async fn list_posts_by_author(&self, author_id: Uuid, page: PageRequest) -> Result<Page<Post>> {
    let (limit, offset) = bounds(page);
    let author_str = encode_uuid(author_id);
    let (raws, total) = self
      .conn
      .call(move |conn| Ok(page_posts(conn, Some(&author_str), limit, offset)?))
      .await?;
    decode_page(raws, total, page)
  }

  async fn update_post(&self, id: Uuid, update: PostUpdate) -> Result<Option<Post>> {
    let id_str     = encode_uuid(id);
    let media_json = encode_media(&update.media)?;
    let tagged: Vec<String> = update.tagged.iter().copied().map(encode_uuid).collect();
    let caption    = update.caption;
    let at_str     = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE posts SET caption = ?2, media_json = ?3, updated_at = ?4 WHERE post_id = ?1",
          rusqlite::params![id_str, caption, media_json, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        write_tags(&tx, &id_str, &tagged)?;
        let raw = select_post(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn delete_post(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for sql in [
          "DELETE FROM notifications WHERE post_id = ?1",
          "DELETE FROM likes         WHERE post_id = ?1",
          "DELETE FROM comments      WHERE post_id = ?1",
          "DELETE FROM post_reposts  WHERE post_id = ?1",
          "DELETE FROM post_tags     WHERE post_id = ?1",
        ] {
          tx.execute(sql, rusqlite::params![id_str])?;
        }
        let changed = tx.execute("DELETE FROM posts WHERE post_id = ?1", rusqlite::params![id_str])?;
        tx.commit()?;
        Ok(changed > 0)
      })
      .await?;

    if deleted {
      tracing::debug!(post_id = %id, "deleted post and its dependents");
    }
    Ok(deleted)
  }

  async fn add_repost(&self, post_id: Uuid, account_id: Uuid) -> Result<bool> {
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);
    let at_str      = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO post_reposts (post_id, account_id, reposted_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![post_str, account_str, at_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn remove_repost(&self, post_id: Uuid, account_id: Uuid) -> Result<bool> {
    let post_str    = encode_uuid(post_id);
    let account_str = encode_uuid(account_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM post_reposts WHERE post_id = ?1 AND account_id = ?2",
          rusqlite::params![post_str, account_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn post_engagement(&self, post_id: Uuid, viewer: Uuid) -> Result<Engagement> {
    let post_str   = encode_uuid(post_id);
    let viewer_str = encode_uuid(viewer);

    let (likes, comments, liked, reposters): (i64, i64, bool, Vec<RawAccount>) = self
      .conn
      .call(move |conn| {
        let likes: i64 = conn.query_row(
          "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
          rusqlite::params![post_str],
          |r| r.get(0),
        )?;
        let comments: i64 = conn.query_row(
          "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
          rusqlite::params![post_str],
          |r| r.get(0),
        )?;
        let liked = conn
          .query_row(
            "SELECT 1 FROM likes WHERE post_id = ?1 AND account_id = ?2",
            rusqlite::params![post_str, viewer_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        let mut stmt = conn.prepare(&format!(
          "SELECT {ACCOUNT_COLUMNS}
           FROM post_reposts r
           JOIN accounts a ON a.account_id = r.account_id
           WHERE r.post_id = ?1 AND a.deleted = 0
           ORDER BY r.reposted_at"
        ))?;
        let reposters = stmt
          .query_map(rusqlite::params![post_str], RawAccount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((likes, comments, liked, reposters))
      })
      .await?;

    let reposted_by = reposters
      .into_iter()
      .map(|raw| raw.into_account().map(|a| AccountSummary::from(&a)))
      .collect::<Result<Vec<_>>>()?;

    Ok(Engagement {
      like_count: decode_count(likes)?,
      comment_count: decode_count(comments)?,
      liked_by_viewer: liked,
      reposted_by,
    })
  }
}
