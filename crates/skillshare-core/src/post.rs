//! Posts and the engagement attached to them: likes, comments and reposts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountSummary;

// ─── Post ────────────────────────────────────────────────────────────────────

/// A media attachment referenced by URL. Uploading is handled elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
  pub url:        String,
  /// MIME type, e.g. `image/png` or `video/mp4`.
  pub media_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  pub caption:    String,
  pub media:      Vec<MediaItem>,
  /// Accounts tagged in the post.
  pub tagged:     Vec<Uuid>,
  pub posted_at:  DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::PostStore::create_post`].
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id: Uuid,
  pub caption:   String,
  pub media:     Vec<MediaItem>,
  pub tagged:    Vec<Uuid>,
}

/// Replacement of the author-editable fields of a post.
#[derive(Debug, Clone)]
pub struct PostUpdate {
  pub caption: String,
  pub media:   Vec<MediaItem>,
  pub tagged:  Vec<Uuid>,
}

// ─── Engagement ──────────────────────────────────────────────────────────────

/// Aggregated engagement for one post, as seen by one viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
  pub like_count:      u64,
  pub comment_count:   u64,
  pub liked_by_viewer: bool,
  pub reposted_by:     Vec<AccountSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
  pub like_id:    Uuid,
  pub post_id:    Uuid,
  pub account_id: Uuid,
  pub liked_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id:   Uuid,
  pub post_id:      Uuid,
  pub account_id:   Uuid,
  pub content:      String,
  pub commented_at: DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repost {
  pub post_id:     Uuid,
  pub account_id:  Uuid,
  pub reposted_at: DateTime<Utc>,
}
