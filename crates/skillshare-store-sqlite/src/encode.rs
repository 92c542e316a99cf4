//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order is chronological order.
//! Calendar dates are `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.
//! Nested lists (media, subtopics) are compact JSON.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::Row;
use skillshare_core::{
  account::{Account, Profile},
  deactivation::Deactivation,
  goal::{Goal, GoalStatus},
  learning::{LearningPlan, ProgressUpdate, Subtopic},
  note::Note,
  notification::{Notification, NotificationKind},
  post::{Comment, Like, MediaItem, Post},
  social::Follow,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision the store keeps, so values handed back
/// from a write compare equal to the same values read back later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn decode_count(n: i64) -> Result<u64> { u64::try_from(n).map_err(|_| Error::Count(n)) }

fn decode_opt<T>(s: Option<String>, f: impl Fn(&str) -> Result<T>) -> Result<Option<T>> {
  s.as_deref().map(f).transpose()
}

// ─── Accounts ────────────────────────────────────────────────────────────────

pub const ACCOUNT_COLUMNS: &str = "
  a.account_id, a.username, a.email, a.password_hash,
  a.first_name, a.last_name, a.bio, a.profile_image_url,
  a.contact_number, a.gender, a.address, a.birthday,
  a.is_public, a.deleted,
  a.deactivated, a.deactivation_start, a.deactivation_end,
  a.created_at, a.updated_at";

/// Raw values read directly from an `accounts` row selected with
/// [`ACCOUNT_COLUMNS`].
pub struct RawAccount {
  pub account_id:         String,
  pub username:           String,
  pub email:              String,
  pub password_hash:      Option<String>,
  pub first_name:         String,
  pub last_name:          String,
  pub bio:                Option<String>,
  pub profile_image_url:  Option<String>,
  pub contact_number:     Option<String>,
  pub gender:             Option<String>,
  pub address:            Option<String>,
  pub birthday:           Option<String>,
  pub is_public:          bool,
  pub deleted:            bool,
  pub deactivated:        bool,
  pub deactivation_start: Option<String>,
  pub deactivation_end:   Option<String>,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawAccount {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:         row.get(0)?,
      username:           row.get(1)?,
      email:              row.get(2)?,
      password_hash:      row.get(3)?,
      first_name:         row.get(4)?,
      last_name:          row.get(5)?,
      bio:                row.get(6)?,
      profile_image_url:  row.get(7)?,
      contact_number:     row.get(8)?,
      gender:             row.get(9)?,
      address:            row.get(10)?,
      birthday:           row.get(11)?,
      is_public:          row.get(12)?,
      deleted:            row.get(13)?,
      deactivated:        row.get(14)?,
      deactivation_start: row.get(15)?,
      deactivation_end:   row.get(16)?,
      created_at:         row.get(17)?,
      updated_at:         row.get(18)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:    decode_uuid(&self.account_id)?,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      profile:       Profile {
        first_name:        self.first_name,
        last_name:         self.last_name,
        bio:               self.bio,
        profile_image_url: self.profile_image_url,
        contact_number:    self.contact_number,
        gender:            self.gender,
        address:           self.address,
        birthday:          decode_opt(self.birthday, decode_date)?,
      },
      is_public:     self.is_public,
      deleted:       self.deleted,
      deactivation:  Deactivation {
        deactivated: self.deactivated,
        start:       decode_opt(self.deactivation_start, decode_dt)?,
        end:         decode_opt(self.deactivation_end, decode_dt)?,
      },
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Posts ───────────────────────────────────────────────────────────────────

pub const POST_COLUMNS: &str =
  "p.post_id, p.author_id, p.caption, p.media_json, p.posted_at, p.updated_at";

/// Raw values from a `posts` row. `tagged` is filled from `post_tags`
/// separately.
pub struct RawPost {
  pub post_id:    String,
  pub author_id:  String,
  pub caption:    String,
  pub media_json: String,
  pub posted_at:  String,
  pub updated_at: String,
  pub tagged:     Vec<String>,
}

impl RawPost {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:    row.get(0)?,
      author_id:  row.get(1)?,
      caption:    row.get(2)?,
      media_json: row.get(3)?,
      posted_at:  row.get(4)?,
      updated_at: row.get(5)?,
      tagged:     Vec::new(),
    })
  }

  pub fn into_post(self) -> Result<Post> {
    let media: Vec<MediaItem> = serde_json::from_str(&self.media_json)?;
    let tagged = self
      .tagged
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<Vec<_>>>()?;
    Ok(Post {
      post_id: decode_uuid(&self.post_id)?,
      author_id: decode_uuid(&self.author_id)?,
      caption: self.caption,
      media,
      tagged,
      posted_at: decode_dt(&self.posted_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub fn encode_media(media: &[MediaItem]) -> Result<String> {
  Ok(serde_json::to_string(media)?)
}

// ─── Likes and comments ──────────────────────────────────────────────────────

pub struct RawLike {
  pub like_id:    String,
  pub post_id:    String,
  pub account_id: String,
  pub liked_at:   String,
}

impl RawLike {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      like_id:    row.get(0)?,
      post_id:    row.get(1)?,
      account_id: row.get(2)?,
      liked_at:   row.get(3)?,
    })
  }

  pub fn into_like(self) -> Result<Like> {
    Ok(Like {
      like_id:    decode_uuid(&self.like_id)?,
      post_id:    decode_uuid(&self.post_id)?,
      account_id: decode_uuid(&self.account_id)?,
      liked_at:   decode_dt(&self.liked_at)?,
    })
  }
}

pub const COMMENT_COLUMNS: &str =
  "comment_id, post_id, account_id, content, commented_at, updated_at";

pub struct RawComment {
  pub comment_id:   String,
  pub post_id:      String,
  pub account_id:   String,
  pub content:      String,
  pub commented_at: String,
  pub updated_at:   String,
}

impl RawComment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:   row.get(0)?,
      post_id:      row.get(1)?,
      account_id:   row.get(2)?,
      content:      row.get(3)?,
      commented_at: row.get(4)?,
      updated_at:   row.get(5)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      comment_id:   decode_uuid(&self.comment_id)?,
      post_id:      decode_uuid(&self.post_id)?,
      account_id:   decode_uuid(&self.account_id)?,
      content:      self.content,
      commented_at: decode_dt(&self.commented_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Follows ─────────────────────────────────────────────────────────────────

pub struct RawFollow {
  pub follow_id:    String,
  pub follower_id:  String,
  pub following_id: String,
  pub created_at:   String,
}

impl RawFollow {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      follow_id:    row.get(0)?,
      follower_id:  row.get(1)?,
      following_id: row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_follow(self) -> Result<Follow> {
    Ok(Follow {
      follow_id:    decode_uuid(&self.follow_id)?,
      follower_id:  decode_uuid(&self.follower_id)?,
      following_id: decode_uuid(&self.following_id)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub const NOTIFICATION_COLUMNS: &str =
  "notification_id, recipient_id, actor_id, kind, message, post_id, read, created_at";

pub struct RawNotification {
  pub notification_id: String,
  pub recipient_id:    String,
  pub actor_id:        String,
  pub kind:            String,
  pub message:         String,
  pub post_id:         Option<String>,
  pub read:            bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      recipient_id:    row.get(1)?,
      actor_id:        row.get(2)?,
      kind:            row.get(3)?,
      message:         row.get(4)?,
      post_id:         row.get(5)?,
      read:            row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_id:    decode_uuid(&self.recipient_id)?,
      actor_id:        decode_uuid(&self.actor_id)?,
      kind:            NotificationKind::parse(&self.kind)?,
      message:         self.message,
      post_id:         decode_opt(self.post_id, decode_uuid)?,
      read:            self.read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

// ─── Goals ───────────────────────────────────────────────────────────────────

pub const GOAL_COLUMNS: &str =
  "goal_id, owner_id, description, status, target_date, created_at, updated_at";

pub struct RawGoal {
  pub goal_id:     String,
  pub owner_id:    String,
  pub description: String,
  pub status:      String,
  pub target_date: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawGoal {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      goal_id:     row.get(0)?,
      owner_id:    row.get(1)?,
      description: row.get(2)?,
      status:      row.get(3)?,
      target_date: row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_goal(self) -> Result<Goal> {
    Ok(Goal {
      goal_id:     decode_uuid(&self.goal_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      description: self.description,
      status:      GoalStatus::parse(&self.status)?,
      target_date: decode_opt(self.target_date, decode_date)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Notes ───────────────────────────────────────────────────────────────────

pub const NOTE_COLUMNS: &str =
  "note_id, owner_id, title, description, timestamp, created_at, updated_at";

pub struct RawNote {
  pub note_id:     String,
  pub owner_id:    String,
  pub title:       String,
  pub description: String,
  pub timestamp:   String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawNote {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:     row.get(0)?,
      owner_id:    row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      timestamp:   row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      note_id:     decode_uuid(&self.note_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      title:       self.title,
      description: self.description,
      timestamp:   decode_dt(&self.timestamp)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Learning ────────────────────────────────────────────────────────────────

pub const PLAN_COLUMNS: &str =
  "plan_id, owner_id, title, is_template, duration_days, subtopics_json, created_at";

pub struct RawPlan {
  pub plan_id:        String,
  pub owner_id:       String,
  pub title:          String,
  pub is_template:    bool,
  pub duration_days:  u32,
  pub subtopics_json: String,
  pub created_at:     String,
}

impl RawPlan {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      plan_id:        row.get(0)?,
      owner_id:       row.get(1)?,
      title:          row.get(2)?,
      is_template:    row.get(3)?,
      duration_days:  row.get(4)?,
      subtopics_json: row.get(5)?,
      created_at:     row.get(6)?,
    })
  }

  pub fn into_plan(self) -> Result<LearningPlan> {
    let subtopics: Vec<Subtopic> = serde_json::from_str(&self.subtopics_json)?;
    Ok(LearningPlan {
      plan_id: decode_uuid(&self.plan_id)?,
      owner_id: decode_uuid(&self.owner_id)?,
      title: self.title,
      is_template: self.is_template,
      duration_days: self.duration_days,
      subtopics,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const PROGRESS_COLUMNS: &str =
  "update_id, account_id, plan_id, title, description, media_url, created_at";

pub struct RawProgressUpdate {
  pub update_id:   String,
  pub account_id:  String,
  pub plan_id:     Option<String>,
  pub title:       String,
  pub description: String,
  pub media_url:   Option<String>,
  pub created_at:  String,
}

impl RawProgressUpdate {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      update_id:   row.get(0)?,
      account_id:  row.get(1)?,
      plan_id:     row.get(2)?,
      title:       row.get(3)?,
      description: row.get(4)?,
      media_url:   row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_update(self) -> Result<ProgressUpdate> {
    Ok(ProgressUpdate {
      update_id:   decode_uuid(&self.update_id)?,
      account_id:  decode_uuid(&self.account_id)?,
      plan_id:     decode_opt(self.plan_id, decode_uuid)?,
      title:       self.title,
      description: self.description,
      media_url:   self.media_url,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::microseconds(1);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn bad_date_is_a_parse_error() {
    assert!(matches!(decode_date("2024-13-01"), Err(Error::DateParse(_))));
  }
}
