//! Notifications raised for a post's author when others engage with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, post::Post};

/// What the actor did to the recipient's post.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  Like,
  Comment,
  Share,
}

impl NotificationKind {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownDiscriminant {
      kind:  "notification kind",
      value: s.to_owned(),
    })
  }

  /// Human-readable line shown to the recipient.
  pub fn message(self, actor_name: &str) -> String {
    match self {
      Self::Like => format!("{actor_name} liked your post"),
      Self::Comment => format!("{actor_name} commented on your post"),
      Self::Share => format!("{actor_name} shared your post"),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient_id:    Uuid,
  pub actor_id:        Uuid,
  pub kind:            NotificationKind,
  pub message:         String,
  pub post_id:         Option<Uuid>,
  pub read:            bool,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::NotificationStore::create_notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
  pub recipient_id: Uuid,
  pub actor_id:     Uuid,
  pub kind:         NotificationKind,
  pub message:      String,
  pub post_id:      Option<Uuid>,
}

/// Build the notification owed to `post`'s author for an interaction by
/// `actor_id`, or `None` when the author is acting on their own post.
pub fn fan_out(
  kind:       NotificationKind,
  actor_id:   Uuid,
  actor_name: &str,
  post:       &Post,
) -> Option<NewNotification> {
  if actor_id == post.author_id {
    return None;
  }
  Some(NewNotification {
    recipient_id: post.author_id,
    actor_id,
    kind,
    message: kind.message(actor_name),
    post_id: Some(post.post_id),
  })
}
