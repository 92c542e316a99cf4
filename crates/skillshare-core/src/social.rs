//! The follow graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `follower_id` follows `following_id`. At most one per ordered pair, and
/// never a self-loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
  pub follow_id:    Uuid,
  pub follower_id:  Uuid,
  pub following_id: Uuid,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
  pub followers: u64,
  pub following: u64,
}
