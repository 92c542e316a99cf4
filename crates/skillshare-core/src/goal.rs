//! Personal goals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GoalStatus {
  #[default]
  NotStarted,
  InProgress,
  Completed,
}

impl GoalStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownDiscriminant {
      kind:  "goal status",
      value: s.to_owned(),
    })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
  pub goal_id:     Uuid,
  pub owner_id:    Uuid,
  pub description: String,
  pub status:      GoalStatus,
  pub target_date: Option<NaiveDate>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::GoalStore::create_goal`].
#[derive(Debug, Clone)]
pub struct NewGoal {
  pub owner_id:    Uuid,
  pub description: String,
  pub status:      GoalStatus,
  pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct GoalUpdate {
  pub description: String,
  pub status:      GoalStatus,
  pub target_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_strings() {
    assert_eq!(GoalStatus::default(), GoalStatus::NotStarted);
    assert_eq!(GoalStatus::InProgress.as_str(), "in_progress");
    assert_eq!(GoalStatus::parse("completed").unwrap(), GoalStatus::Completed);
    assert!(GoalStatus::parse("COMPLETED").is_err());
  }
}
