//! Learning plans and the progress updates posted against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Plans ───────────────────────────────────────────────────────────────────

/// One step of a plan. Stored inline with the plan, addressed by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
  pub name:          String,
  #[serde(default)]
  pub description:   Option<String>,
  #[serde(default)]
  pub duration_days: u32,
  #[serde(default)]
  pub resource:      Option<String>,
  #[serde(default)]
  pub completed:     bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPlan {
  pub plan_id:       Uuid,
  pub owner_id:      Uuid,
  pub title:         String,
  /// Templates are listed for everyone to copy from.
  pub is_template:   bool,
  pub duration_days: u32,
  pub subtopics:     Vec<Subtopic>,
  pub created_at:    DateTime<Utc>,
}

impl LearningPlan {
  /// Fraction of subtopics completed, in `0.0..=1.0`. Zero for an empty plan.
  pub fn progress(&self) -> f64 {
    if self.subtopics.is_empty() {
      return 0.0;
    }
    let done = self.subtopics.iter().filter(|s| s.completed).count();
    done as f64 / self.subtopics.len() as f64
  }
}

/// Input to [`crate::store::LearningStore::create_plan`].
#[derive(Debug, Clone)]
pub struct NewLearningPlan {
  pub owner_id:      Uuid,
  pub title:         String,
  pub is_template:   bool,
  pub duration_days: Option<u32>,
  pub subtopics:     Vec<Subtopic>,
}

impl NewLearningPlan {
  /// The explicit duration, or the sum of the subtopic durations.
  pub fn resolved_duration(&self) -> Result<u32> {
    if let Some(days) = self.duration_days {
      return Ok(days);
    }
    self
      .subtopics
      .iter()
      .try_fold(0u32, |acc, s| acc.checked_add(s.duration_days))
      .ok_or(Error::DurationOverflow)
  }
}

/// Filter for [`crate::store::LearningStore::list_plans`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanQuery {
  pub owner:          Option<Uuid>,
  pub templates_only: bool,
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
  pub update_id:   Uuid,
  pub account_id:  Uuid,
  pub plan_id:     Option<Uuid>,
  pub title:       String,
  pub description: String,
  pub media_url:   Option<String>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProgressUpdate {
  pub account_id:  Uuid,
  pub plan_id:     Option<Uuid>,
  pub title:       String,
  pub description: String,
  pub media_url:   Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn topic(name: &str, days: u32, completed: bool) -> Subtopic {
    Subtopic {
      name: name.into(),
      description: None,
      duration_days: days,
      resource: None,
      completed,
    }
  }

  #[test]
  fn duration_defaults_to_subtopic_sum() {
    let mut plan = NewLearningPlan {
      owner_id:      Uuid::new_v4(),
      title:         "Rust in a month".into(),
      is_template:   false,
      duration_days: None,
      subtopics:     vec![topic("ownership", 7, false), topic("traits", 5, false)],
    };
    assert_eq!(plan.resolved_duration().unwrap(), 12);

    plan.duration_days = Some(30);
    assert_eq!(plan.resolved_duration().unwrap(), 30);
  }

  #[test]
  fn oversized_subtopic_durations_are_rejected() {
    let mut plan = NewLearningPlan {
      owner_id:      Uuid::new_v4(),
      title:         "Forever".into(),
      is_template:   false,
      duration_days: None,
      subtopics:     vec![topic("a", 4_000_000_000, false), topic("b", 4_000_000_000, false)],
    };
    assert!(matches!(plan.resolved_duration(), Err(Error::DurationOverflow)));

    plan.duration_days = Some(90);
    assert_eq!(plan.resolved_duration().unwrap(), 90);
  }

  #[test]
  fn progress_counts_completed_subtopics() {
    let mut plan = LearningPlan {
      plan_id:       Uuid::new_v4(),
      owner_id:      Uuid::new_v4(),
      title:         "Knots".into(),
      is_template:   false,
      duration_days: 3,
      subtopics:     vec![],
      created_at:    Utc::now(),
    };
    assert_eq!(plan.progress(), 0.0);

    plan.subtopics = vec![topic("bowline", 1, true), topic("hitch", 1, false)];
    assert_eq!(plan.progress(), 0.5);
  }
}
