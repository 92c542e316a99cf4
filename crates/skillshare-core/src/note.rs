//! Private study notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
  pub note_id:     Uuid,
  pub owner_id:    Uuid,
  pub title:       String,
  pub description: String,
  /// When the note is about; chosen by the owner, not the write time.
  pub timestamp:   DateTime<Utc>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::NoteStore::create_note`].
#[derive(Debug, Clone)]
pub struct NewNote {
  pub owner_id:    Uuid,
  pub title:       String,
  pub description: String,
  pub timestamp:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NoteUpdate {
  pub title:       String,
  pub description: String,
  pub timestamp:   DateTime<Utc>,
}
