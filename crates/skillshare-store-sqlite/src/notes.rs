//! [`NoteStore`] for [`SqliteStore`].

use chrono::SubsecRound as _;
use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  note::{NewNote, Note, NoteUpdate},
  store::NoteStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{NOTE_COLUMNS, RawNote, encode_dt, encode_uuid, now},
  store::SqliteStore,
};

fn select_note(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawNote>> {
  conn
    .query_row(
      &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE note_id = ?1"),
      rusqlite::params![id],
      RawNote::from_row,
    )
    .optional()
}

impl NoteStore for SqliteStore {
  async fn create_note(&self, input: NewNote) -> Result<Note> {
    let at = now();
    let note = Note {
      note_id:     Uuid::new_v4(),
      owner_id:    input.owner_id,
      title:       input.title,
      description: input.description,
      timestamp:   input.timestamp.trunc_subsecs(6),
      created_at:  at,
      updated_at:  at,
    };

    let id_str      = encode_uuid(note.note_id);
    let owner_str   = encode_uuid(note.owner_id);
    let title       = note.title.clone();
    let description = note.description.clone();
    let stamp_str   = encode_dt(note.timestamp);
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notes (note_id, owner_id, title, description, timestamp, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, owner_str, title, description, stamp_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(note)
  }

  async fn get_note(&self, id: Uuid) -> Result<Option<Note>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_note(conn, &id_str)?))
      .await?;
    raw.map(RawNote::into_note).transpose()
  }

  async fn list_notes(&self, owner_id: Uuid) -> Result<Vec<Note>> {
    let owner_str = encode_uuid(owner_id);
    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ?1
           ORDER BY timestamp DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawNote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawNote::into_note).collect()
  }

  async fn update_note(&self, id: Uuid, update: NoteUpdate) -> Result<Option<Note>> {
    let id_str      = encode_uuid(id);
    let title       = update.title;
    let description = update.description;
    let stamp_str   = encode_dt(update.timestamp.trunc_subsecs(6));
    let at_str      = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE notes SET title = ?2, description = ?3, timestamp = ?4, updated_at = ?5
           WHERE note_id = ?1",
          rusqlite::params![id_str, title, description, stamp_str, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_note(conn, &id_str)?)
      })
      .await?;

    raw.map(RawNote::into_note).transpose()
  }

  async fn delete_note(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM notes WHERE note_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }
}
