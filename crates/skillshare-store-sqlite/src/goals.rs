//! [`GoalStore`] for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  goal::{Goal, GoalUpdate, NewGoal},
  store::GoalStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{GOAL_COLUMNS, RawGoal, encode_date, encode_dt, encode_uuid, now},
  store::SqliteStore,
};

fn select_goal(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawGoal>> {
  conn
    .query_row(
      &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE goal_id = ?1"),
      rusqlite::params![id],
      RawGoal::from_row,
    )
    .optional()
}

impl GoalStore for SqliteStore {
  async fn create_goal(&self, input: NewGoal) -> Result<Goal> {
    let at = now();
    let goal = Goal {
      goal_id:     Uuid::new_v4(),
      owner_id:    input.owner_id,
      description: input.description,
      status:      input.status,
      target_date: input.target_date,
      created_at:  at,
      updated_at:  at,
    };

    let id_str      = encode_uuid(goal.goal_id);
    let owner_str   = encode_uuid(goal.owner_id);
    let description = goal.description.clone();
    let status_str  = goal.status.as_str();
    let target_str  = goal.target_date.map(encode_date);
    let at_str      = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO goals (goal_id, owner_id, description, status, target_date, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, owner_str, description, status_str, target_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(goal)
  }

  async fn get_goal(&self, id: Uuid) -> Result<Option<Goal>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_goal(conn, &id_str)?))
      .await?;
    raw.map(RawGoal::into_goal).transpose()
  }

  async fn list_goals(&self, owner_id: Uuid) -> Result<Vec<Goal>> {
    let owner_str = encode_uuid(owner_id);
    let raws: Vec<RawGoal> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GOAL_COLUMNS} FROM goals WHERE owner_id = ?1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawGoal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawGoal::into_goal).collect()
  }

  async fn update_goal(&self, id: Uuid, update: GoalUpdate) -> Result<Option<Goal>> {
    let id_str      = encode_uuid(id);
    let description = update.description;
    let status_str  = update.status.as_str();
    let target_str  = update.target_date.map(encode_date);
    let at_str      = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE goals SET description = ?2, status = ?3, target_date = ?4, updated_at = ?5
           WHERE goal_id = ?1",
          rusqlite::params![id_str, description, status_str, target_str, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_goal(conn, &id_str)?)
      })
      .await?;

    raw.map(RawGoal::into_goal).transpose()
  }

  async fn delete_goal(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM goals WHERE goal_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }
}
