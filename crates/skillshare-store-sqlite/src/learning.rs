//! [`LearningStore`] for [`SqliteStore`]: learning plans and progress updates.

use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  learning::{LearningPlan, NewLearningPlan, NewProgressUpdate, PlanQuery, ProgressUpdate},
  page::{Page, PageRequest},
  store::LearningStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    PLAN_COLUMNS, PROGRESS_COLUMNS, RawPlan, RawProgressUpdate, decode_count, encode_dt,
    encode_uuid, now,
  },
  store::{SqliteStore, bounds},
};

fn select_plan(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawPlan>> {
  conn
    .query_row(
      &format!("SELECT {PLAN_COLUMNS} FROM learning_plans WHERE plan_id = ?1"),
      rusqlite::params![id],
      RawPlan::from_row,
    )
    .optional()
}

impl LearningStore for SqliteStore {
  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn create_plan(&self, input: NewLearningPlan) -> Result<LearningPlan> {
    let plan = LearningPlan {
      plan_id:       Uuid::new_v4(),
      owner_id:      input.owner_id,
      duration_days: input.resolved_duration()?,
      title:         input.title,
      is_template:   input.is_template,
      subtopics:     input.subtopics,
      created_at:    now(),
    };

    let id_str         = encode_uuid(plan.plan_id);
    let owner_str      = encode_uuid(plan.owner_id);
    let title          = plan.title.clone();
    let template       = plan.is_template;
    let duration       = plan.duration_days;
    let subtopics_json = serde_json::to_string(&plan.subtopics)?;
    let at_str         = encode_dt(plan.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO learning_plans (
             plan_id, owner_id, title, is_template, duration_days, subtopics_json, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, owner_str, title, template, duration, subtopics_json, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(plan)
  }

  async fn get_plan(&self, id: Uuid) -> Result<Option<LearningPlan>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_plan(conn, &id_str)?))
      .await?;
    raw.map(RawPlan::into_plan).transpose()
  }

  async fn list_plans(&self, query: PlanQuery, page: PageRequest) -> Result<Page<LearningPlan>> {
    let owner_str = query.owner.map(encode_uuid);
    let templates = query.templates_only;
    let (limit, offset) = bounds(page);

    let (raws, total): (Vec<RawPlan>, i64) = self
      .conn
      .call(move |conn| {
        const FILTER: &str = "(?1 IS NULL OR owner_id = ?1) AND (?2 = 0 OR is_template = 1)";

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM learning_plans WHERE {FILTER}"),
          rusqlite::params![owner_str, templates],
          |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {PLAN_COLUMNS} FROM learning_plans
           WHERE {FILTER}
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str, templates, limit, offset], RawPlan::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawPlan::into_plan)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, decode_count(total)?, page))
  }

  async fn set_subtopic_completed(
    &self,
    plan_id: Uuid,
    index: usize,
    completed: bool,
  ) -> Result<Option<LearningPlan>> {
    let id_str = encode_uuid(plan_id);
    let Ok(index) = i64::try_from(index) else {
      return Ok(None);
    };

    let raw = self
      .conn
      .call(move |conn| {
        // Patched in place; an out-of-range index matches no row.
        let changed = conn.execute(
          "UPDATE learning_plans
           SET subtopics_json = json_set(
             subtopics_json,
             '$[' || ?2 || '].completed',
             CASE WHEN ?3 THEN json('true') ELSE json('false') END
           )
           WHERE plan_id = ?1 AND ?2 < json_array_length(subtopics_json)",
          rusqlite::params![id_str, index, completed],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_plan(conn, &id_str)?)
      })
      .await?;

    raw.map(RawPlan::into_plan).transpose()
  }

  async fn delete_plan(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM learning_plans WHERE plan_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Progress updates ──────────────────────────────────────────────────────

  async fn add_progress_update(&self, input: NewProgressUpdate) -> Result<ProgressUpdate> {
    let update = ProgressUpdate {
      update_id:   Uuid::new_v4(),
      account_id:  input.account_id,
      plan_id:     input.plan_id,
      title:       input.title,
      description: input.description,
      media_url:   input.media_url,
      created_at:  now(),
    };

    let id_str      = encode_uuid(update.update_id);
    let account_str = encode_uuid(update.account_id);
    let plan_str    = update.plan_id.map(encode_uuid);
    let title       = update.title.clone();
    let description = update.description.clone();
    let media_url   = update.media_url.clone();
    let at_str      = encode_dt(update.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO progress_updates (
             update_id, account_id, plan_id, title, description, media_url, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, account_str, plan_str, title, description, media_url, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(update)
  }

  async fn get_progress_update(&self, id: Uuid) -> Result<Option<ProgressUpdate>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawProgressUpdate> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROGRESS_COLUMNS} FROM progress_updates WHERE update_id = ?1"),
              rusqlite::params![id_str],
              RawProgressUpdate::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProgressUpdate::into_update).transpose()
  }

  async fn list_progress_updates(
    &self,
    account_id: Uuid,
    page: PageRequest,
  ) -> Result<Page<ProgressUpdate>> {
    let account_str = encode_uuid(account_id);
    let (limit, offset) = bounds(page);

    let (raws, total): (Vec<RawProgressUpdate>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM progress_updates WHERE account_id = ?1",
          rusqlite::params![account_str],
          |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROGRESS_COLUMNS} FROM progress_updates
           WHERE account_id = ?1
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![account_str, limit, offset], RawProgressUpdate::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawProgressUpdate::into_update)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, decode_count(total)?, page))
  }

  async fn delete_progress_update(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM progress_updates WHERE update_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
