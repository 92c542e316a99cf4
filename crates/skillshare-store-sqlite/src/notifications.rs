//! [`NotificationStore`] for [`SqliteStore`].

use rusqlite::{Connection, OptionalExtension as _};
use skillshare_core::{
  notification::{NewNotification, Notification},
  page::{Page, PageRequest},
  store::NotificationStore,
};
use uuid::Uuid;

use crate::{
  Result,
  encode::{NOTIFICATION_COLUMNS, RawNotification, decode_count, encode_dt, encode_uuid, now},
  store::{SqliteStore, bounds},
};

fn select_notification(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawNotification>> {
  conn
    .query_row(
      &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notification_id = ?1"),
      rusqlite::params![id],
      RawNotification::from_row,
    )
    .optional()
}

impl NotificationStore for SqliteStore {
  async fn create_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      recipient_id:    input.recipient_id,
      actor_id:        input.actor_id,
      kind:            input.kind,
      message:         input.message,
      post_id:         input.post_id,
      read:            false,
      created_at:      now(),
    };

    let id_str        = encode_uuid(notification.notification_id);
    let recipient_str = encode_uuid(notification.recipient_id);
    let actor_str     = encode_uuid(notification.actor_id);
    let kind_str      = notification.kind.as_str();
    let message       = notification.message.clone();
    let post_str      = notification.post_id.map(encode_uuid);
    let at_str        = encode_dt(notification.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_id, recipient_id, actor_id, kind, message, post_id, read, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
          rusqlite::params![id_str, recipient_str, actor_str, kind_str, message, post_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn list_notifications(
    &self,
    recipient_id: Uuid,
    unread_only: bool,
    page: PageRequest,
  ) -> Result<Page<Notification>> {
    let recipient_str = encode_uuid(recipient_id);
    let (limit, offset) = bounds(page);

    let (raws, total): (Vec<RawNotification>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM notifications
           WHERE recipient_id = ?1 AND (?2 = 0 OR read = 0)",
          rusqlite::params![recipient_str, unread_only],
          |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE recipient_id = ?1 AND (?2 = 0 OR read = 0)
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![recipient_str, unread_only, limit, offset],
            RawNotification::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, decode_count(total)?, page))
  }

  async fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(select_notification(conn, &id_str)?))
      .await?;
    raw.map(RawNotification::into_notification).transpose()
  }

  async fn mark_notification_read(&self, id: Uuid) -> Result<Option<Notification>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE notifications SET read = 1 WHERE notification_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(select_notification(conn, &id_str)?)
      })
      .await?;
    raw.map(RawNotification::into_notification).transpose()
  }

  async fn delete_notification(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications WHERE notification_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}
