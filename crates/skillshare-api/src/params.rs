//! Query-string parameters shared by list endpoints.
//!
//! Each struct spells out `limit`/`offset` itself: `serde(flatten)` does not
//! survive `serde_urlencoded` for numeric fields.

use serde::Deserialize;
use skillshare_core::{learning::PlanQuery, page::PageRequest};
use uuid::Uuid;

/// `?limit=&offset=`
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub limit:  Option<u32>,
  pub offset: Option<u32>,
}

impl PageParams {
  pub fn page(&self) -> PageRequest { PageRequest::new(self.limit, self.offset) }
}

/// `GET /notifications[?unread_only=true]`
#[derive(Debug, Default, Deserialize)]
pub struct NotificationParams {
  #[serde(default)]
  pub unread_only: bool,
  pub limit:       Option<u32>,
  pub offset:      Option<u32>,
}

impl NotificationParams {
  pub fn page(&self) -> PageRequest { PageRequest::new(self.limit, self.offset) }
}

/// `GET /plans[?templates=true][&owner=<id>]`
#[derive(Debug, Default, Deserialize)]
pub struct PlanParams {
  #[serde(default)]
  pub templates: bool,
  pub owner:     Option<Uuid>,
  pub limit:     Option<u32>,
  pub offset:    Option<u32>,
}

impl PlanParams {
  pub fn query(&self) -> PlanQuery {
    PlanQuery { owner: self.owner, templates_only: self.templates }
  }

  pub fn page(&self) -> PageRequest { PageRequest::new(self.limit, self.offset) }
}

/// `GET /progress[?account_id=<id>]`
#[derive(Debug, Default, Deserialize)]
pub struct ProgressParams {
  pub account_id: Option<Uuid>,
  pub limit:      Option<u32>,
  pub offset:     Option<u32>,
}

impl ProgressParams {
  pub fn page(&self) -> PageRequest { PageRequest::new(self.limit, self.offset) }
}
