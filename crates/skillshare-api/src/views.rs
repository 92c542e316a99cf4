//! Response bodies.
//!
//! Domain types carry fields that must not cross the wire (password hashes,
//! deactivation dates) or lack fields a client wants alongside them (author
//! summaries, engagement counts). These views bridge the two.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use skillshare_core::{
  account::{Account, AccountSummary},
  learning::LearningPlan,
  post::{Comment, MediaItem, Post},
  store::{AccountStore, PostStore},
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Accounts ─────────────────────────────────────────────────────────────────

/// Public profile. The deactivation window collapses to a single flag.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
  pub account_id:        Uuid,
  pub username:          String,
  pub email:             String,
  pub first_name:        String,
  pub last_name:         String,
  pub bio:               Option<String>,
  pub profile_image_url: Option<String>,
  pub contact_number:    Option<String>,
  pub gender:            Option<String>,
  pub address:           Option<String>,
  pub birthday:          Option<NaiveDate>,
  pub is_public:         bool,
  pub deactivated:       bool,
  pub created_at:        DateTime<Utc>,
}

impl From<&Account> for ProfileView {
  fn from(a: &Account) -> Self {
    let p = &a.profile;
    Self {
      account_id:        a.account_id,
      username:          a.username.clone(),
      email:             a.email.clone(),
      first_name:        p.first_name.clone(),
      last_name:         p.last_name.clone(),
      bio:               p.bio.clone(),
      profile_image_url: p.profile_image_url.clone(),
      contact_number:    p.contact_number.clone(),
      gender:            p.gender.clone(),
      address:           p.address.clone(),
      birthday:          p.birthday,
      is_public:         a.is_public,
      deactivated:       a.deactivation.deactivated,
      created_at:        a.created_at,
    }
  }
}

// ─── Posts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
  pub post_id:         Uuid,
  pub author:          AccountSummary,
  pub caption:         String,
  pub media:           Vec<MediaItem>,
  pub tagged:          Vec<AccountSummary>,
  pub posted_at:       DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  pub like_count:      u64,
  pub comment_count:   u64,
  pub liked_by_caller: bool,
  pub reposted_by:     Vec<AccountSummary>,
}

/// Resolve `ids` to summaries in one store call.
async fn summaries<S: AccountStore>(
  store: &S,
  ids: &[Uuid],
) -> Result<HashMap<Uuid, AccountSummary>, ApiError> {
  let accounts = store.get_accounts(ids).await.map_err(ApiError::store)?;
  Ok(
    accounts
      .iter()
      .map(|a| (a.account_id, AccountSummary::from(a)))
      .collect(),
  )
}

/// Stand-in for an author row that has gone missing.
fn unknown_summary(account_id: Uuid) -> AccountSummary {
  AccountSummary {
    account_id,
    username: String::new(),
    first_name: String::new(),
    last_name: String::new(),
    profile_image_url: None,
  }
}

/// Assemble a [`PostView`] as seen by `viewer`.
pub async fn post_view<S>(store: &S, post: Post, viewer: Uuid) -> Result<PostView, ApiError>
where
  S: AccountStore + PostStore,
{
  let mut ids = post.tagged.clone();
  ids.push(post.author_id);
  let mut people = summaries(store, &ids).await?;

  let engagement = store
    .post_engagement(post.post_id, viewer)
    .await
    .map_err(ApiError::store)?;

  let author = people
    .remove(&post.author_id)
    .unwrap_or_else(|| unknown_summary(post.author_id));
  let tagged = post
    .tagged
    .iter()
    .filter_map(|id| people.get(id).cloned())
    .collect();

  Ok(PostView {
    post_id: post.post_id,
    author,
    caption: post.caption,
    media: post.media,
    tagged,
    posted_at: post.posted_at,
    updated_at: post.updated_at,
    like_count: engagement.like_count,
    comment_count: engagement.comment_count,
    liked_by_caller: engagement.liked_by_viewer,
    reposted_by: engagement.reposted_by,
  })
}

pub async fn post_views<S>(
  store: &S,
  posts: Vec<Post>,
  viewer: Uuid,
) -> Result<Vec<PostView>, ApiError>
where
  S: AccountStore + PostStore,
{
  let mut views = Vec::with_capacity(posts.len());
  for post in posts {
    views.push(post_view(store, post, viewer).await?);
  }
  Ok(views)
}

// ─── Likes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeStatus {
  pub liked:      bool,
  pub like_count: u64,
}

// ─── Comments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
  pub comment_id:   Uuid,
  pub post_id:      Uuid,
  pub author:       AccountSummary,
  pub content:      String,
  pub commented_at: DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

pub async fn comment_views<S: AccountStore>(
  store: &S,
  comments: Vec<Comment>,
) -> Result<Vec<CommentView>, ApiError> {
  let mut ids: Vec<Uuid> = comments.iter().map(|c| c.account_id).collect();
  ids.sort_unstable();
  ids.dedup();
  let people = summaries(store, &ids).await?;

  Ok(
    comments
      .into_iter()
      .map(|c| CommentView {
        author:       people
          .get(&c.account_id)
          .cloned()
          .unwrap_or_else(|| unknown_summary(c.account_id)),
        comment_id:   c.comment_id,
        post_id:      c.post_id,
        content:      c.content,
        commented_at: c.commented_at,
        updated_at:   c.updated_at,
      })
      .collect(),
  )
}

pub async fn comment_view<S: AccountStore>(
  store: &S,
  comment: Comment,
) -> Result<CommentView, ApiError> {
  comment_views(store, vec![comment])
    .await?
    .pop()
    .ok_or_else(|| ApiError::Internal("comment view vanished".into()))
}

// ─── Plans ────────────────────────────────────────────────────────────────────

/// A plan plus its completion ratio in `[0, 1]`.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
  #[serde(flatten)]
  pub plan:     LearningPlan,
  pub progress: f64,
}

impl From<LearningPlan> for PlanView {
  fn from(plan: LearningPlan) -> Self {
    let progress = plan.progress();
    Self { plan, progress }
  }
}
