//! Store traits.
//!
//! Storage backends (e.g. `skillshare-store-sqlite`) implement these; the API
//! layer depends only on the traits. The surface is split per aggregate so
//! that code which only needs accounts (the deactivation evaluator, for one)
//! can ask for exactly that.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, NewAccount, ProfileUpdate},
  deactivation::Deactivation,
  goal::{Goal, GoalUpdate, NewGoal},
  learning::{LearningPlan, NewLearningPlan, NewProgressUpdate, PlanQuery, ProgressUpdate},
  note::{NewNote, Note, NoteUpdate},
  notification::{NewNotification, Notification},
  page::{Page, PageRequest},
  post::{Comment, Engagement, Like, NewPost, Post, PostUpdate},
  social::{Follow, FollowCounts},
};

/// The error type shared by every trait a backend implements.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

pub trait AccountStore: Store {
  /// Persist a new account. Fails if the username or email is taken.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Look up an account by id, soft-deleted ones included. Callers decide
  /// what a deleted account means to them.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Exact, case-sensitive username match. Soft-deleted accounts included.
  fn find_account_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Case-insensitive email match. Soft-deleted accounts included.
  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Live accounts ordered by username.
  fn list_accounts(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Account>, Self::Error>> + Send + '_;

  /// Batch lookup; missing ids are skipped, order is unspecified.
  fn get_accounts<'a>(
    &'a self,
    ids: &'a [Uuid],
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + 'a;

  fn update_profile(
    &self,
    id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Soft delete. Returns `false` if the account is unknown or already
  /// deleted.
  fn mark_deleted(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Overwrite the deactivation fields.
  fn set_deactivation(
    &self,
    id: Uuid,
    deactivation: Deactivation,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Reset the flag and both dates. Idempotent.
  fn clear_deactivation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;
}

// ─── Posts ───────────────────────────────────────────────────────────────────

pub trait PostStore: Store {
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// All posts, newest first.
  fn list_posts(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Post>, Self::Error>> + Send + '_;

  /// One author's posts, newest first.
  fn list_posts_by_author(
    &self,
    author_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Post>, Self::Error>> + Send + '_;

  fn update_post(
    &self,
    id: Uuid,
    update: PostUpdate,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete a post together with its likes, comments, reposts, tags and
  /// notifications, atomically. Returns `false` if the post was unknown.
  fn delete_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `true` only when a new repost row was written.
  fn add_repost(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn remove_repost(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Counts and flags for `post_id` as seen by `viewer`.
  fn post_engagement(
    &self,
    post_id: Uuid,
    viewer: Uuid,
  ) -> impl Future<Output = Result<Engagement, Self::Error>> + Send + '_;
}

// ─── Likes and comments ──────────────────────────────────────────────────────

pub trait EngagementStore: Store {
  fn find_like(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<Like>, Self::Error>> + Send + '_;

  /// `None` if the account already likes the post.
  fn add_like(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<Like>, Self::Error>> + Send + '_;

  fn remove_like(
    &self,
    post_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_likes(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn add_comment(
    &self,
    post_id: Uuid,
    account_id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Comments on a post, newest first.
  fn list_comments(
    &self,
    post_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Comment>, Self::Error>> + Send + '_;

  fn update_comment(
    &self,
    id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Follows ─────────────────────────────────────────────────────────────────

pub trait SocialStore: Store {
  /// `None` if the pair already exists. Fails on a self-follow.
  fn follow(
    &self,
    follower_id: Uuid,
    following_id: Uuid,
  ) -> impl Future<Output = Result<Option<Follow>, Self::Error>> + Send + '_;

  fn find_follow(
    &self,
    follower_id: Uuid,
    following_id: Uuid,
  ) -> impl Future<Output = Result<Option<Follow>, Self::Error>> + Send + '_;

  fn unfollow(
    &self,
    follower_id: Uuid,
    following_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Live accounts following `account_id`, most recent first.
  fn list_followers(
    &self,
    account_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Account>, Self::Error>> + Send + '_;

  /// Live accounts `account_id` follows, most recent first.
  fn list_following(
    &self,
    account_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Account>, Self::Error>> + Send + '_;

  fn follow_counts(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<FollowCounts, Self::Error>> + Send + '_;
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub trait NotificationStore: Store {
  fn create_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// A recipient's notifications, newest first.
  fn list_notifications(
    &self,
    recipient_id: Uuid,
    unread_only: bool,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Notification>, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  fn mark_notification_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  fn delete_notification(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Goals ───────────────────────────────────────────────────────────────────

pub trait GoalStore: Store {
  fn create_goal(
    &self,
    input: NewGoal,
  ) -> impl Future<Output = Result<Goal, Self::Error>> + Send + '_;

  fn get_goal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + '_;

  /// An owner's goals, oldest first.
  fn list_goals(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Goal>, Self::Error>> + Send + '_;

  fn update_goal(
    &self,
    id: Uuid,
    update: GoalUpdate,
  ) -> impl Future<Output = Result<Option<Goal>, Self::Error>> + Send + '_;

  fn delete_goal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Learning ────────────────────────────────────────────────────────────────

pub trait LearningStore: Store {
  /// `duration_days` is resolved from the subtopics when not supplied.
  fn create_plan(
    &self,
    input: NewLearningPlan,
  ) -> impl Future<Output = Result<LearningPlan, Self::Error>> + Send + '_;

  fn get_plan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<LearningPlan>, Self::Error>> + Send + '_;

  /// Plans matching `query`, newest first.
  fn list_plans(
    &self,
    query: PlanQuery,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<LearningPlan>, Self::Error>> + Send + '_;

  /// Flip one subtopic's completion flag in a single read-modify-write.
  /// `None` if the plan is unknown or `index` is out of range.
  fn set_subtopic_completed(
    &self,
    plan_id: Uuid,
    index: usize,
    completed: bool,
  ) -> impl Future<Output = Result<Option<LearningPlan>, Self::Error>> + Send + '_;

  fn delete_plan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn add_progress_update(
    &self,
    input: NewProgressUpdate,
  ) -> impl Future<Output = Result<ProgressUpdate, Self::Error>> + Send + '_;

  fn get_progress_update(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ProgressUpdate>, Self::Error>> + Send + '_;

  /// An account's updates, newest first.
  fn list_progress_updates(
    &self,
    account_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<ProgressUpdate>, Self::Error>> + Send + '_;

  fn delete_progress_update(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Notes ───────────────────────────────────────────────────────────────────

pub trait NoteStore: Store {
  fn create_note(
    &self,
    input: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  fn get_note(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  /// An owner's notes, most recent `timestamp` first.
  fn list_notes(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  fn update_note(
    &self,
    id: Uuid,
    update: NoteUpdate,
  ) -> impl Future<Output = Result<Option<Note>, Self::Error>> + Send + '_;

  fn delete_note(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Everything ──────────────────────────────────────────────────────────────

/// A backend that implements every store trait.
pub trait PlatformStore:
  AccountStore
  + PostStore
  + EngagementStore
  + SocialStore
  + NotificationStore
  + GoalStore
  + LearningStore
  + NoteStore
{
}

impl<T> PlatformStore for T where
  T: AccountStore
    + PostStore
    + EngagementStore
    + SocialStore
    + NotificationStore
    + GoalStore
    + LearningStore
    + NoteStore
{
}
