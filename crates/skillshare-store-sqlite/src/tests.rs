//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use skillshare_core::{
  account::{Account, NewAccount, Profile, ProfileUpdate},
  deactivation::{self, Deactivation},
  goal::{GoalStatus, GoalUpdate, NewGoal},
  learning::{NewLearningPlan, NewProgressUpdate, PlanQuery, Subtopic},
  note::{NewNote, NoteUpdate},
  notification::{NewNotification, NotificationKind},
  page::PageRequest,
  post::{MediaItem, NewPost, PostUpdate},
  store::{
    AccountStore, EngagementStore, GoalStore, LearningStore, NoteStore, NotificationStore,
    PostStore, SocialStore,
  },
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn account(s: &SqliteStore, username: &str) -> Account {
  s.create_account(NewAccount {
    username:      username.into(),
    email:         format!("{username}@example.com"),
    password_hash: Some("$argon2id$placeholder".into()),
    profile:       Profile {
      first_name: username.to_uppercase(),
      last_name: "Tester".into(),
      ..Profile::default()
    },
    is_public:     true,
  })
  .await
  .unwrap()
}

async fn post(s: &SqliteStore, author: Uuid, caption: &str) -> skillshare_core::post::Post {
  s.create_post(NewPost {
    author_id: author,
    caption:   caption.into(),
    media:     vec![],
    tagged:    vec![],
  })
  .await
  .unwrap()
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_account() {
  let s = store().await;
  let ada = account(&s, "ada").await;

  let by_id = s.get_account(ada.account_id).await.unwrap().unwrap();
  assert_eq!(by_id.username, "ada");
  assert_eq!(by_id.profile.first_name, "ADA");
  assert_eq!(by_id.created_at, ada.created_at);
  assert!(!by_id.deactivation.deactivated);

  let by_name = s.find_account_by_username("ada").await.unwrap().unwrap();
  assert_eq!(by_name.account_id, ada.account_id);

  let by_email = s.find_account_by_email("ADA@Example.com").await.unwrap().unwrap();
  assert_eq!(by_email.account_id, ada.account_id);

  assert!(s.find_account_by_username("grace").await.unwrap().is_none());
  assert!(s.get_account(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  account(&s, "ada").await;

  let dup = s
    .create_account(NewAccount {
      username:      "ada".into(),
      email:         "other@example.com".into(),
      password_hash: None,
      profile:       Profile::default(),
      is_public:     true,
    })
    .await;
  assert!(dup.is_err());
}

#[tokio::test]
async fn update_profile_keeps_hash_unless_given() {
  let s = store().await;
  let ada = account(&s, "ada").await;

  let mut profile = ada.profile.clone();
  profile.bio = Some("mathematician".into());
  let updated = s
    .update_profile(ada.account_id, ProfileUpdate {
      profile,
      is_public: false,
      password_hash: None,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.profile.bio.as_deref(), Some("mathematician"));
  assert!(!updated.is_public);
  assert_eq!(updated.password_hash, ada.password_hash);

  let rehashed = s
    .update_profile(ada.account_id, ProfileUpdate {
      profile:       updated.profile.clone(),
      is_public:     true,
      password_hash: Some("$argon2id$new".into()),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(rehashed.password_hash.as_deref(), Some("$argon2id$new"));

  let missing = s
    .update_profile(Uuid::new_v4(), ProfileUpdate {
      profile:       Profile::default(),
      is_public:     true,
      password_hash: None,
    })
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn soft_deleted_accounts_leave_listings() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  account(&s, "grace").await;
  account(&s, "linus").await;

  assert!(s.mark_deleted(ada.account_id).await.unwrap());
  assert!(!s.mark_deleted(ada.account_id).await.unwrap());

  let page = s.list_accounts(PageRequest::new(Some(1), Some(0))).await.unwrap();
  assert_eq!(page.total, 2);
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.items[0].username, "grace");

  let fetched = s.get_account(ada.account_id).await.unwrap().unwrap();
  assert!(fetched.deleted);
}

#[tokio::test]
async fn deactivation_round_trips_and_clears() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let start = Utc::now() - Duration::hours(2);
  let end = Utc::now() - Duration::hours(1);

  let d = s
    .set_deactivation(ada.account_id, Deactivation::window(start, Some(end)))
    .await
    .unwrap()
    .unwrap();
  assert!(d.deactivation.deactivated);
  assert_eq!(d.deactivation.start.map(|t| t.timestamp_micros()), Some(start.timestamp_micros()));

  let cleared = s.clear_deactivation(ada.account_id).await.unwrap().unwrap();
  assert_eq!(cleared.deactivation, Deactivation::default());

  // Clearing twice is harmless.
  let again = s.clear_deactivation(ada.account_id).await.unwrap().unwrap();
  assert_eq!(again.deactivation, Deactivation::default());
}

#[tokio::test]
async fn reconcile_persists_through_store() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let now = Utc::now();

  let lapsed = s
    .set_deactivation(
      ada.account_id,
      Deactivation::window(now - Duration::days(3), Some(now - Duration::days(1))),
    )
    .await
    .unwrap()
    .unwrap();

  let reconciled = deactivation::reconcile_if_expired(&s, lapsed, now).await.unwrap();
  assert!(!reconciled.deactivation.deactivated);

  let stored = s.get_account(ada.account_id).await.unwrap().unwrap();
  assert_eq!(stored.deactivation, Deactivation::default());
}

#[tokio::test]
async fn get_accounts_skips_unknown_ids() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;

  let found = s
    .get_accounts(&[ada.account_id, Uuid::new_v4(), grace.account_id])
    .await
    .unwrap();
  assert_eq!(found.len(), 2);
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_round_trip_with_media_and_tags() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;

  let created = s
    .create_post(NewPost {
      author_id: ada.account_id,
      caption:   "analytical engine notes".into(),
      media:     vec![MediaItem { url: "https://cdn/x.png".into(), media_type: "image/png".into() }],
      tagged:    vec![grace.account_id],
    })
    .await
    .unwrap();

  let fetched = s.get_post(created.post_id).await.unwrap().unwrap();
  assert_eq!(fetched.caption, "analytical engine notes");
  assert_eq!(fetched.media, created.media);
  assert_eq!(fetched.tagged, vec![grace.account_id]);

  let updated = s
    .update_post(created.post_id, PostUpdate {
      caption: "edited".into(),
      media:   vec![],
      tagged:  vec![],
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.caption, "edited");
  assert!(updated.tagged.is_empty());
  assert!(updated.media.is_empty());
}

#[tokio::test]
async fn posts_list_newest_first_with_totals() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;

  post(&s, ada.account_id, "first").await;
  post(&s, grace.account_id, "second").await;
  post(&s, ada.account_id, "third").await;

  let all = s.list_posts(PageRequest::default()).await.unwrap();
  assert_eq!(all.total, 3);
  let captions: Vec<_> = all.items.iter().map(|p| p.caption.as_str()).collect();
  assert_eq!(captions, ["third", "second", "first"]);

  let by_ada = s
    .list_posts_by_author(ada.account_id, PageRequest::new(Some(1), Some(1)))
    .await
    .unwrap();
  assert_eq!(by_ada.total, 2);
  assert_eq!(by_ada.items.len(), 1);
  assert_eq!(by_ada.items[0].caption, "first");
}

#[tokio::test]
async fn delete_post_cascades_to_dependents() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;
  let p = post(&s, ada.account_id, "doomed").await;

  s.add_like(p.post_id, grace.account_id).await.unwrap();
  s.add_comment(p.post_id, grace.account_id, "nice".into()).await.unwrap();
  s.add_repost(p.post_id, grace.account_id).await.unwrap();
  s.create_notification(NewNotification {
    recipient_id: ada.account_id,
    actor_id:     grace.account_id,
    kind:         NotificationKind::Like,
    message:      "grace liked your post".into(),
    post_id:      Some(p.post_id),
  })
  .await
  .unwrap();

  assert!(s.delete_post(p.post_id).await.unwrap());
  assert!(s.get_post(p.post_id).await.unwrap().is_none());
  assert_eq!(s.count_likes(p.post_id).await.unwrap(), 0);
  assert_eq!(
    s.list_comments(p.post_id, PageRequest::default()).await.unwrap().total,
    0
  );
  let inbox = s
    .list_notifications(ada.account_id, false, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(inbox.total, 0);

  assert!(!s.delete_post(p.post_id).await.unwrap());
}

#[tokio::test]
async fn engagement_counts_and_reposts() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;
  let linus = account(&s, "linus").await;
  let p = post(&s, ada.account_id, "hello").await;

  s.add_like(p.post_id, grace.account_id).await.unwrap();
  s.add_like(p.post_id, linus.account_id).await.unwrap();
  s.add_comment(p.post_id, grace.account_id, "hi".into()).await.unwrap();

  assert!(s.add_repost(p.post_id, grace.account_id).await.unwrap());
  assert!(!s.add_repost(p.post_id, grace.account_id).await.unwrap());

  let seen_by_grace = s.post_engagement(p.post_id, grace.account_id).await.unwrap();
  assert_eq!(seen_by_grace.like_count, 2);
  assert_eq!(seen_by_grace.comment_count, 1);
  assert!(seen_by_grace.liked_by_viewer);
  assert_eq!(seen_by_grace.reposted_by.len(), 1);
  assert_eq!(seen_by_grace.reposted_by[0].username, "grace");

  let seen_by_ada = s.post_engagement(p.post_id, ada.account_id).await.unwrap();
  assert!(!seen_by_ada.liked_by_viewer);

  assert!(s.remove_repost(p.post_id, grace.account_id).await.unwrap());
  assert!(!s.remove_repost(p.post_id, grace.account_id).await.unwrap());
}

// ─── Likes and comments ──────────────────────────────────────────────────────

#[tokio::test]
async fn like_is_unique_per_account() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let p = post(&s, ada.account_id, "x").await;

  assert!(s.add_like(p.post_id, ada.account_id).await.unwrap().is_some());
  assert!(s.add_like(p.post_id, ada.account_id).await.unwrap().is_none());
  assert_eq!(s.count_likes(p.post_id).await.unwrap(), 1);
  assert!(s.find_like(p.post_id, ada.account_id).await.unwrap().is_some());

  assert!(s.remove_like(p.post_id, ada.account_id).await.unwrap());
  assert!(s.find_like(p.post_id, ada.account_id).await.unwrap().is_none());
  assert!(!s.remove_like(p.post_id, ada.account_id).await.unwrap());
}

#[tokio::test]
async fn comments_newest_first_and_editable() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let p = post(&s, ada.account_id, "x").await;

  let first = s.add_comment(p.post_id, ada.account_id, "one".into()).await.unwrap();
  s.add_comment(p.post_id, ada.account_id, "two".into()).await.unwrap();

  let page = s.list_comments(p.post_id, PageRequest::default()).await.unwrap();
  let bodies: Vec<_> = page.items.iter().map(|c| c.content.as_str()).collect();
  assert_eq!(bodies, ["two", "one"]);

  let edited = s
    .update_comment(first.comment_id, "uno".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(edited.content, "uno");
  assert_eq!(edited.commented_at, first.commented_at);

  assert!(s.delete_comment(first.comment_id).await.unwrap());
  assert!(s.get_comment(first.comment_id).await.unwrap().is_none());
  assert!(s.update_comment(first.comment_id, "gone".into()).await.unwrap().is_none());
}

// ─── Follows ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_graph_listings_and_counts() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;
  let linus = account(&s, "linus").await;

  s.follow(grace.account_id, ada.account_id).await.unwrap();
  s.follow(linus.account_id, ada.account_id).await.unwrap();
  s.follow(ada.account_id, grace.account_id).await.unwrap();

  let followers = s.list_followers(ada.account_id, PageRequest::default()).await.unwrap();
  assert_eq!(followers.total, 2);
  let following = s.list_following(ada.account_id, PageRequest::default()).await.unwrap();
  assert_eq!(following.items.len(), 1);
  assert_eq!(following.items[0].username, "grace");

  let counts = s.follow_counts(ada.account_id).await.unwrap();
  assert_eq!((counts.followers, counts.following), (2, 1));

  // A deleted follower drops out of the counts.
  s.mark_deleted(linus.account_id).await.unwrap();
  assert_eq!(s.follow_counts(ada.account_id).await.unwrap().followers, 1);
}

#[tokio::test]
async fn duplicate_follow_is_skipped_and_self_follow_fails() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;

  assert!(s.follow(ada.account_id, grace.account_id).await.unwrap().is_some());
  assert!(s.follow(ada.account_id, grace.account_id).await.unwrap().is_none());
  assert!(s.follow(ada.account_id, ada.account_id).await.is_err());

  assert!(s.find_follow(ada.account_id, grace.account_id).await.unwrap().is_some());
  assert!(s.unfollow(ada.account_id, grace.account_id).await.unwrap());
  assert!(!s.unfollow(ada.account_id, grace.account_id).await.unwrap());
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_unread_filter_and_read_flag() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;
  let p = post(&s, ada.account_id, "x").await;

  let mut ids = vec![];
  for kind in [NotificationKind::Like, NotificationKind::Comment] {
    let n = s
      .create_notification(NewNotification {
        recipient_id: ada.account_id,
        actor_id: grace.account_id,
        kind,
        message: kind.message("grace"),
        post_id: Some(p.post_id),
      })
      .await
      .unwrap();
    ids.push(n.notification_id);
  }

  let read = s.mark_notification_read(ids[0]).await.unwrap().unwrap();
  assert!(read.read);
  assert_eq!(read.kind, NotificationKind::Like);

  let unread = s
    .list_notifications(ada.account_id, true, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(unread.total, 1);
  assert_eq!(unread.items[0].kind, NotificationKind::Comment);

  let all = s
    .list_notifications(ada.account_id, false, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(all.total, 2);

  assert!(s.delete_notification(ids[1]).await.unwrap());
  assert!(s.get_notification(ids[1]).await.unwrap().is_none());
  assert!(s.mark_notification_read(ids[1]).await.unwrap().is_none());
}

// ─── Goals ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn goal_lifecycle() {
  let s = store().await;
  let ada = account(&s, "ada").await;

  let goal = s
    .create_goal(NewGoal {
      owner_id:    ada.account_id,
      description: "finish the notes".into(),
      status:      GoalStatus::default(),
      target_date: chrono::NaiveDate::from_ymd_opt(2030, 1, 1),
    })
    .await
    .unwrap();
  assert_eq!(goal.status, GoalStatus::NotStarted);

  let updated = s
    .update_goal(goal.goal_id, GoalUpdate {
      description: "finish the notes".into(),
      status:      GoalStatus::InProgress,
      target_date: None,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.status, GoalStatus::InProgress);
  assert!(updated.target_date.is_none());

  assert_eq!(s.list_goals(ada.account_id).await.unwrap().len(), 1);
  assert!(s.delete_goal(goal.goal_id).await.unwrap());
  assert!(s.get_goal(goal.goal_id).await.unwrap().is_none());
}

// ─── Notes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn notes_list_newest_timestamp_first() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;
  let day = Utc::now() - Duration::days(3);

  let older = s
    .create_note(NewNote {
      owner_id:    ada.account_id,
      title:       "borrowck".into(),
      description: "one mutable or many shared".into(),
      timestamp:   day,
    })
    .await
    .unwrap();
  let newer = s
    .create_note(NewNote {
      owner_id:    ada.account_id,
      title:       "lifetimes".into(),
      description: String::new(),
      timestamp:   day + Duration::hours(2),
    })
    .await
    .unwrap();
  s.create_note(NewNote {
    owner_id:    grace.account_id,
    title:       "not ada's".into(),
    description: String::new(),
    timestamp:   day,
  })
  .await
  .unwrap();

  let notes = s.list_notes(ada.account_id).await.unwrap();
  let ids: Vec<_> = notes.iter().map(|n| n.note_id).collect();
  assert_eq!(ids, vec![newer.note_id, older.note_id]);
  assert_eq!(notes[1].timestamp, older.timestamp);

  let moved = s
    .update_note(older.note_id, NoteUpdate {
      title:       "borrowck".into(),
      description: "revised".into(),
      timestamp:   day + Duration::hours(5),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(moved.description, "revised");
  assert_eq!(s.list_notes(ada.account_id).await.unwrap()[0].note_id, older.note_id);

  assert!(s.delete_note(newer.note_id).await.unwrap());
  assert!(!s.delete_note(newer.note_id).await.unwrap());
  assert!(s.get_note(newer.note_id).await.unwrap().is_none());
  assert!(
    s.update_note(newer.note_id, NoteUpdate {
      title:       "x".into(),
      description: String::new(),
      timestamp:   day,
    })
    .await
    .unwrap()
    .is_none()
  );
}

// ─── Learning ────────────────────────────────────────────────────────────────

fn subtopic(name: &str, days: u32) -> Subtopic {
  Subtopic {
    name:          name.into(),
    description:   None,
    duration_days: days,
    resource:      None,
    completed:     false,
  }
}

#[tokio::test]
async fn plan_duration_and_subtopic_completion() {
  let s = store().await;
  let ada = account(&s, "ada").await;

  let plan = s
    .create_plan(NewLearningPlan {
      owner_id:      ada.account_id,
      title:         "Rust".into(),
      is_template:   false,
      duration_days: None,
      subtopics:     vec![subtopic("ownership", 4), subtopic("traits", 3)],
    })
    .await
    .unwrap();
  assert_eq!(plan.duration_days, 7);

  let updated = s
    .set_subtopic_completed(plan.plan_id, 1, true)
    .await
    .unwrap()
    .unwrap();
  assert!(!updated.subtopics[0].completed);
  assert!(updated.subtopics[1].completed);
  assert_eq!(updated.progress(), 0.5);

  let undone = s
    .set_subtopic_completed(plan.plan_id, 1, false)
    .await
    .unwrap()
    .unwrap();
  assert!(!undone.subtopics[1].completed);

  assert!(s.set_subtopic_completed(plan.plan_id, 2, true).await.unwrap().is_none());
  assert!(s.set_subtopic_completed(Uuid::new_v4(), 0, true).await.unwrap().is_none());
}

#[tokio::test]
async fn plans_filter_by_owner_and_template() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let grace = account(&s, "grace").await;

  for (owner, template) in [(ada.account_id, true), (ada.account_id, false), (grace.account_id, false)] {
    s.create_plan(NewLearningPlan {
      owner_id:      owner,
      title:         "plan".into(),
      is_template:   template,
      duration_days: Some(10),
      subtopics:     vec![],
    })
    .await
    .unwrap();
  }

  let page = PageRequest::default();
  let everything = s.list_plans(PlanQuery::default(), page).await.unwrap();
  assert_eq!(everything.total, 3);

  let templates = s
    .list_plans(PlanQuery { owner: None, templates_only: true }, page)
    .await
    .unwrap();
  assert_eq!(templates.total, 1);

  let adas = s
    .list_plans(PlanQuery { owner: Some(ada.account_id), templates_only: false }, page)
    .await
    .unwrap();
  assert_eq!(adas.total, 2);
}

#[tokio::test]
async fn progress_updates_outlive_their_plan() {
  let s = store().await;
  let ada = account(&s, "ada").await;
  let plan = s
    .create_plan(NewLearningPlan {
      owner_id:      ada.account_id,
      title:         "Knots".into(),
      is_template:   false,
      duration_days: None,
      subtopics:     vec![subtopic("bowline", 1)],
    })
    .await
    .unwrap();

  let update = s
    .add_progress_update(NewProgressUpdate {
      account_id:  ada.account_id,
      plan_id:     Some(plan.plan_id),
      title:       "day one".into(),
      description: "tied a bowline".into(),
      media_url:   None,
    })
    .await
    .unwrap();

  assert!(s.delete_plan(plan.plan_id).await.unwrap());
  let kept = s.get_progress_update(update.update_id).await.unwrap().unwrap();
  assert!(kept.plan_id.is_none());

  let listed = s
    .list_progress_updates(ada.account_id, PageRequest::default())
    .await
    .unwrap();
  assert_eq!(listed.total, 1);

  assert!(s.delete_progress_update(update.update_id).await.unwrap());
  assert!(!s.delete_progress_update(update.update_id).await.unwrap());
}
