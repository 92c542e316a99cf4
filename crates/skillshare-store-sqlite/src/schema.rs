//! SQL schema for the SkillShare SQLite store.
//!
//! Executed at connection startup. Every statement is idempotent, so an
//! existing database is left as it is; `PRAGMA user_version` records the
//! layout revision for any future migration.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id         TEXT PRIMARY KEY,
    username           TEXT NOT NULL UNIQUE,
    email              TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash      TEXT,              -- argon2 PHC string; NULL for OAuth2 accounts
    first_name         TEXT NOT NULL DEFAULT '',
    last_name          TEXT NOT NULL DEFAULT '',
    bio                TEXT,
    profile_image_url  TEXT,
    contact_number     TEXT,
    gender             TEXT,
    address            TEXT,
    birthday           TEXT,              -- YYYY-MM-DD
    is_public          INTEGER NOT NULL DEFAULT 1,
    deleted            INTEGER NOT NULL DEFAULT 0,
    deactivated        INTEGER NOT NULL DEFAULT 0,
    deactivation_start TEXT,
    deactivation_end   TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id     TEXT PRIMARY KEY,
    author_id   TEXT NOT NULL REFERENCES accounts(account_id),
    caption     TEXT NOT NULL,
    media_json  TEXT NOT NULL DEFAULT '[]',
    posted_at   TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS post_tags (
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    account_id  TEXT NOT NULL REFERENCES accounts(account_id),
    PRIMARY KEY (post_id, account_id)
);

CREATE TABLE IF NOT EXISTS post_reposts (
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    account_id  TEXT NOT NULL REFERENCES accounts(account_id),
    reposted_at TEXT NOT NULL,
    PRIMARY KEY (post_id, account_id)
);

CREATE TABLE IF NOT EXISTS likes (
    like_id     TEXT PRIMARY KEY,
    post_id     TEXT NOT NULL REFERENCES posts(post_id),
    account_id  TEXT NOT NULL REFERENCES accounts(account_id),
    liked_at    TEXT NOT NULL,
    UNIQUE (post_id, account_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id   TEXT PRIMARY KEY,
    post_id      TEXT NOT NULL REFERENCES posts(post_id),
    account_id   TEXT NOT NULL REFERENCES accounts(account_id),
    content      TEXT NOT NULL,
    commented_at TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS follows (
    follow_id    TEXT PRIMARY KEY,
    follower_id  TEXT NOT NULL REFERENCES accounts(account_id),
    following_id TEXT NOT NULL REFERENCES accounts(account_id),
    created_at   TEXT NOT NULL,
    UNIQUE (follower_id, following_id),
    CHECK  (follower_id != following_id)
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_id    TEXT NOT NULL REFERENCES accounts(account_id),
    actor_id        TEXT NOT NULL REFERENCES accounts(account_id),
    kind            TEXT NOT NULL,    -- 'like' | 'comment' | 'share'
    message         TEXT NOT NULL,
    post_id         TEXT REFERENCES posts(post_id),
    read            INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS goals (
    goal_id     TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES accounts(account_id),
    description TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'not_started',
    target_date TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS learning_plans (
    plan_id         TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL REFERENCES accounts(account_id),
    title           TEXT NOT NULL,
    is_template     INTEGER NOT NULL DEFAULT 0,
    duration_days   INTEGER NOT NULL,
    subtopics_json  TEXT NOT NULL DEFAULT '[]',
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS progress_updates (
    update_id   TEXT PRIMARY KEY,
    account_id  TEXT NOT NULL REFERENCES accounts(account_id),
    plan_id     TEXT REFERENCES learning_plans(plan_id) ON DELETE SET NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    media_url   TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    note_id     TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES accounts(account_id),
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    timestamp   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_author_idx          ON posts(author_id, posted_at);
CREATE INDEX IF NOT EXISTS comments_post_idx         ON comments(post_id, commented_at);
CREATE INDEX IF NOT EXISTS follows_following_idx     ON follows(following_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications(recipient_id, created_at);
CREATE INDEX IF NOT EXISTS goals_owner_idx           ON goals(owner_id);
CREATE INDEX IF NOT EXISTS progress_account_idx      ON progress_updates(account_id, created_at);
CREATE INDEX IF NOT EXISTS notes_owner_idx           ON notes(owner_id, timestamp);

PRAGMA user_version = 1;
";
