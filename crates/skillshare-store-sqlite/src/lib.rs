//! SQLite backend for the SkillShare store traits.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each store trait is implemented in its
//! own module.

mod accounts;
mod encode;
mod engagement;
mod goals;
mod learning;
mod notes;
mod notifications;
mod posts;
mod schema;
mod social;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
