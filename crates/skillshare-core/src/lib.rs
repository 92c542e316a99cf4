//! Core types and trait definitions for the SkillShare platform.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store, API and server crates all depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod deactivation;
pub mod error;
pub mod goal;
pub mod learning;
pub mod note;
pub mod notification;
pub mod page;
pub mod post;
pub mod social;
pub mod store;

pub use error::{Error, Result};
