//! Error types for `skillshare-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("plan duration overflows: subtopics add up to more than {} days", u32::MAX)]
  DurationOverflow,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
