//! SkillShare server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid with
//! `SKILLSHARE_*` environment variables, opens the SQLite store, and serves
//! the JSON API under `/api`.
//!
//! # Password hash generation
//!
//! ```
//! cargo run -p skillshare-server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use skillshare_server::{ServerConfig, app, environment, load_config};
use skillshare_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SkillShare API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password_stdin()?;
    let hash = skillshare_api::auth::password::hash_password(&password)?;
    println!("{hash}");
    return Ok(());
  }

  let server_cfg: ServerConfig = load_config(&cli.config, environment())
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let state = server_cfg
    .state(store)
    .context("invalid server configuration")?;
  if server_cfg.oauth.is_none() {
    tracing::info!("no [oauth] section; OAuth2 login disabled");
  }

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(state)).await.context("server error")?;

  Ok(())
}

/// Prompt for a password on stdout and read it from stdin.
fn read_password_stdin() -> anyhow::Result<String> {
  use std::io::{self, Write as _};
  print!("Password: ");
  io::stdout().flush().ok();
  read_password(io::stdin().lock())
}

/// One line from `input`, without its line ending.
fn read_password(mut input: impl std::io::BufRead) -> anyhow::Result<String> {
  let mut line = String::new();
  input.read_line(&mut line).context("failed to read password")?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_line_ending_is_stripped() {
    assert_eq!(read_password(&b"hunter22\r\n"[..]).unwrap(), "hunter22");
    assert_eq!(read_password(&b"trailing space \n"[..]).unwrap(), "trailing space ");
    assert_eq!(read_password(&b""[..]).unwrap(), "");
  }
}
