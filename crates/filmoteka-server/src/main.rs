//! filmoteka server binary.
//!
//! Reads `filmoteka.toml` (or the path given with `--config`) plus any
//! `FILMOTEKA_*` environment variables, opens the SQLite store, and serves
//! the JSON API over HTTP.
//!
//! # Granting admin
//!
//! Admins cannot be created through the API. Promote an existing account with:
//!
//! ```
//! cargo run -p filmoteka-server -- grant-admin <username>
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use filmoteka_server::{AppState, ServerConfig};
use filmoteka_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Filmoteka movie catalog server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "filmoteka.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the API (the default).
  Serve,
  /// Give an existing account administrator privileges.
  GrantAdmin { username: String },
  /// Take administrator privileges away from an account.
  RevokeAdmin { username: String },
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FILMOTEKA"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.check().context("invalid configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path, server_cfg.query_timeout())
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::GrantAdmin { username } => set_admin(&store, &username, true).await,
    Command::RevokeAdmin { username } => set_admin(&store, &username, false).await,
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = filmoteka_server::router(AppState::new(store, server_cfg));

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn set_admin(store: &SqliteStore, username: &str, is_admin: bool) -> anyhow::Result<()> {
  let person = store
    .set_admin(username, is_admin)
    .await
    .with_context(|| format!("failed to update {username}"))?;
  info!(person_id = %person.id, username = %person.username, is_admin, "admin flag updated");
  Ok(())
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
