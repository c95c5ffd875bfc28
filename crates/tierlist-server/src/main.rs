//! tierlist server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the command API the chat transport calls into until
//! Ctrl+C or SIGTERM.
//!
//! The `auth_password_hash` value comes from:
//!
//! ```text
//! cargo run -p tierlist-server --bin server -- --hash-password
//! ```

mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use settings::ServerConfig;
use tierlist_api::{AppState, AuthConfig};
use tierlist_scrape::HttpSource;
use tierlist_store_sqlite::SqliteStore;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Subject tier-list bot backend")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Read a password from stdin, print its argon2 hash, and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  if cli.hash_password {
    return print_password_hash();
  }

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cfg = settings::load(&cli.config)?;
  serve(cfg).await
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store_path = settings::expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;
  let source = HttpSource::new(Duration::from_secs(cfg.catalog.timeout_secs))
    .context("failed to build the catalog HTTP client")?;

  let auth = AuthConfig {
    username:      cfg.auth_username,
    password_hash: cfg.auth_password_hash,
  };
  let catalog_pages = cfg.catalog.sources.len();
  let state = AppState::new(store, source, cfg.bot, cfg.catalog.sources, auth);
  let app = tierlist_api::router(state).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  info!(store = %store_path.display(), catalog_pages, "listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;
  info!("server stopped");
  Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      warn!(error = %e, "cannot listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut stream) => {
        stream.recv().await;
      }
      Err(e) => {
        warn!(error = %e, "cannot listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => info!("received Ctrl+C, shutting down"),
    () = terminate => info!("received SIGTERM, shutting down"),
  }
}

fn print_password_hash() -> anyhow::Result<()> {
  use std::io::{self, BufRead, Write};

  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']);

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
  println!("{hash}");
  Ok(())
}
