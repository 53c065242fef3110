//! `jobdeck` — live job-application board in the terminal.
//!
//! Connects to the command API, loads the board, keeps a scoped realtime
//! credential fresh, and re-renders on every change event.
//!
//! # Usage
//!
//! ```
//! jobdeck --config config.toml
//! JOBDECK_BASE_URL=... JOBDECK_USER_ID=... JOBDECK_ID_TOKEN=... jobdeck
//! ```

mod console;
mod controller;

use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use controller::{AuthContext, BoardController};
use jobdeck_client::{ApiClient, ApiConfig, EventStreamFactory};
use jobdeck_core::gateway::JobGateway;
use jobdeck_core::view::SortKey;
use jobdeck_sync::{TokenMinter, rotation, subscription};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "jobdeck", about = "Live job-application board")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: std::path::PathBuf,

  /// Sort order: new, old, az, za.
  #[arg(long, default_value = "default")]
  sort: String,

  /// Fuzzy filter applied to the rendered board.
  #[arg(long, default_value = "")]
  query: String,
}

// ─── Settings ─────────────────────────────────────────────────────────────────

/// Shape of the configuration (TOML file layered with `JOBDECK_`
/// environment variables).
#[derive(Debug, Deserialize)]
struct Settings {
  base_url: String,
  user_id:  String,
  /// Identity bearer token, as issued by the auth provider.
  id_token: String,
  #[serde(default = "default_refresh_minutes")]
  refresh_minutes: u64,
}

fn default_refresh_minutes() -> u64 {
  rotation::REFRESH_INTERVAL.as_secs() / 60
}

/// Mints realtime credentials through the command API with the identity
/// token the operator supplied.
struct ApiMinter {
  api:    ApiClient,
  bearer: String,
}

impl TokenMinter for ApiMinter {
  type Error = jobdeck_client::Error;

  async fn mint(&self, _user_id: &str) -> Result<String, Self::Error> {
    self.api.mint_realtime_token(&self.bearer).await
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("JOBDECK"))
    .build()
    .context("loading configuration")?;
  let settings: Settings =
    settings.try_deserialize().context("parsing configuration")?;

  let api = ApiClient::new(ApiConfig { base_url: settings.base_url.clone() })
    .context("building API client")?;

  let auth = AuthContext {
    user_id: settings.user_id.clone(),
    bearer:  settings.id_token.clone(),
  };
  let mut controller = BoardController::new(api.clone(), auth);
  controller.set_sort(SortKey::parse(&cli.sort));
  controller.set_query(cli.query);
  controller.load().await;
  println!("{}", console::render(&controller.view()));

  // Identity and visibility inputs. A terminal client is always
  // "visible"; the senders are kept alive for the process lifetime.
  let (_user_tx, user_rx) = watch::channel(settings.user_id.clone());
  let (_visible_tx, visible_rx) = watch::channel(true);
  let (token_tx, token_rx) = watch::channel(None::<String>);

  let minter =
    ApiMinter { api: api.clone(), bearer: settings.id_token.clone() };
  tokio::spawn(rotation::run(
    minter,
    Duration::from_secs(settings.refresh_minutes * 60),
    user_rx.clone(),
    visible_rx,
    token_tx,
  ));

  let factory = EventStreamFactory::new(settings.base_url.clone())
    .context("building event-stream client")?;
  let (events_tx, mut events_rx) = mpsc::channel(64);
  tokio::spawn(subscription::run(factory, user_rx, token_rx, events_tx));

  // Single writer: every change event lands here, one at a time.
  while let Some(event) = events_rx.recv().await {
    controller.handle_event(event).await;
    println!("{}", console::render(&controller.view()));
  }

  Ok(())
}
