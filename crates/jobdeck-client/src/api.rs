//! Async HTTP client implementing [`JobGateway`] over the JSON command
//! API.

use std::time::Duration;

use jobdeck_core::{card::Stage, gateway::JobGateway, row::RawJob};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Connection settings for the command API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async client for the JSON command API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. The
/// bearer token is a per-call argument and is never stored here.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

// ─── Wire shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct JobsResponse {
  #[serde(default)]
  status: String,
  #[serde(default)]
  jobs:   Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
  #[serde(default)]
  job: Option<RawJob>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  token: String,
}

#[derive(Debug, Serialize)]
struct StageUpdateBody<'a> {
  ids:   &'a [String],
  stage: &'a str,
}

#[derive(Debug, Serialize)]
struct IdsBody<'a> {
  ids: &'a [String],
}

// ─── Client ──────────────────────────────────────────────────────────────────

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Map non-success statuses to typed errors; 401/403 get their own
  /// variant so callers can surface an access-missing message.
  fn check(
    endpoint: &'static str,
    resp: reqwest::Response,
  ) -> Result<reqwest::Response> {
    match resp.status() {
      status if status.is_success() => Ok(resp),
      status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
        Err(Error::NotAuthorized { endpoint, status })
      }
      status => Err(Error::Status { endpoint, status }),
    }
  }
}

impl JobGateway for ApiClient {
  type Error = Error;

  /// `GET /latest-jobs`
  async fn fetch_jobs(&self, token: &str) -> Result<Vec<RawJob>> {
    let resp = self
      .client
      .get(self.url("/latest-jobs"))
      .bearer_auth(token)
      .send()
      .await?;
    let body: JobsResponse =
      Self::check("/latest-jobs", resp)?.json().await?;
    debug!(status = %body.status, count = body.jobs.len(), "fetched job applications");
    Ok(body.jobs)
  }

  /// `GET /latest-jobs/{id}` — point re-fetch for id-only events.
  async fn fetch_job(&self, token: &str, id: &str) -> Result<Option<RawJob>> {
    let resp = self
      .client
      .get(self.url(&format!("/latest-jobs/{id}")))
      .bearer_auth(token)
      .send()
      .await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let body: JobResponse =
      Self::check("/latest-jobs/{id}", resp)?.json().await?;
    Ok(body.job)
  }

  /// `POST /update-stage`
  async fn update_stage(
    &self,
    token: &str,
    ids: &[String],
    stage: Stage,
  ) -> Result<()> {
    let trace_id = Uuid::new_v4();
    debug!(%trace_id, count = ids.len(), stage = %stage, "issuing stage update");
    let resp = self
      .client
      .post(self.url("/update-stage"))
      .bearer_auth(token)
      .json(&StageUpdateBody { ids, stage: stage.label() })
      .send()
      .await?;
    Self::check("/update-stage", resp)?;
    Ok(())
  }

  /// `POST /archive`
  async fn archive(&self, token: &str, ids: &[String]) -> Result<()> {
    let trace_id = Uuid::new_v4();
    debug!(%trace_id, count = ids.len(), "issuing archive");
    let resp = self
      .client
      .post(self.url("/archive"))
      .bearer_auth(token)
      .json(&IdsBody { ids })
      .send()
      .await?;
    Self::check("/archive", resp)?;
    Ok(())
  }

  /// `POST /delete`
  async fn delete(&self, token: &str, ids: &[String]) -> Result<()> {
    let trace_id = Uuid::new_v4();
    debug!(%trace_id, count = ids.len(), "issuing delete");
    let resp = self
      .client
      .post(self.url("/delete"))
      .bearer_auth(token)
      .json(&IdsBody { ids })
      .send()
      .await?;
    Self::check("/delete", resp)?;
    Ok(())
  }

  /// `POST /realtime-token`
  async fn mint_realtime_token(&self, token: &str) -> Result<String> {
    let resp = self
      .client
      .post(self.url("/realtime-token"))
      .bearer_auth(token)
      .send()
      .await?;
    let body: TokenResponse =
      Self::check("/realtime-token", resp)?.json().await?;
    Ok(body.token)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
