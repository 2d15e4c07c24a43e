//! # Spotify Web API Client
//!
//! Bearer-token plumbing and the thin authenticated request wrapper the
//! collaborators ([`crate::links`], [`crate::playlist`]) share.
//!
//! Authentication uses the refresh-token grant: client credentials come
//! from the environment (`AUDITION_CLIENT_ID`, `AUDITION_CLIENT_SECRET`,
//! `AUDITION_REFRESH_TOKEN`), and the short-lived access token obtained
//! from the token endpoint is cached on disk so consecutive runs don't
//! re-exchange needlessly. The token is refreshed lazily whenever a
//! request finds it missing or expired.

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const API_BASE: &str = "https://api.spotify.com/v1/";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this many seconds before the server-reported expiry, so a
/// token never dies mid-request.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Application credentials, read from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    /// Read credentials from `AUDITION_CLIENT_ID`,
    /// `AUDITION_CLIENT_SECRET` and `AUDITION_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            env::var(name).with_context(|| format!("Environment variable {name} is not set"))
        };
        Ok(Self {
            client_id: var("AUDITION_CLIENT_ID")?,
            client_secret: var("AUDITION_CLIENT_SECRET")?,
            refresh_token: var("AUDITION_REFRESH_TOKEN")?,
        })
    }

    /// `Basic <base64(client_id:client_secret)>` header value for the
    /// token endpoint.
    fn basic_auth(&self) -> String {
        let creds = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", general_purpose::STANDARD.encode(creds))
    }
}

/// A cached access token with its absolute expiry time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    /// Unix seconds after which the token must not be used.
    pub expires_at: u64,
}

impl Token {
    fn from_response(access_token: String, expires_in: u64) -> Self {
        let expires_at = unix_now() + expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        Self { access_token, expires_at }
    }

    pub fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Authenticated Spotify Web API client backed by `ureq`.
pub struct SpotifyApi {
    agent: ureq::Agent,
    credentials: Credentials,
    token_file: PathBuf,
    token: RefCell<Option<Token>>,
}

impl SpotifyApi {
    /// Client with credentials from the environment and the default
    /// token cache location.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Credentials::from_env()?, crate::config::token_path()?))
    }

    pub fn new(credentials: Credentials, token_file: PathBuf) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();

        Self {
            agent,
            credentials,
            token_file,
            token: RefCell::new(None),
        }
    }

    /// GET a JSON document. `url` may be a `/v1` sub-path (e.g.
    /// `playlists/<id>/tracks`) or a full `https://` URL — the API's
    /// pagination `next` links are absolute.
    pub fn get_json(&self, url: &str) -> Result<Value> {
        let url = self.full_url(url);
        let bearer = self.bearer()?;

        debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &bearer)
            .call()
            .map_err(classify)?;

        response
            .into_json()
            .with_context(|| format!("Invalid JSON response from {url}"))
    }

    /// POST a JSON body to a `/v1` sub-path.
    pub fn post_json(&self, suburl: &str, body: Value) -> Result<()> {
        let url = self.full_url(suburl);
        let bearer = self.bearer()?;

        debug!("POST {url}");
        self.agent
            .post(&url)
            .set("Authorization", &bearer)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(classify)?;

        Ok(())
    }

    fn full_url(&self, url: &str) -> String {
        if url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{API_BASE}{url}")
        }
    }

    /// Current `Bearer ...` header value, refreshing the token if the
    /// cached one is missing or expired.
    fn bearer(&self) -> Result<String> {
        let mut slot = self.token.borrow_mut();

        if slot.is_none() {
            *slot = self.load_cached_token();
        }

        if let Some(token) = slot.as_ref().filter(|t| !t.is_expired()) {
            return Ok(format!("Bearer {}", token.access_token));
        }

        let token = self.exchange()?;
        self.cache_token(&token);
        let bearer = format!("Bearer {}", token.access_token);
        *slot = Some(token);
        Ok(bearer)
    }

    /// Exchange the refresh token for a new access token.
    fn exchange(&self) -> Result<Token> {
        info!("Refreshing API access token");

        let response = self
            .agent
            .post(TOKEN_URL)
            .set("Authorization", &self.credentials.basic_auth())
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &self.credentials.refresh_token),
            ])
            .map_err(classify)
            .context("Token refresh request failed")?;

        let body: Value = response
            .into_json()
            .context("Token endpoint returned invalid JSON")?;

        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .context("Token endpoint response is missing access_token")?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_u64)
            .unwrap_or(3600);

        Ok(Token::from_response(access_token, expires_in))
    }

    /// A stale or unreadable cache is not an error; it just means an
    /// exchange happens on the next request.
    fn load_cached_token(&self) -> Option<Token> {
        let content = fs::read_to_string(&self.token_file).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn cache_token(&self, token: &Token) {
        if let Ok(content) = serde_json::to_string(token) {
            if let Err(e) = fs::write(&self.token_file, content) {
                debug!("Could not cache token: {e}");
            }
        }
    }
}

/// Turn a `ureq` failure into a readable error with the HTTP status when
/// one exists.
fn classify(error: ureq::Error) -> anyhow::Error {
    match error {
        ureq::Error::Status(code, response) => {
            let url = response.get_url().to_string();
            let detail = response.into_string().unwrap_or_default();
            anyhow::anyhow!("HTTP {code} from {url}: {detail}")
        }
        ureq::Error::Transport(transport) => anyhow::anyhow!("Request failed: {transport}"),
    }
}

/// Convenience used by error paths that want to bail on a missing id.
pub fn require_playlist_id(id: Option<&str>) -> Result<&str> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => bail!("No destination playlist configured. Set one in the queue settings."),
    }
}
