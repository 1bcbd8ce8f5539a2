// Imeon HTTP client
//
// Wraps `reqwest::Client` with address normalization, the vendor
// `{ status, message, data }` envelope, and session-state tracking.
// Endpoint groups (auth, data, settings) are implemented as inherent
// methods in separate files to keep this module focused on transport
// mechanics.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default TCP port of the inverter's local web API.
const DEFAULT_PORT: u16 = 8088;

/// Raw HTTP client for one Imeon inverter.
///
/// Handles the `{ status, message, data }` envelope and URL construction.
/// All request methods return the unwrapped `data` payload -- the envelope
/// is stripped before the caller sees it. The client also accumulates the
/// nested section state fetched by `init`/`update` (see [`data`](crate::data)).
#[derive(Debug)]
pub struct ImeonClient {
    http: reqwest::Client,
    base_url: Url,
    address: String,
    /// Session established client-side; cleared on any 401.
    pub(crate) logged_in: AtomicBool,
    /// Nested `section -> field -> value` state (plus the `timeline` list).
    pub(crate) storage: Map<String, Value>,
}

/// The vendor response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ImeonClient {
    /// Create a new client for the inverter at `address`.
    ///
    /// The address may be a bare host or host:port; it is normalized to
    /// `http://{host}:{port}` with the default port 8088. A cookie jar is
    /// added automatically if the transport config doesn't carry one
    /// (session auth requires cookies).
    pub fn new(address: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = normalize_address(address)?;

        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;

        Ok(Self {
            http,
            base_url,
            address: address.to_owned(),
            logged_in: AtomicBool::new(false),
            storage: Map::new(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        let address = base_url.to_string();
        Self {
            http,
            base_url,
            address,
            logged_in: AtomicBool::new(false),
            storage: Map::new(),
        }
    }

    /// The address this client was configured with, as given by the user.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a session is currently established, as far as the client
    /// knows. A 401 from the device resets this.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Relaxed)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(&format!("api/{path}"))
            .map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.parse_envelope(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post(&self, path: &str, body: &Value) -> Result<Value, Error> {
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_envelope(resp).await
    }

    /// Parse the `{ status, message, data }` envelope, returning `data`
    /// on success or an [`Error::Api`] if `status != "ok"`. A 401 clears
    /// the logged-in flag so the next login re-authenticates.
    async fn parse_envelope(&self, resp: reqwest::Response) -> Result<Value, Error> {
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.logged_in.store(false, Ordering::Relaxed);
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if envelope.status == "ok" {
            Ok(envelope.data.unwrap_or(Value::Null))
        } else {
            Err(Error::Api {
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("status={}", envelope.status)),
            })
        }
    }
}

/// Normalize a user-supplied device address into a base URL.
fn normalize_address(address: &str) -> Result<Url, Error> {
    let with_scheme = if address.contains("://") {
        address.to_owned()
    } else {
        format!("http://{address}")
    };

    let mut url = Url::parse(&with_scheme)?;
    if url.port().is_none() {
        // set_port only fails for cannot-be-a-base URLs, which Url::parse
        // with an http scheme never produces.
        let _ = url.set_port(Some(DEFAULT_PORT));
    }
    Ok(url)
}
