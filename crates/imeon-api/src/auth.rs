// Session authentication
//
// Cookie-based login against the inverter's web API. The login endpoint
// sets a session cookie in the client's jar; subsequent requests use it
// automatically. Login is idempotent: once the client believes it holds
// a session, the request is skipped until a 401 proves otherwise.

use std::sync::atomic::Ordering;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ImeonClient;
use crate::error::Error;

impl ImeonClient {
    /// Authenticate with the inverter using username/password.
    ///
    /// `POST /api/login`. No-op if a session is already established.
    /// Wrong credentials surface as [`Error::Authentication`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        if self.is_logged_in() {
            return Ok(());
        }

        let url = self.api_url("login")?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        self.post("login", &body).await.map_err(|e| match e {
            // The device answers a bad login with its error envelope,
            // not only with a 401.
            Error::Api { message } => Error::Authentication { message },
            other => other,
        })?;

        self.logged_in.store(true, Ordering::Relaxed);
        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `POST /api/logout`. Ignores envelope errors -- an already-expired
    /// session is not worth reporting.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.api_url("logout")?;
        debug!("logging out at {}", url);

        match self.post("logout", &json!({})).await {
            Ok(_) | Err(Error::Api { .. }) | Err(Error::Authentication { .. }) => {
                self.logged_in.store(false, Ordering::Relaxed);
                Ok(())
            }
            Err(other) => Err(other),
        }
    }
}
