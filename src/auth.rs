use serde::Deserialize;

use crate::api::{ApiClient, ApiResponse};
use crate::error::{Result, SatchelError};
use crate::session::{Session, SessionStore};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct RefreshFailure {
    #[serde(default)]
    error: Option<String>,
}

/// Runs remote calls under the current session, renewing credentials at most
/// once per call.
pub struct Authenticator<'a> {
    client: &'a ApiClient,
    store: &'a SessionStore,
}

impl<'a> Authenticator<'a> {
    pub fn new(client: &'a ApiClient, store: &'a SessionStore) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &ApiClient {
        self.client
    }

    /// Invoke `call` with the current access token. On 401, refresh once and
    /// invoke it exactly once more; the second result is returned
    /// unconditionally, even if it is again a 401. A failed refresh
    /// propagates instead of retrying. Anything other than a 401 from the
    /// first attempt is returned as-is.
    pub fn execute<F>(&self, session: &mut Session, call: F) -> Result<ApiResponse>
    where
        F: Fn(&str) -> Result<ApiResponse>,
    {
        let mut refreshed = false;
        loop {
            let resp = call(session.access_token())?;
            if !resp.is_unauthorized() || refreshed {
                return Ok(resp);
            }
            log::info!("access token rejected, renewing credentials");
            self.refresh(session)?;
            refreshed = true;
        }
    }

    /// Exchange the refresh token for a new pair. On success the rotated pair
    /// is persisted as a unit. A 4xx reporting the refresh token itself as
    /// expired purges local credentials and surfaces `SessionExpired`; any
    /// other failure leaves the stored credentials untouched.
    pub fn refresh(&self, session: &mut Session) -> Result<()> {
        let body = serde_json::json!({ "refreshToken": session.refresh_token() });
        let resp = self.client.post("/auth/refresh", None, Some(body))?;

        if resp.is_success() {
            let pair: TokenPair = resp.json()?;
            session.rotate(pair.access_token, pair.refresh_token);
            self.store.save(session)?;
            return Ok(());
        }

        if (400..500).contains(&resp.status) && is_terminal_expiry(&resp) {
            self.store.purge()?;
            return Err(SatchelError::SessionExpired);
        }

        resp.require_success().map(|_| ())
    }
}

fn is_terminal_expiry(resp: &ApiResponse) -> bool {
    match serde_json::from_str::<RefreshFailure>(&resp.body) {
        Ok(failure) => failure
            .error
            .is_some_and(|e| e.to_lowercase().contains("expired")),
        Err(_) => false,
    }
}
