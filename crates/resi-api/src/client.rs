//! Authenticated Resi API client.
//!
//! Every public operation runs the same precondition chain before its own
//! request: a valid bearer token first, then the resolved user context
//! (context resolution is itself an authenticated call, so the order is
//! fixed). Refreshes are lazy; nothing in here owns a timer.
//!
//! Concurrent callers may both observe a stale token/context/snapshot and
//! both refresh it. That race is tolerated: every refresh is a wholesale,
//! idempotent replacement and the last write wins, so the worst case is one
//! wasted request. Locks are never held across an await.

use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::cache::StatusCache;
use crate::error::{ResiError, Result};
use crate::models::{
    Catalog, CatalogEntry, EncoderCommand, EncoderStatus, MonitorsResponse, TokenRequest,
    TokenResponse, UserProfile,
};
use crate::session::Session;

/// v3-style resource API.
pub const DEFAULT_BASE_URL: &str = "https://central.resi.io/api/v3";
/// Legacy v2-style API; user profile, encoder catalog and encoder mutations
/// still live here.
pub const DEFAULT_BASE_URL_V2: &str = "https://central.resi.io/api_v2.svc";

/// Vendor-specific grant type accepted by the token endpoint.
const PASSWORD_GRANT: &str = "password_cookie";

/// Status code returned by the mutation paths when the request never got an
/// HTTP response at all.
const TRANSPORT_FAILURE_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

fn default_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
}

/// Values the precondition chain hands to a dependent request.
struct ReadyContext {
    token: String,
    customer_id: String,
}

/// Client for one configured account.
///
/// Holds the [`Session`] and the status cache; reconfiguring an account
/// means dropping the client and constructing a new one, which replaces the
/// session wholesale.
pub struct ResiClient {
    http: Client,
    base_url: String,
    base_url_v2: String,
    session: RwLock<Session>,
    cache: RwLock<StatusCache>,
}

impl ResiClient {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self::with_base_urls(username, password, DEFAULT_BASE_URL, DEFAULT_BASE_URL_V2)
    }

    /// Build a client against non-default endpoints (tests, staging).
    pub fn with_base_urls<U, P>(
        username: U,
        password: P,
        base_url: impl Into<String>,
        base_url_v2: impl Into<String>,
    ) -> Self
    where
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            http: default_client(),
            base_url: base_url.into(),
            base_url_v2: base_url_v2.into(),
            session: RwLock::new(Session::new(username, password)),
            cache: RwLock::new(StatusCache::new()),
        }
    }

    /// True when the held token is missing or expired.
    pub fn needs_token(&self) -> bool {
        self.session.read().needs_token(Utc::now())
    }

    /// True when the customer/user identifiers are unresolved.
    pub fn needs_user_context(&self) -> bool {
        self.session.read().needs_user_context()
    }

    /// Eagerly acquire a token and resolve the user context.
    ///
    /// Called when an account is (re)configured so bad credentials surface
    /// immediately instead of on the first poll.
    pub async fn authenticate(&self) -> Result<()> {
        self.ensure_ready().await?;
        Ok(())
    }

    // --- precondition chain -------------------------------------------------

    /// Ordered guard chain: token, then user context. Dependent requests
    /// embed the returned values instead of re-reading the session.
    async fn ensure_ready(&self) -> Result<ReadyContext> {
        let token = self.ensure_token().await?;
        let customer_id = self.ensure_user_context(&token).await?;
        Ok(ReadyContext { token, customer_id })
    }

    /// Return a valid bearer token, fetching one only if the held token is
    /// missing or expired.
    async fn ensure_token(&self) -> Result<String> {
        {
            let session = self.session.read();
            if !session.needs_token(Utc::now())
                && let Some(token) = session.token()
            {
                return Ok(token.to_owned());
            }
        }

        debug!("token missing or expired, requesting a new one");
        let (username, password) = {
            let session = self.session.read();
            (session.username().to_owned(), session.password().to_owned())
        };

        let url = format!("{}/auth/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TokenRequest {
                username: &username,
                password: &password,
                grant_type: PASSWORD_GRANT,
            })
            .send()
            .await
            .map_err(|e| ResiError::Authentication(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResiError::Authentication(format!(
                "token endpoint returned {status}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ResiError::Authentication(format!("token response did not decode: {e}")))?;

        let token = body.access_token.clone();
        self.session
            .write()
            .store_token(body.access_token, body.expires_in, Utc::now());
        Ok(token)
    }

    /// Return the customer identifier, resolving (and storing) the user
    /// context first if needed. Requires a valid token.
    async fn ensure_user_context(&self, token: &str) -> Result<String> {
        {
            let session = self.session.read();
            if !session.needs_user_context()
                && let Some(customer_id) = session.customer_id()
            {
                return Ok(customer_id.to_owned());
            }
        }

        debug!("user context unresolved, fetching profile");
        let url = format!("{}/users/me", self.base_url_v2);
        let response = self
            .authorized(Method::GET, &url, token)
            .send()
            .await
            .map_err(|e| ResiError::Authentication(format!("user profile request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResiError::Authentication(format!(
                "users/me returned {status}"
            )));
        }

        let profile: UserProfile = response
            .json()
            .await
            .map_err(|e| ResiError::Protocol(format!("user profile did not decode: {e}")))?;

        let customer_id = profile
            .customer_id
            .ok_or_else(|| ResiError::Protocol("user profile is missing customerId".to_string()))?;
        let user_id = profile
            .user_id
            .ok_or_else(|| ResiError::Protocol("user profile is missing userId".to_string()))?;

        self.session
            .write()
            .store_user_context(customer_id.clone(), user_id);
        Ok(customer_id)
    }

    fn authorized(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        // Vendor scheme: `X-Bearer <token>`, not RFC 6750 `Bearer`.
        self.http
            .request(method, url)
            .header(header::AUTHORIZATION, format!("X-Bearer {token}"))
    }

    // --- status cache -------------------------------------------------------

    /// The full encoder-status mapping, refreshed first if the cache is
    /// stale or `force_refresh` is set.
    ///
    /// On refresh failure the previous snapshot is retained untouched; the
    /// error propagates and a later read may still serve the stale data.
    pub async fn status_snapshot(
        &self,
        force_refresh: bool,
    ) -> Result<HashMap<String, EncoderStatus>> {
        if force_refresh || self.cache.read().needs_refresh(Utc::now()) {
            self.refresh_status().await?;
        }
        Ok(self.cache.read().entries().clone())
    }

    /// Last-known status of one encoder, refreshing the snapshot first if it
    /// is stale. `Ok(None)` for identifiers absent from the snapshot; a
    /// deleted or renamed encoder is a legitimate outcome, not a fault.
    pub async fn status_for(&self, encoder_id: &str) -> Result<Option<EncoderStatus>> {
        if self.cache.read().needs_refresh(Utc::now()) {
            self.refresh_status().await?;
        }
        Ok(self.cache.read().get(encoder_id).cloned())
    }

    async fn refresh_status(&self) -> Result<()> {
        let ready = self.ensure_ready().await?;
        let url = format!("{}/customers/{}/monitors", self.base_url, ready.customer_id);

        debug!("refreshing encoder status snapshot");
        let response = self.authorized(Method::GET, &url, &ready.token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResiError::Status { url, status });
        }

        let body: MonitorsResponse = response
            .json()
            .await
            .map_err(|e| ResiError::Protocol(format!("monitor list did not decode: {e}")))?;

        let mut cache = self.cache.write();
        cache.replace(body.encoder_status);
        debug!(encoders = cache.len(), "status snapshot replaced");
        Ok(())
    }

    // --- catalogs -----------------------------------------------------------

    /// Encoder identifier → display name. Fetched fresh on every call.
    pub async fn encoders(&self) -> Result<Catalog> {
        let ready = self.ensure_ready().await?;
        let url = format!("{}/encoders", self.base_url_v2);
        let request = self
            .authorized(Method::GET, &url, &ready.token)
            .query(&[("wide", "true")]);
        self.fetch_catalog(url, request).await
    }

    /// Encoder profile identifier → display name.
    pub async fn encoder_profiles(&self) -> Result<Catalog> {
        let ready = self.ensure_ready().await?;
        let url = format!(
            "{}/customers/{}/encoderprofiles",
            self.base_url, ready.customer_id
        );
        let request = self.authorized(Method::GET, &url, &ready.token);
        self.fetch_catalog(url, request).await
    }

    /// Event (stream) profile identifier → display name.
    pub async fn event_profiles(&self) -> Result<Catalog> {
        let ready = self.ensure_ready().await?;
        let url = format!(
            "{}/customers/{}/eventprofiles",
            self.base_url, ready.customer_id
        );
        let request = self.authorized(Method::GET, &url, &ready.token);
        self.fetch_catalog(url, request).await
    }

    /// A malformed or empty body means "nothing configured yet", not a
    /// fault; entries missing either field are skipped.
    async fn fetch_catalog(&self, url: String, request: RequestBuilder) -> Result<Catalog> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResiError::Status { url, status });
        }

        let entries: Vec<CatalogEntry> = match response.json().await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "catalog response did not decode, treating as empty");
                Vec::new()
            }
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| Some((entry.uuid?, entry.name?)))
            .collect())
    }

    // --- mutations ----------------------------------------------------------

    /// Ask the encoder to start with the given event (stream) profile and
    /// encoder profile.
    ///
    /// Returns the HTTP status code of the acknowledgment; the encoder's
    /// actual transition is asynchronous and must be verified by a later
    /// (possibly forced) status read. A transport failure yields the
    /// sentinel 500 instead of an error.
    pub async fn start_encoder(
        &self,
        encoder_id: &str,
        event_profile_id: &str,
        encoder_profile_id: &str,
    ) -> Result<StatusCode> {
        let ready = self.ensure_ready().await?;
        info!(encoder_id, event_profile_id, encoder_profile_id, "starting encoder");
        let command = EncoderCommand::start(event_profile_id, encoder_profile_id);
        self.send_command(encoder_id, &ready, &command).await
    }

    /// Ask the encoder to stop. Same contract as [`Self::start_encoder`].
    pub async fn stop_encoder(&self, encoder_id: &str) -> Result<StatusCode> {
        let ready = self.ensure_ready().await?;
        info!(encoder_id, "stopping encoder");
        self.send_command(encoder_id, &ready, &EncoderCommand::stop())
            .await
    }

    async fn send_command(
        &self,
        encoder_id: &str,
        ready: &ReadyContext,
        command: &EncoderCommand<'_>,
    ) -> Result<StatusCode> {
        let url = format!("{}/encoders/{}", self.base_url_v2, encoder_id);
        match self
            .authorized(Method::PATCH, &url, &ready.token)
            .json(command)
            .send()
            .await
        {
            Ok(response) => {
                debug!(encoder_id, status = %response.status(), "encoder command acknowledged");
                Ok(response.status())
            }
            Err(e) => {
                // The swallowed transport error survives only in the trace.
                warn!(encoder_id, error = %e, "encoder command failed in transport");
                Ok(TRANSPORT_FAILURE_STATUS)
            }
        }
    }
}

impl std::fmt::Debug for ResiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResiClient")
            .field("base_url", &self.base_url)
            .field("base_url_v2", &self.base_url_v2)
            .field("session", &*self.session.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_starts_unauthenticated() {
        let client = ResiClient::new("user@example.com", "hunter2");
        assert!(client.needs_token());
        assert!(client.needs_user_context());
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.base_url_v2, DEFAULT_BASE_URL_V2);
    }

    #[test]
    fn test_debug_does_not_leak_password() {
        let client = ResiClient::new("user@example.com", "hunter2");
        assert!(!format!("{client:?}").contains("hunter2"));
    }
}
