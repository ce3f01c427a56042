//! Authenticated session state for one configured account.
//!
//! A `Session` is created wholesale when an account is configured and
//! replaced wholesale when it is reconfigured; fields are only ever filled
//! in, never partially cleared. The predicates are pure over an explicit
//! `now` so callers (and tests) control the clock.

use chrono::{DateTime, Duration, Utc};

/// Token, expiry and user context for one account.
pub struct Session {
    username: String,
    password: String,
    token: Option<String>,
    /// Absolute expiry of `token`; starts out already expired.
    token_expires_at: DateTime<Utc>,
    customer_id: Option<String>,
    user_id: Option<String>,
}

impl Session {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: None,
            token_expires_at: DateTime::<Utc>::MIN_UTC,
            customer_id: None,
            user_id: None,
        }
    }

    /// True when no token is held or the held token's expiry has passed.
    pub fn needs_token(&self, now: DateTime<Utc>) -> bool {
        self.token.is_none() || now >= self.token_expires_at
    }

    /// True when the account-scoped customer/user identifiers are unresolved.
    pub fn needs_user_context(&self) -> bool {
        self.customer_id.is_none() || self.user_id.is_none()
    }

    /// Store a freshly acquired bearer token with its lifetime in seconds.
    pub(crate) fn store_token(&mut self, token: String, ttl_seconds: i64, now: DateTime<Utc>) {
        self.token = Some(token);
        self.token_expires_at = now + Duration::seconds(ttl_seconds);
    }

    pub(crate) fn store_user_context(&mut self, customer_id: String, user_id: String) {
        self.customer_id = Some(customer_id);
        self.user_id = Some(user_id);
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_expires_at", &self.token_expires_at)
            .field("customer_id", &self.customer_id)
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_needs_everything() {
        let session = Session::new("user@example.com", "hunter2");
        assert!(session.needs_token(Utc::now()));
        assert!(session.needs_user_context());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_token_valid_until_ttl_elapses() {
        let mut session = Session::new("user@example.com", "hunter2");
        let issued_at = Utc::now();

        session.store_token("tok-1".to_string(), 3600, issued_at);

        // Valid immediately and just before expiry.
        assert!(!session.needs_token(issued_at));
        assert!(!session.needs_token(issued_at + Duration::seconds(3599)));
        // Expired exactly at and after the deadline.
        assert!(session.needs_token(issued_at + Duration::seconds(3600)));
        assert!(session.needs_token(issued_at + Duration::hours(2)));
    }

    #[test]
    fn test_user_context_needs_both_identifiers() {
        let mut session = Session::new("user@example.com", "hunter2");
        assert!(session.needs_user_context());

        session.store_user_context("cust-1".to_string(), "user-1".to_string());
        assert!(!session.needs_user_context());
        assert_eq!(session.customer_id(), Some("cust-1"));
        assert_eq!(session.user_id(), Some("user-1"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut session = Session::new("user@example.com", "hunter2");
        session.store_token("tok-1".to_string(), 60, Utc::now());

        let rendered = format!("{session:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok-1"));
        assert!(rendered.contains("user@example.com"));
    }
}
