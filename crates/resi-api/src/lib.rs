//! Client library for the Resi cloud encoder API.
//!
//! One [`ResiClient`] per configured account owns the authenticated session
//! (bearer token, customer/user context) and an account-wide encoder status
//! cache with a 20-second staleness window. All refreshes are lazy and
//! idempotent; polling is the caller's job.

pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use cache::{STALENESS_WINDOW_SECS, StatusCache};
pub use client::{DEFAULT_BASE_URL, DEFAULT_BASE_URL_V2, ResiClient};
pub use error::{ResiError, Result};
pub use models::{Catalog, EncoderState, EncoderStatus};
pub use session::Session;

pub use reqwest::StatusCode;
