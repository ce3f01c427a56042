//! Wire models for the Resi central API.
//!
//! Field names mirror the vendor's JSON (camelCase); unmodeled vendor fields
//! on status records are kept verbatim so callers can still inspect them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Identifier → display name mapping returned by the catalog endpoints.
pub type Catalog = HashMap<String, String>;

/// `POST /auth/token` request body (password grant).
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub grant_type: &'a str,
}

/// `POST /auth/token` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// `GET /users/me` response body.
///
/// Both identifiers are required by dependent endpoints; their absence is a
/// protocol error, so they stay optional here and are checked by the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserProfile {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Reported state of an encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderState {
    Started,
    Stopped,
    /// Any vendor state we don't model (e.g. transitional states).
    #[serde(other)]
    #[default]
    Unknown,
}

/// One entry of the per-customer monitor list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncoderStatus {
    pub encoder_id: String,
    #[serde(default)]
    pub status: EncoderState,
    #[serde(default)]
    pub video_input_source: Option<String>,
    /// Heartbeat timestamp; a missing value marks the record as stale.
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    /// Vendor fields we don't interpret, preserved verbatim.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl EncoderStatus {
    /// Feedback predicate: the encoder is running.
    pub fn is_started(&self) -> bool {
        self.status == EncoderState::Started
    }

    /// Feedback predicate: the encoder has a video input.
    pub fn has_video(&self) -> bool {
        self.video_input_source.is_some()
    }
}

/// `GET /customers/{id}/monitors` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MonitorsResponse {
    #[serde(default)]
    pub encoder_status: Vec<EncoderStatus>,
}

/// One entry of a catalog listing (encoders, encoder profiles, event
/// profiles). Entries missing either field are skipped by the client.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogEntry {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `PATCH /encoders/{id}` request body.
///
/// `start` carries the stream (event) profile and encoder profile to run
/// with; `stop` carries only the requested status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EncoderCommand<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_profile: Option<UuidRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder_profile: Option<UuidRef<'a>>,
    pub requested_status: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UuidRef<'a> {
    pub uuid: &'a str,
}

impl<'a> EncoderCommand<'a> {
    pub fn start(event_profile_id: &'a str, encoder_profile_id: &'a str) -> Self {
        Self {
            stream_profile: Some(UuidRef { uuid: event_profile_id }),
            encoder_profile: Some(UuidRef { uuid: encoder_profile_id }),
            requested_status: "start",
        }
    }

    pub fn stop() -> Self {
        Self {
            stream_profile: None,
            encoder_profile: None,
            requested_status: "stop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_state_tolerates_unknown_values() {
        assert_eq!(
            serde_json::from_str::<EncoderState>("\"started\"").unwrap(),
            EncoderState::Started
        );
        assert_eq!(
            serde_json::from_str::<EncoderState>("\"stopped\"").unwrap(),
            EncoderState::Stopped
        );
        // Transitional vendor states must not fail the whole snapshot.
        assert_eq!(
            serde_json::from_str::<EncoderState>("\"starting\"").unwrap(),
            EncoderState::Unknown
        );
    }

    #[test]
    fn test_encoder_status_keeps_vendor_fields() {
        let raw = r#"{
            "encoderId": "enc-1",
            "status": "started",
            "videoInputSource": "sdi-1",
            "lastUpdate": "2024-02-04T06:14:12Z",
            "cpuLoad": 37.5
        }"#;

        let record: EncoderStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(record.encoder_id, "enc-1");
        assert!(record.is_started());
        assert!(record.has_video());
        assert!(record.last_update.is_some());
        assert_eq!(record.extra["cpuLoad"], 37.5);
    }

    #[test]
    fn test_encoder_status_without_heartbeat() {
        let record: EncoderStatus =
            serde_json::from_str(r#"{"encoderId": "enc-2", "status": "stopped"}"#).unwrap();
        assert!(record.last_update.is_none());
        assert!(!record.has_video());
    }

    #[test]
    fn test_start_command_body() {
        let body = serde_json::to_value(EncoderCommand::start("event-1", "profile-1")).unwrap();
        assert_eq!(body["streamProfile"]["uuid"], "event-1");
        assert_eq!(body["encoderProfile"]["uuid"], "profile-1");
        assert_eq!(body["requestedStatus"], "start");
    }

    #[test]
    fn test_stop_command_omits_profiles() {
        let body = serde_json::to_value(EncoderCommand::stop()).unwrap();
        assert_eq!(body["requestedStatus"], "stop");
        assert!(body.get("streamProfile").is_none());
        assert!(body.get("encoderProfile").is_none());
    }
}
