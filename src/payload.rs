//! The canonical Sidekiq job payload.
//!
//! A payload is the JSON object a Sidekiq worker pops from Redis:
//!
//! ```json
//! {"class":"App::Jobs::CleanUp","queue":"urgent","args":[50],
//!  "jid":"9c3a5b0e4f21d7a8b6c1e0f2","created_at":1700000000.25,
//!  "enqueued_at":1700000000.25,"retry":true,"at":1700001800.25}
//! ```
//!
//! `at` is only present on scheduled jobs.

use crate::error::{KiqError, KiqResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Unique identifier for an enqueued job
pub type JobId = String;

/// Number of random bytes in a job id. Rendered as hex this gives the
/// 24 character ids Sidekiq itself generates.
pub const JID_BYTES: usize = 12;

/// Generate a fresh random job id.
pub fn generate_jid() -> JobId {
    hex::encode(rand::random::<[u8; JID_BYTES]>())
}

/// Current wall-clock time as fractional unix seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Retry policy announced to the worker.
///
/// Serialized as a boolean (`Flag`) or as a maximum number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Retry {
    /// Retry with the worker's defaults (`true`) or never (`false`)
    Flag(bool),
    /// Retry at most this many times
    Attempts(u32),
}

impl Retry {
    /// Retry using the worker's default policy
    pub const ENABLED: Retry = Retry::Flag(true);
    /// Never retry
    pub const DISABLED: Retry = Retry::Flag(false);
}

impl Default for Retry {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// Delay before a scheduled job becomes due.
///
/// Unlike [`Duration`] a delay may be zero or negative so that such requests
/// can be rejected with [`KiqError::InvalidDelay`] instead of being silently
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Delay(f64);

impl Delay {
    /// Delay of `secs` whole seconds
    pub fn secs(secs: i64) -> Self {
        Self(secs as f64)
    }

    /// Delay of `secs` fractional seconds
    pub fn from_secs_f64(secs: f64) -> Self {
        Self(secs)
    }

    /// Delay in fractional seconds
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Return the delay in seconds if it is finite and strictly positive.
    pub fn validate(self) -> KiqResult<f64> {
        if self.0.is_finite() && self.0 > 0.0 {
            Ok(self.0)
        } else {
            Err(KiqError::InvalidDelay { delay_secs: self.0 })
        }
    }
}

impl From<Duration> for Delay {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs_f64())
    }
}

/// One job invocation as stored in Redis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Remote handler name
    #[serde(rename = "class")]
    pub remote_class: String,
    /// Name of the queue the job is bound to
    #[serde(rename = "queue")]
    pub queue_name: String,
    /// Positional arguments for the remote handler
    pub args: Vec<Value>,
    /// Job id
    pub jid: JobId,
    /// Creation time (unix seconds)
    pub created_at: f64,
    /// Enqueue time (unix seconds)
    pub enqueued_at: f64,
    /// Retry policy, omitted when the worker default applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<Retry>,
    /// Due time of a scheduled job (unix seconds)
    #[serde(rename = "at", default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<f64>,
}

impl JobPayload {
    /// Build a payload stamped with the current time and a fresh job id.
    ///
    /// With a `delay` the payload is scheduled `delay` seconds from now; the
    /// delay must be strictly positive.
    pub fn build(
        remote_class: impl Into<String>,
        queue_name: impl Into<String>,
        args: Vec<Value>,
        retry: Option<Retry>,
        delay: Option<Delay>,
    ) -> KiqResult<Self> {
        let delay_secs = delay.map(Delay::validate).transpose()?;
        let now = unix_now();

        Ok(Self {
            remote_class: remote_class.into(),
            queue_name: queue_name.into(),
            args,
            jid: generate_jid(),
            created_at: now,
            enqueued_at: now,
            retry,
            scheduled_at: delay_secs.map(|secs| now + secs),
        })
    }

    /// Whether this payload targets the scheduled set
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_at.is_some()
    }

    /// Serialize to the JSON string stored in Redis.
    pub fn encode(&self) -> KiqResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a JSON string read from Redis. Unknown keys are ignored.
    pub fn decode(data: &str) -> KiqResult<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_jid_format() {
        let jid = generate_jid();
        assert_eq!(jid.len(), 2 * JID_BYTES);
        assert!(jid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_jids_are_distinct() {
        let jids: HashSet<JobId> = (0..10_000).map(|_| generate_jid()).collect();
        assert_eq!(jids.len(), 10_000);
    }

    #[test]
    fn test_immediate_payload_keys() {
        let payload =
            JobPayload::build("SayHello", "low", vec![json!("Hello")], Some(Retry::ENABLED), None)
                .unwrap();
        let value: Value = serde_json::from_str(&payload.encode().unwrap()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["args", "class", "created_at", "enqueued_at", "jid", "queue", "retry"]
        );
        assert_eq!(object["class"], json!("SayHello"));
        assert_eq!(object["queue"], json!("low"));
        assert_eq!(object["args"], json!(["Hello"]));
        assert_eq!(object["retry"], json!(true));
        assert!(object["created_at"].is_f64());
    }

    #[test]
    fn test_scheduled_payload_has_at() {
        let payload = JobPayload::build(
            "SayHello",
            "low",
            vec![],
            None,
            Some(Delay::from(Duration::from_secs(60))),
        )
        .unwrap();

        let at = payload.scheduled_at.unwrap();
        assert!((at - payload.enqueued_at - 60.0).abs() < 1e-6);

        let value: Value = serde_json::from_str(&payload.encode().unwrap()).unwrap();
        assert!(value.get("at").is_some());
        assert!(value.get("retry").is_none());
    }

    #[test]
    fn test_non_positive_delays_rejected() {
        for delay in [Delay::secs(0), Delay::secs(-1), Delay::from_secs_f64(f64::NAN)] {
            let error = JobPayload::build("SayHello", "low", vec![], None, Some(delay)).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidDelay);
        }
    }

    #[test]
    fn test_encode_decode_preserves_identity() {
        let payload = JobPayload::build(
            "App::Jobs::CleanUp",
            "urgent",
            vec![json!(50), json!({"dry_run": true}), json!([1.5, "x"])],
            Some(Retry::Attempts(5)),
            None,
        )
        .unwrap();

        let decoded = JobPayload::decode(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded.remote_class, payload.remote_class);
        assert_eq!(decoded.queue_name, payload.queue_name);
        assert_eq!(decoded.args, payload.args);
        assert_eq!(decoded.jid, payload.jid);
        assert_eq!(decoded.retry, Some(Retry::Attempts(5)));
    }

    #[test]
    fn test_decode_accepts_worker_fields() {
        let data = r#"{"class":"SayHello","queue":"low","args":[],"jid":"abc",
            "created_at":1.5,"enqueued_at":2.5,"retry":false,"error_message":"boom"}"#;
        let payload = JobPayload::decode(data).unwrap();
        assert_eq!(payload.retry, Some(Retry::DISABLED));
        assert!(!payload.is_scheduled());
    }

    #[test]
    fn test_decode_rejects_missing_keys() {
        let error = JobPayload::decode(r#"{"class":"SayHello"}"#).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }
}
