//! HTTP delivery of serialised records.
//!
//! The client validates the destination, applies the level gate,
//! serialises the record to compact JSON, and POSTs it with a
//! `Content-Type: application/json` header through a shared
//! `ureq::Agent`. The collection endpoint acknowledges receipt with a
//! fixed body; anything else on a completed exchange is reported as
//! [`DeliveryError::UnexpectedResponse`]. There is no retry: one
//! record, one attempt.

use std::time::Duration;

use thiserror::Error;
use ureq::{Agent, AgentBuilder};

use crate::config::{Config, TOKEN_PLACEHOLDER};
use crate::gate;
use crate::record::LogRecord;
use crate::severity;

/// Acknowledgement body the endpoint returns on accepted records.
pub const ACK_BODY: &str = r#"{"response":"ok"}"#;

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default overall timeout applied to a delivery request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure modes of a single delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination still carries the token placeholder, meaning a
    /// token was never interpolated. A configuration defect, not a
    /// transport failure.
    #[error("invalid destination, token placeholder was never interpolated: {0}")]
    InvalidDestination(String),
    /// Intentional suppression by the configured severity mask.
    #[error("log level {level} is turned off in this configuration (current mask: {mask})")]
    LevelDisabled { level: String, mask: u32 },
    /// The record could not be serialised to JSON.
    #[error("failed to serialise record: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Network or HTTP-layer failure; the cause is passed through.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The endpoint was reached but did not acknowledge the record.
    #[error("unexpected acknowledgement (status {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
}

impl DeliveryError {
    /// Whether this is the level gate doing its job rather than a
    /// genuine failure.
    pub fn is_suppression(&self) -> bool {
        matches!(self, Self::LevelDisabled { .. })
    }

    /// Whether this is a configuration defect the operator must fix.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidDestination(_))
    }
}

/// Synchronous HTTP delivery client.
///
/// Holds a `ureq::Agent` so consecutive deliveries reuse connections.
pub struct DeliveryClient {
    agent: Agent,
}

impl Default for DeliveryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryClient {
    pub fn new() -> Self {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(connect: Duration, request: Duration) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(connect)
            .timeout(request)
            .build();
        Self { agent }
    }

    /// Deliver `record` to the configured destination, blocking until
    /// the exchange completes or fails.
    pub fn deliver(&self, config: &Config, record: &LogRecord) -> Result<(), DeliveryError> {
        if config.destination.contains(TOKEN_PLACEHOLDER) {
            return Err(DeliveryError::InvalidDestination(
                config.destination.clone(),
            ));
        }

        if !gate::allows(config.log_level, record.component.as_deref()) {
            let level = record
                .component
                .as_deref()
                .and_then(severity::codify)
                .map_or(severity::UNKNOWN_SEVERITY, severity::stringify);
            return Err(DeliveryError::LevelDisabled {
                level: level.to_string(),
                mask: config.log_level,
            });
        }

        let body = serde_json::to_string(record)?;
        let request = self
            .agent
            .post(&config.destination)
            .set("Content-Type", "application/json");

        match request.send_string(&body) {
            Ok(response) => interpret_response(response.status(), response),
            // The endpoint answered with a non-2xx status; its body is
            // still the authority on whether the record was accepted.
            Err(ureq::Error::Status(status, response)) => interpret_response(status, response),
            Err(ureq::Error::Transport(transport)) => {
                Err(DeliveryError::Transport(transport.to_string()))
            }
        }
    }
}

/// Compare the response body against the fixed acknowledgement.
fn interpret_response(status: u16, response: ureq::Response) -> Result<(), DeliveryError> {
    let body = response
        .into_string()
        .map_err(|err| DeliveryError::Transport(err.to_string()))?;
    if body == ACK_BODY {
        Ok(())
    } else {
        Err(DeliveryError::UnexpectedResponse { status, body })
    }
}
