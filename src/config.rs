//! Shipping configuration, resolved once per process.
//!
//! Configuration comes either from the environment (`LOGSHIP_*`
//! variables, the embedded equivalent of host-defined constants) or
//! from [`ConfigBuilder`]. The delivery token is interpolated into the
//! destination template at build time; a template still carrying the
//! placeholder at send time is rejected by the delivery client.

use std::env;

use crate::severity::Severity;

/// Placeholder in the destination template reserved for the token.
pub const TOKEN_PLACEHOLDER: &str = "%s";
/// Tag used when computing the default destination.
pub const DEFAULT_TAG: &str = "http";

const ENV_TOKEN: &str = "LOGSHIP_TOKEN";
const ENV_DESTINATION: &str = "LOGSHIP_DESTINATION";
const ENV_TAG: &str = "LOGSHIP_TAG";
const ENV_ERROR_HANDLER: &str = "LOGSHIP_ERROR_HANDLER";
const ENV_LOG_LEVEL: &str = "LOGSHIP_LOG_LEVEL";

/// Default Loggly-style destination for `tag`.
fn default_destination(tag: &str) -> String {
    format!("https://logs-01.loggly.com/inputs/{TOKEN_PLACEHOLDER}/tag/{tag}/")
}

/// Resolved, immutable shipping configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Delivery token. Required for successful delivery but not
    /// enforced at configuration time.
    pub token: Option<String>,
    /// Destination URL; may still contain [`TOKEN_PLACEHOLDER`] when
    /// no token was supplied.
    pub destination: String,
    /// Whether the runtime-error hook should be installed.
    pub error_handler: bool,
    /// Bitmask of enabled severities.
    pub log_level: u32,
    /// Override for the sensitive-key redaction list.
    pub sensitive_keys: Option<Vec<String>>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve configuration from `LOGSHIP_*` environment variables,
    /// falling back to the documented defaults for anything unset.
    pub fn from_env() -> Self {
        let mut builder = ConfigBuilder::default();
        if let Ok(token) = env::var(ENV_TOKEN)
            && !token.is_empty()
        {
            builder = builder.with_token(token);
        }
        if let Ok(destination) = env::var(ENV_DESTINATION)
            && !destination.is_empty()
        {
            builder = builder.with_destination(destination);
        }
        if let Ok(tag) = env::var(ENV_TAG)
            && !tag.is_empty()
        {
            builder = builder.with_tag(tag);
        }
        if let Ok(flag) = env::var(ENV_ERROR_HANDLER) {
            builder = builder.with_error_handler(matches!(
                flag.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ));
        }
        if let Ok(level) = env::var(ENV_LOG_LEVEL)
            && let Ok(mask) = level.parse::<u32>()
        {
            builder = builder.with_log_level(mask);
        }
        builder.build()
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    token: Option<String>,
    destination: Option<String>,
    tag: Option<String>,
    error_handler: Option<bool>,
    log_level: Option<u32>,
    sensitive_keys: Option<Vec<String>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delivery token, interpolated into the destination
    /// template at build time.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set a custom destination. May contain one [`TOKEN_PLACEHOLDER`]
    /// or be a fully resolved URL.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the tag used when computing the default destination.
    /// Ignored when an explicit destination is supplied.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Enable or disable the runtime-error hook. Defaults to off.
    pub fn with_error_handler(mut self, enabled: bool) -> Self {
        self.error_handler = Some(enabled);
        self
    }

    /// Set the severity bitmask. Defaults to all severities enabled.
    pub fn with_log_level(mut self, mask: u32) -> Self {
        self.log_level = Some(mask);
        self
    }

    /// Replace the sensitive-key redaction list for this configuration.
    pub fn with_sensitive_keys(mut self, keys: Vec<String>) -> Self {
        self.sensitive_keys = Some(keys);
        self
    }

    /// Resolve defaults and interpolate the token into the template.
    pub fn build(self) -> Config {
        let tag = self.tag.unwrap_or_else(|| DEFAULT_TAG.to_string());
        let mut destination = self
            .destination
            .unwrap_or_else(|| default_destination(&tag));
        if let Some(token) = &self.token {
            destination = destination.replacen(TOKEN_PLACEHOLDER, token, 1);
        }
        Config {
            token: self.token,
            destination,
            error_handler: self.error_handler.unwrap_or(false),
            log_level: self.log_level.unwrap_or(Severity::ALL),
            sensitive_keys: self.sensitive_keys,
        }
    }
}
