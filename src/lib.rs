//! logship: a synchronous structured-log shipping client.
//!
//! Accepts arbitrary application data, enriches it with contextual
//! metadata, applies level-based filtering and sensitive-field
//! redaction, serialises it to JSON, and delivers it over HTTP POST to
//! a Loggly-style log-collection endpoint. Delivery is best-effort:
//! one record per call, no buffering, no retry.
//!
//! The typical embedding configures the process-wide logger once at
//! startup and uses the static entry point everywhere else:
//!
//! ```no_run
//! use logship::{Config, Logger, StaticContext};
//! use serde_json::json;
//!
//! let config = Config::builder().with_token("abc-123").build();
//! Logger::init(Logger::new(config, StaticContext::new("https://blog.example.org")));
//!
//! let result = Logger::log(json!({"msg": "hi"}), Some("checkout"), false);
//! if let Err(err) = result {
//!     eprintln!("not shipped: {err}");
//! }
//! ```

pub mod config;
pub mod context;
pub mod delivery;
pub mod gate;
pub mod record;
pub mod redact;
pub mod severity;

mod logger;

pub use config::{Config, ConfigBuilder};
pub use context::{ContextProvider, RequestSnapshot, StaticContext};
pub use delivery::{ACK_BODY, DeliveryClient, DeliveryError};
pub use logger::{ERROR_COMPONENT_PREFIX, Logger};
pub use record::{LogRecord, PageInfo, RecordBuilder};
pub use redact::{DEFAULT_SENSITIVE_KEYS, Redactor, set_sensitive_key_filter};
pub use severity::{Severity, UNKNOWN_SEVERITY, codify, stringify};
