//! Ambient site and request context supplied by the host application.
//!
//! The shipping client does not know how the embedding application
//! serves requests; the host implements [`ContextProvider`] to expose
//! whatever is current when a record is built. [`StaticContext`] covers
//! hosts without per-request state (CLI tools, workers, tests).

use std::collections::BTreeMap;

/// Snapshot of the request being served when a record is built.
#[derive(Clone, Debug, Default)]
pub struct RequestSnapshot {
    /// URL scheme, `http` or `https`.
    pub scheme: String,
    /// Host header value, possibly including a port.
    pub host: String,
    /// Request path, possibly including query string and fragment.
    pub uri: String,
    /// Query-string parameters.
    pub get_params: BTreeMap<String, String>,
    /// Form-body parameters.
    pub post_params: BTreeMap<String, String>,
    /// Whether the host is serving a background (AJAX-style) request.
    pub is_ajax: bool,
    /// Whether the host is running a scheduled task.
    pub is_cron: bool,
    /// Whether the host is serving an API (REST-style) request.
    pub is_rest: bool,
}

/// Host-supplied ambient context consulted at record-build time.
pub trait ContextProvider: Send + Sync {
    /// Full URL of the active site. Multi-site hosts should return the
    /// network-wide URL here; only the host portion ends up in records.
    fn site_url(&self) -> String;

    /// The request currently being served, if any.
    fn request(&self) -> Option<RequestSnapshot> {
        None
    }
}

/// Fixed context for hosts without per-request state.
#[derive(Clone, Debug, Default)]
pub struct StaticContext {
    site_url: String,
    request: Option<RequestSnapshot>,
}

impl StaticContext {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            request: None,
        }
    }

    /// Attach a fixed request snapshot, returned for every build.
    pub fn with_request(mut self, request: RequestSnapshot) -> Self {
        self.request = Some(request);
        self
    }
}

impl ContextProvider for StaticContext {
    fn site_url(&self) -> String {
        self.site_url.clone()
    }

    fn request(&self) -> Option<RequestSnapshot> {
        self.request.clone()
    }
}
