//! Sensitive-key redaction for captured request parameters.
//!
//! Request snapshots may carry credentials submitted through forms or
//! query strings; those keys are removed before a record leaves the
//! process. The default list covers the usual password fields and can
//! be replaced either per redactor or process-wide through
//! [`set_sensitive_key_filter`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Keys removed from GET/POST snapshots when no override is registered.
pub const DEFAULT_SENSITIVE_KEYS: [&str; 3] = ["password", "pwd", "user_pass"];

type KeyFilter = Box<dyn Fn(Vec<String>) -> Vec<String> + Send + Sync>;

static KEY_FILTER: Lazy<RwLock<Option<KeyFilter>>> = Lazy::new(|| RwLock::new(None));

/// Register a process-wide filter over the sensitive-key list.
///
/// The filter receives the default list and returns the list to use;
/// it applies to every [`Redactor`] built afterwards. Registering a
/// new filter replaces the previous one.
pub fn set_sensitive_key_filter(
    filter: impl Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
) {
    *KEY_FILTER.write() = Some(Box::new(filter));
}

#[cfg(test)]
pub(crate) fn clear_sensitive_key_filter() {
    *KEY_FILTER.write() = None;
}

/// Removes configured sensitive keys from parameter snapshots in place.
#[derive(Clone, Debug)]
pub struct Redactor {
    keys: Vec<String>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor {
    /// Build a redactor from the default key list, passed through the
    /// registered process-wide filter if any.
    pub fn new() -> Self {
        let defaults: Vec<String> = DEFAULT_SENSITIVE_KEYS
            .iter()
            .map(ToString::to_string)
            .collect();
        let keys = match KEY_FILTER.read().as_ref() {
            Some(filter) => filter(defaults),
            None => defaults,
        };
        Self { keys }
    }

    /// Build a redactor with an explicit key list, bypassing the
    /// process-wide filter.
    pub fn with_keys(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// The active sensitive-key list.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Remove every sensitive key from `params`. Idempotent; keys not
    /// present are left untouched.
    pub fn scrub(&self, params: &mut BTreeMap<String, String>) {
        for key in &self.keys {
            params.remove(key);
        }
    }
}
