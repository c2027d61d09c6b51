//! Level gating over the configured severity bitmask.
//!
//! The mask is a union of enabled severity bits, mirroring classic
//! error-reporting semantics. Gating only applies when it can be
//! evaluated unambiguously; everything else passes (fail-open), so a
//! misconfigured label never silently swallows records.

use crate::severity;

/// Decide whether a record labelled `component` may be delivered under
/// `mask`.
///
/// Allows delivery when the mask is zero, the component is absent, or
/// the label does not resolve to a known severity. Otherwise the
/// severity's bit must be set in the mask.
pub fn allows(mask: u32, component: Option<&str>) -> bool {
    if mask == 0 {
        return true;
    }
    let Some(label) = component else {
        return true;
    };
    match severity::codify(label) {
        Some(code) => mask & code != 0,
        None => true,
    }
}
