//! Severity table mapping numeric error codes to symbolic names.
//!
//! The codes are the classic power-of-two runtime-error bits, so a
//! configured log level can be treated as a bitmask (see
//! [`crate::gate`]). The forward mapping is total: unknown codes
//! stringify to `"unknown"` rather than failing. The reverse mapping
//! reduces hierarchical component labels (`Logger/Error/E_WARNING`) to
//! their last segment before lookup and reports a miss as `None`.

use std::fmt;
use std::str::FromStr;

/// Symbolic name returned for codes outside the table.
pub const UNKNOWN_SEVERITY: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Parse,
    Notice,
    CoreError,
    CoreWarning,
    CompileError,
    CompileWarning,
    UserError,
    UserWarning,
    UserNotice,
    Strict,
    RecoverableError,
    Deprecated,
    UserDeprecated,
}

impl Severity {
    /// Union of every severity bit in the table.
    pub const ALL: u32 = 0x7fff;

    const TABLE: [Severity; 15] = [
        Severity::Error,
        Severity::Warning,
        Severity::Parse,
        Severity::Notice,
        Severity::CoreError,
        Severity::CoreWarning,
        Severity::CompileError,
        Severity::CompileWarning,
        Severity::UserError,
        Severity::UserWarning,
        Severity::UserNotice,
        Severity::Strict,
        Severity::RecoverableError,
        Severity::Deprecated,
        Severity::UserDeprecated,
    ];

    /// The bitmask value for this severity.
    pub fn code(self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Parse => 4,
            Severity::Notice => 8,
            Severity::CoreError => 16,
            Severity::CoreWarning => 32,
            Severity::CompileError => 64,
            Severity::CompileWarning => 128,
            Severity::UserError => 256,
            Severity::UserWarning => 512,
            Severity::UserNotice => 1024,
            Severity::Strict => 2048,
            Severity::RecoverableError => 4096,
            Severity::Deprecated => 8192,
            Severity::UserDeprecated => 16384,
        }
    }

    /// The symbolic name for this severity.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Error => "E_ERROR",
            Severity::Warning => "E_WARNING",
            Severity::Parse => "E_PARSE",
            Severity::Notice => "E_NOTICE",
            Severity::CoreError => "E_CORE_ERROR",
            Severity::CoreWarning => "E_CORE_WARNING",
            Severity::CompileError => "E_COMPILE_ERROR",
            Severity::CompileWarning => "E_COMPILE_WARNING",
            Severity::UserError => "E_USER_ERROR",
            Severity::UserWarning => "E_USER_WARNING",
            Severity::UserNotice => "E_USER_NOTICE",
            Severity::Strict => "E_STRICT",
            Severity::RecoverableError => "E_RECOVERABLE_ERROR",
            Severity::Deprecated => "E_DEPRECATED",
            Severity::UserDeprecated => "E_USER_DEPRECATED",
        }
    }

    /// Look up a severity by its numeric code.
    pub fn from_code(code: u32) -> Option<Severity> {
        Self::TABLE.iter().copied().find(|s| s.code() == code)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TABLE
            .iter()
            .copied()
            .find(|sev| sev.name() == s)
            .ok_or(())
    }
}

/// Return the symbolic name for `code`, or [`UNKNOWN_SEVERITY`] when the
/// code is outside the table. Never fails.
pub fn stringify(code: u32) -> &'static str {
    Severity::from_code(code).map_or(UNKNOWN_SEVERITY, Severity::name)
}

/// Reverse lookup from a severity name to its numeric code.
///
/// Hierarchical labels are reduced to their last `/`-separated segment
/// first, so component strings built by the error hook
/// (`Logger/Error/E_WARNING`) resolve without preprocessing by the
/// caller. A miss is reported as `None`, not an error.
pub fn codify(label: &str) -> Option<u32> {
    basename(label).parse::<Severity>().ok().map(Severity::code)
}

/// Last path-segment-like token of a label.
fn basename(label: &str) -> &str {
    label.trim_end_matches('/').rsplit('/').next().unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn round_trips_over_the_defined_table() {
        for sev in Severity::TABLE {
            assert_eq!(stringify(sev.code()), sev.name());
            assert_eq!(codify(sev.name()), Some(sev.code()));
        }
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(32768)]
    #[case(u32::MAX)]
    fn unknown_codes_stringify_to_sentinel(#[case] code: u32) {
        assert_eq!(stringify(code), UNKNOWN_SEVERITY);
    }

    #[rstest]
    #[case("E_WARNING", Some(2))]
    #[case("Logger/Error/E_WARNING", Some(2))]
    #[case("cron/worker", None)]
    #[case("", None)]
    #[case("unknown", None)]
    fn codify_reduces_labels_to_their_last_segment(
        #[case] label: &str,
        #[case] expected: Option<u32>,
    ) {
        assert_eq!(codify(label), expected);
    }

    #[test]
    fn all_mask_is_the_union_of_every_bit() {
        let union = Severity::TABLE.iter().fold(0, |acc, s| acc | s.code());
        assert_eq!(union, Severity::ALL);
    }
}
