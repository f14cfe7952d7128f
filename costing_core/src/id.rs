//! # Record Identifiers
//!
//! Human-readable sequence IDs of the form `<PREFIX><NNNN>` (e.g. `CO-0042`).
//! The next ID is one past the highest numeric suffix already stored, so gaps
//! and out-of-order rows are harmless.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::id::next_costing_id;
//!
//! let next = next_costing_id(["CO-0001", "CO-0003", "CO-0002"]);
//! assert_eq!(next, "CO-0004");
//! ```

use chrono::{DateTime, Utc};

/// Prefix of costing record IDs.
pub const COSTING_ID_PREFIX: &str = "CO-";

/// Minimum digits in the numeric suffix.
pub const ID_WIDTH: usize = 4;

/// Numeric suffix of `id` if it is `prefix` followed only by ASCII digits.
pub fn parse_sequence(id: &str, prefix: &str) -> Option<u64> {
    let digits = id.trim().strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `prefix` + `n`, zero-padded to [`ID_WIDTH`].
pub fn format_id(prefix: &str, n: u64) -> String {
    format!("{}{:0width$}", prefix, n, width = ID_WIDTH)
}

/// Next ID after the highest valid suffix among `ids`; `<prefix>0001` when none.
pub fn next_id<'a, I>(prefix: &str, ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = ids
        .into_iter()
        .filter_map(|id| parse_sequence(id, prefix))
        .max()
        .unwrap_or(0);
    format_id(prefix, max.saturating_add(1))
}

/// Next costing ID (`CO-NNNN`).
pub fn next_costing_id<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    next_id(COSTING_ID_PREFIX, ids)
}

/// Degraded ID used when existing records cannot be read.
///
/// Takes the last four digits of the Unix time in milliseconds. Neither
/// monotonic nor unique; a store that enforces its key column will reject
/// collisions.
pub fn fallback_id(prefix: &str, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(10_000) as u64;
    format_id(prefix, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_max_based_not_count_based() {
        assert_eq!(next_costing_id(["CO-0001", "CO-0003", "CO-0002"]), "CO-0004");
        assert_eq!(next_costing_id(["CO-0007"]), "CO-0008");
    }

    #[test]
    fn test_empty_starts_at_one() {
        assert_eq!(next_costing_id(std::iter::empty()), "CO-0001");
    }

    #[test]
    fn test_invalid_ids_ignored() {
        let ids = ["CO-0002", "EMP-0099", "CO-", "CO-12a", "co-0050", "", "CO-0010"];
        assert_eq!(next_costing_id(ids), "CO-0011");
    }

    #[test]
    fn test_width_grows_past_9999() {
        assert_eq!(next_costing_id(["CO-9999"]), "CO-10000");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("CO-0042", "CO-"), Some(42));
        assert_eq!(parse_sequence(" CO-0042 ", "CO-"), Some(42));
        assert_eq!(parse_sequence("CO-+42", "CO-"), None);
        assert_eq!(parse_sequence("CO-42.0", "CO-"), None);
    }

    #[test]
    fn test_other_prefixes() {
        assert_eq!(next_id("EMP-", ["EMP-0004", "CO-0100"]), "EMP-0005");
    }

    #[test]
    fn test_fallback_uses_last_four_millisecond_digits() {
        let now = Utc.timestamp_millis_opt(1_718_000_123_456).unwrap();
        assert_eq!(fallback_id(COSTING_ID_PREFIX, now), "CO-3456");

        let now = Utc.timestamp_millis_opt(1_718_000_120_007).unwrap();
        assert_eq!(fallback_id(COSTING_ID_PREFIX, now), "CO-0007");
    }
}
