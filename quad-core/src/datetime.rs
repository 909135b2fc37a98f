//! Datetime field normalization.
//!
//! The backend stores timestamps as UTC instants but form fields edit them as
//! local `YYYY-MM-DDTHH:MM` values. One rule applies in each direction:
//! outbound values get a trailing `Z` only if one is not already present,
//! inbound values get the `Z` stripped and are trimmed to minute precision.

use chrono::NaiveDateTime;

/// Append a trailing `Z` if absent. Idempotent.
pub fn ensure_utc_suffix(s: &str) -> String {
    if s.is_empty() || s.ends_with('Z') {
        s.to_string()
    } else {
        format!("{}Z", s)
    }
}

/// Normalize a stored timestamp for editing: strip a trailing `Z` and trim to
/// minute precision (`YYYY-MM-DDTHH:MM`, 16 characters).
pub fn local_datetime_value(s: &str) -> String {
    let no_z = s.strip_suffix('Z').unwrap_or(s);
    if no_z.len() >= 16 {
        no_z[..16].to_string()
    } else {
        no_z.to_string()
    }
}

/// Whether `s` is a well-formed ISO-8601 local datetime, with or without
/// seconds and with or without a trailing `Z`.
pub fn is_valid_local_datetime(s: &str) -> bool {
    let no_z = s.strip_suffix('Z').unwrap_or(s);
    NaiveDateTime::parse_from_str(no_z, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(no_z, "%Y-%m-%dT%H:%M").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn suffix_appended_only_when_absent() {
        assert_eq!(ensure_utc_suffix("2025-11-04T10:00"), "2025-11-04T10:00Z");
        assert_eq!(ensure_utc_suffix("2025-11-04T10:00Z"), "2025-11-04T10:00Z");
        assert_eq!(ensure_utc_suffix(""), "");
    }

    #[test]
    fn editor_value_strips_z_and_trims_seconds() {
        assert_eq!(
            local_datetime_value("2025-11-04T10:15:30Z"),
            "2025-11-04T10:15"
        );
        assert_eq!(local_datetime_value("2025-11-04T10:15"), "2025-11-04T10:15");
    }

    #[test]
    fn validity_accepts_both_precisions() {
        assert!(is_valid_local_datetime("2025-11-04T10:00:00"));
        assert!(is_valid_local_datetime("2025-11-04T10:00"));
        assert!(is_valid_local_datetime("2025-11-04T10:00:00Z"));
        assert!(!is_valid_local_datetime("2025-13-04T10:00"));
        assert!(!is_valid_local_datetime("not a date"));
    }

    proptest! {
        #[test]
        fn suffix_is_idempotent(y in 2000i32..2100, mo in 1u32..=12, d in 1u32..=28, h in 0u32..24, mi in 0u32..60) {
            let s = format!("{:04}-{:02}-{:02}T{:02}:{:02}", y, mo, d, h, mi);
            let once = ensure_utc_suffix(&s);
            let twice = ensure_utc_suffix(&once);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.ends_with('Z'));
        }

        #[test]
        fn round_trip_preserves_minutes(y in 2000i32..2100, mo in 1u32..=12, d in 1u32..=28, h in 0u32..24, mi in 0u32..60) {
            let s = format!("{:04}-{:02}-{:02}T{:02}:{:02}", y, mo, d, h, mi);
            let stored = ensure_utc_suffix(&s);
            prop_assert_eq!(local_datetime_value(&stored), s);
        }
    }
}
