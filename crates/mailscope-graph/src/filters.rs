//! OData filter expression helpers
//!
//! The client passes filter strings through to `$filter` untouched; these
//! builders only make the common investigation queries harder to mistype.

use chrono::{DateTime, SecondsFormat, Utc};

/// Messages received at or after the given instant
pub fn received_after(instant: DateTime<Utc>) -> String {
    format!("receivedDateTime ge {}", timestamp(instant))
}

/// Messages received in the half-open window `[start, end)`
pub fn received_between(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "receivedDateTime ge {} and receivedDateTime lt {}",
        timestamp(start),
        timestamp(end)
    )
}

/// Folders with the given display name
pub fn display_name_equals(name: &str) -> String {
    format!("displayName eq '{}'", escape(name))
}

/// Messages with the given exact subject
pub fn subject_equals(subject: &str) -> String {
    format!("subject eq '{}'", escape(subject))
}

/// Messages sent from the given address
pub fn from_address(address: &str) -> String {
    format!("from/emailAddress/address eq '{}'", escape(address))
}

/// Unread messages only
pub fn is_unread() -> String {
    "isRead eq false".to_string()
}

/// Combine clauses with a logical `and`
pub fn and(clauses: &[String]) -> String {
    clauses.join(" and ")
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Single quotes inside OData string literals are doubled
fn escape(literal: &str) -> String {
    literal.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_received_after() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 1, 12, 30, 0).unwrap();
        assert_eq!(
            received_after(instant),
            "receivedDateTime ge 2025-08-01T12:30:00Z"
        );
    }

    #[test]
    fn test_received_between() {
        let start = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        assert_eq!(
            received_between(start, end),
            "receivedDateTime ge 2025-07-01T00:00:00Z and receivedDateTime lt 2025-08-01T00:00:00Z"
        );
    }

    #[test]
    fn test_display_name_equals() {
        assert_eq!(display_name_equals("Inbox"), "displayName eq 'Inbox'");
    }

    #[test]
    fn test_subject_escapes_single_quotes() {
        assert_eq!(subject_equals("it's urgent"), "subject eq 'it''s urgent'");
    }

    #[test]
    fn test_and_composition() {
        let clauses = [is_unread(), from_address("alerts@contoso.com")];
        assert_eq!(
            and(&clauses),
            "isRead eq false and from/emailAddress/address eq 'alerts@contoso.com'"
        );
    }
}
