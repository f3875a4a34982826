//! Timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_update`, token expiry, user records, etc.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_not_go_backwards_between_calls() {
        let first = now();
        let second = now();
        assert!(second >= first);
    }
}
