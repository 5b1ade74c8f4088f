//! Small shared helpers: id generation and timestamp parsing.

mod timestamps;

pub use timestamps::{
    format_iso8601, iso_timestamp, now_utc, parse_timestamp, parse_unix_timestamp, TimestampError,
};

use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_v4() {
        let id = generate_uuid();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_generated_uuids_differ() {
        assert_ne!(generate_uuid(), generate_uuid());
    }
}
