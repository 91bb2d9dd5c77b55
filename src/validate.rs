use crate::records::RawRecord;
use serde::Serialize;

pub const SONG_REQUIRED: &str = "Song title is required";
pub const ARTIST_REQUIRED: &str = "Artist name is required";
pub const PLAYS_AT_LEAST_ONE: &str = "Play count must be at least 1";
pub const DATETIME_REQUIRED: &str = "Date and time are required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Checks every rule independently and reports all violations in rule order.
/// Datetime parseability, album and play-count upper bounds are not checked.
pub fn validate_entry(record: &RawRecord) -> Validation {
    let mut errors = Vec::new();

    if record.song().is_none_or(|song| song.trim().is_empty()) {
        errors.push(SONG_REQUIRED.to_string());
    }
    if record.artist().is_none_or(|artist| artist.trim().is_empty()) {
        errors.push(ARTIST_REQUIRED.to_string());
    }
    if record.plays().is_none_or(|plays| plays < 1) {
        errors.push(PLAYS_AT_LEAST_ONE.to_string());
    }
    if record.datetime().is_none() {
        errors.push(DATETIME_REQUIRED.to_string());
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_collects_every_error() {
        let result = validate_entry(&RawRecord::new());
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                SONG_REQUIRED,
                ARTIST_REQUIRED,
                PLAYS_AT_LEAST_ONE,
                DATETIME_REQUIRED
            ]
        );
    }

    #[test]
    fn complete_record_is_valid() {
        let record = RawRecord::new()
            .with("song", "A")
            .with("artist", "B")
            .with("plays", 1)
            .with("datetime", "2025-01-01T00:00");
        assert_eq!(
            validate_entry(&record),
            Validation {
                valid: true,
                errors: Vec::new()
            }
        );
    }

    #[test]
    fn blank_text_and_non_positive_plays_fail() {
        let record = RawRecord::new()
            .with("song", "   ")
            .with("artist", "B")
            .with("plays", 0)
            .with("datetime", "whenever");
        let result = validate_entry(&record);
        assert_eq!(result.errors, vec![SONG_REQUIRED, PLAYS_AT_LEAST_ONE]);

        let negative = record.with("song", "A").with("plays", -4);
        assert_eq!(validate_entry(&negative).errors, vec![PLAYS_AT_LEAST_ONE]);
    }

    #[test]
    fn unparseable_datetime_still_passes() {
        let record = RawRecord::new()
            .with("song", "A")
            .with("artist", "B")
            .with("plays", 99_999)
            .with("datetime", "not a date");
        assert!(validate_entry(&record).valid);
    }

    #[test]
    fn non_numeric_plays_fail() {
        let record = RawRecord::new()
            .with("song", "A")
            .with("artist", "B")
            .with("plays", serde_json::Value::Null)
            .with("datetime", "2025-01-01");
        assert_eq!(validate_entry(&record).errors, vec![PLAYS_AT_LEAST_ONE]);
    }
}
