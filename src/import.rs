use crate::datetime::combine_date_time;
use crate::error::{Error, Result};
use crate::model::{Entry, ImportResult, ImportRowError};
use crate::records::{self, RawRecord};
use crate::store::LocalStore;
use crate::validate::validate_entry;
use std::path::Path;

pub const SAVE_FAILED: &str = "Failed to save entry. Please try again.";

/// Row number reported for a record at `index`: one-based, after the header.
const LINE_OFFSET: usize = 2;

/// Validates each record in order and saves the valid ones in a single write.
/// Invalid records never abort the batch.
pub fn import_records(store: &mut LocalStore, records: Vec<RawRecord>) -> ImportResult {
    let mut result = ImportResult {
        total: records.len(),
        ..ImportResult::default()
    };
    let mut working = store.load();

    for (index, record) in records.into_iter().enumerate() {
        let validation = validate_entry(&record);
        let entry = if validation.valid {
            record.to_entry()
        } else {
            None
        };

        match entry {
            Some(entry) => {
                working.push(entry);
                result.successful += 1;
            }
            None => {
                result.failed += 1;
                result.errors.push(ImportRowError {
                    line: index + LINE_OFFSET,
                    entry: record,
                    errors: validation.errors,
                });
            }
        }
    }

    if result.successful > 0 {
        result.persisted = match store.save(&working) {
            Ok(()) => true,
            Err(err) => {
                log::error!("import of {} entries was not saved: {err}", result.successful);
                false
            }
        };
    }

    log::info!(
        "imported {} of {} entries ({} failed)",
        result.successful,
        result.total,
        result.failed
    );
    result
}

/// Parses an uploaded file and imports its records. Format problems abort the
/// import before anything is written.
pub fn import_file(store: &mut LocalStore, path: &Path) -> Result<ImportResult> {
    let records = records::parse_file(path).inspect_err(|err| {
        log::error!("file upload error for {}: {err}", path.display());
    })?;
    Ok(import_records(store, records))
}

#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    pub song: String,
    pub artist: String,
    pub album: String,
    pub plays: String,
    pub date: String,
    pub time: String,
}

impl ManualEntry {
    pub fn to_record(&self) -> RawRecord {
        let plays = records::parse_leading_int(&self.plays)
            .map_or(serde_json::Value::Null, serde_json::Value::from);
        RawRecord::new()
            .with("song", self.song.trim())
            .with("artist", self.artist.trim())
            .with("album", crate::model::album_or_default(self.album.trim()))
            .with("plays", plays)
            .with("datetime", combine_date_time(&self.date, &self.time))
    }
}

pub fn submit_entry(store: &mut LocalStore, form: &ManualEntry) -> Result<Entry> {
    let record = form.to_record();
    let validation = validate_entry(&record);
    if !validation.valid {
        return Err(Error::Validation(validation.errors));
    }
    let entry = record
        .to_entry()
        .ok_or_else(|| Error::Validation(validation.errors.clone()))?;

    store
        .append(entry.clone())
        .map_err(|_| Error::storage(SAVE_FAILED))?;
    log::info!("added \"{}\" by {}", entry.song, entry.artist);
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNKNOWN_ALBUM;
    use crate::store::MemoryBackend;
    use crate::validate::ARTIST_REQUIRED;

    fn record(song: &str, artist: &str) -> RawRecord {
        RawRecord::new()
            .with("song", song)
            .with("artist", artist)
            .with("plays", 2)
            .with("datetime", "2025-01-01T00:00")
    }

    #[test]
    fn partial_batch_saves_only_valid_records() {
        let mut store = LocalStore::in_memory();
        store
            .append(Entry::new("Existing", "Someone", "", 1, "2024-12-01T00:00"))
            .expect("seed");

        let result = import_records(
            &mut store,
            vec![
                record("One", "A"),
                record("Two", ""),
                record("Three", "C"),
            ],
        );

        assert_eq!(result.total, 3);
        assert_eq!(result.successful, 2);
        assert_eq!(result.failed, 1);
        assert!(result.persisted);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 3);
        assert_eq!(result.errors[0].errors, vec![ARTIST_REQUIRED]);

        let songs: Vec<String> = store.load().into_iter().map(|e| e.song).collect();
        assert_eq!(songs, vec!["Existing", "One", "Three"]);
    }

    #[test]
    fn blank_album_defaults_on_import() {
        let mut store = LocalStore::in_memory();
        import_records(&mut store, vec![record("One", "A").with("album", "  ")]);
        assert_eq!(store.load()[0].album, UNKNOWN_ALBUM);
    }

    #[test]
    fn all_invalid_batch_writes_nothing() {
        let mut store = LocalStore::in_memory();
        let result = import_records(&mut store, vec![RawRecord::new()]);
        assert_eq!(result.failed, 1);
        assert!(!result.persisted);
        assert!(store.load().is_empty());
    }

    #[test]
    fn failed_batch_write_keeps_previous_contents() {
        let mut store = LocalStore::new(MemoryBackend::with_quota(200));
        store
            .append(Entry::new("Kept", "A", "", 1, "2025-01-01T00:00"))
            .expect("seed");

        let batch = (0..20).map(|n| record(&format!("song {n}"), "B")).collect();
        let result = import_records(&mut store, batch);

        assert_eq!(result.successful, 20);
        assert!(!result.persisted);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn unsupported_upload_is_surfaced() {
        let mut store = LocalStore::in_memory();
        let err = import_file(&mut store, Path::new("plays.txt")).expect_err("txt");
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn manual_entry_combines_date_and_time() {
        let mut store = LocalStore::in_memory();
        let form = ManualEntry {
            song: String::from("  Song "),
            artist: String::from("Artist"),
            album: String::new(),
            plays: String::from("3"),
            date: String::from("2025-04-01"),
            time: String::from("18:30"),
        };

        let entry = submit_entry(&mut store, &form).expect("submit");
        assert_eq!(entry.song, "Song");
        assert_eq!(entry.album, UNKNOWN_ALBUM);
        assert_eq!(entry.datetime, "2025-04-01T18:30");
        assert_eq!(store.load(), vec![entry]);
    }

    #[test]
    fn invalid_manual_entry_reports_every_reason() {
        let mut store = LocalStore::in_memory();
        let form = ManualEntry {
            plays: String::from("0"),
            date: String::from("2025-04-01"),
            time: String::from("18:30"),
            ..ManualEntry::default()
        };
        let err = submit_entry(&mut store, &form).expect_err("invalid");
        assert_eq!(
            err.to_string(),
            "Song title is required. Artist name is required. Play count must be at least 1"
        );
        assert!(store.load().is_empty());
    }

    #[test]
    fn manual_entry_write_failure_is_reported() {
        let mut store = LocalStore::new(MemoryBackend::with_quota(10));
        let form = ManualEntry {
            song: String::from("Song"),
            artist: String::from("Artist"),
            plays: String::from("1"),
            date: String::from("2025-04-01"),
            time: String::from("18:30"),
            ..ManualEntry::default()
        };
        let err = submit_entry(&mut store, &form).expect_err("quota");
        assert_eq!(err, Error::Storage(String::from(SAVE_FAILED)));
    }
}
