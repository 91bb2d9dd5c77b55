use crate::error::Error;
use crate::model::{Entry, Settings};
use crate::records::{self, RawRecord, SourceKind};
use crate::store::LocalStore;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    pub json_fixture: Option<PathBuf>,
    pub csv_fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub json_entries: usize,
    pub csv_entries: usize,
    pub local_entries: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.json_entries + self.csv_entries + self.local_entries
    }
}

impl DataLoader {
    pub fn new(json_fixture: Option<PathBuf>, csv_fixture: Option<PathBuf>) -> Self {
        Self {
            json_fixture,
            csv_fixture,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.json_fixture.clone(), settings.csv_fixture.clone())
    }

    pub fn load(&self, store: &LocalStore) -> Vec<Entry> {
        self.load_with_report(store).0
    }

    pub fn load_with_report(&self, store: &LocalStore) -> (Vec<Entry>, LoadReport) {
        let mut entries = Vec::new();
        let mut report = LoadReport::default();

        if let Some(path) = &self.json_fixture {
            let found = load_fixture(path, SourceKind::Json);
            report.json_entries = found.len();
            entries.extend(found);
        }
        if let Some(path) = &self.csv_fixture {
            let found = load_fixture(path, SourceKind::Csv);
            report.csv_entries = found.len();
            entries.extend(found);
        }

        let local = store.load();
        report.local_entries = local.len();
        entries.extend(local);

        log::info!(
            "loaded {} entries from JSON, {} from CSV and {} from local store",
            report.json_entries,
            report.csv_entries,
            report.local_entries
        );
        (entries, report)
    }
}

fn load_fixture(path: &Path, kind: SourceKind) -> Vec<Entry> {
    match read_fixture(path, kind) {
        Ok(records) => records
            .iter()
            .filter_map(|record| {
                let entry = record.to_entry_lenient();
                if entry.is_none() {
                    log::warn!(
                        "skipping {} fixture record without song or artist: {}",
                        kind.label(),
                        serde_json::to_string(record).unwrap_or_default()
                    );
                }
                entry
            })
            .collect(),
        Err(err) => {
            log::warn!("{err}");
            Vec::new()
        }
    }
}

fn read_fixture(path: &Path, kind: SourceKind) -> Result<Vec<RawRecord>, Error> {
    let unavailable = |reason: String| Error::SourceUnavailable {
        origin: format!("{} fixture {}", kind.label(), path.display()),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|err| unavailable(err.to_string()))?;
    records::parse_document(&text, kind).map_err(|err| unavailable(err.to_string()))
}
