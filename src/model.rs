use crate::records::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

pub const UNKNOWN_ALBUM: &str = "Unknown Album";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub song: String,
    pub artist: String,
    #[serde(default = "default_album")]
    pub album: String,
    pub plays: u64,
    #[serde(default)]
    pub datetime: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    pub fn new(
        song: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        plays: u64,
        datetime: impl Into<String>,
    ) -> Self {
        Self {
            song: song.into(),
            artist: artist.into(),
            album: album_or_default(&album.into()),
            plays,
            datetime: datetime.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AggregatedSong {
    pub song: String,
    pub artist: String,
    pub album: String,
    pub plays: u64,
    pub datetime: String,
}

impl From<AggregatedSong> for Entry {
    fn from(song: AggregatedSong) -> Self {
        Self {
            song: song.song,
            artist: song.artist,
            album: song.album,
            plays: song.plays,
            datetime: song.datetime,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArtistTotal {
    pub artist: String,
    pub plays: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_plays: u64,
    pub unique_songs: usize,
    pub unique_artists: usize,
    pub total_entries: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportRowError {
    /// One-based row number in the uploaded file, counting the header row.
    pub line: usize,
    pub entry: RawRecord,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ImportResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
    pub persisted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ChartSize {
    #[default]
    Top10,
    Top20,
    Top100,
}

impl ChartSize {
    pub fn limit(self) -> usize {
        match self {
            Self::Top10 => 10,
            Self::Top20 => 20,
            Self::Top100 => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Top10 => "Top 10",
            Self::Top20 => "Top 20",
            Self::Top100 => "Top 100",
        }
    }

    pub fn from_limit(limit: usize) -> Option<Self> {
        match limit {
            10 => Some(Self::Top10),
            20 => Some(Self::Top20),
            100 => Some(Self::Top100),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_json_fixture")]
    pub json_fixture: Option<PathBuf>,
    #[serde(default = "default_csv_fixture")]
    pub csv_fixture: Option<PathBuf>,
    #[serde(default)]
    pub default_chart_size: ChartSize,
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
    #[serde(default = "default_top_artists_count")]
    pub top_artists_count: usize,
}

pub fn album_or_default(album: &str) -> String {
    let trimmed = album.trim();
    if trimmed.is_empty() {
        UNKNOWN_ALBUM.to_string()
    } else {
        album.to_string()
    }
}

fn default_album() -> String {
    UNKNOWN_ALBUM.to_string()
}

fn default_json_fixture() -> Option<PathBuf> {
    Some(PathBuf::from("data/2025.json"))
}

fn default_csv_fixture() -> Option<PathBuf> {
    Some(PathBuf::from("data/2025.csv"))
}

fn default_recent_count() -> usize {
    3
}

fn default_top_artists_count() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            json_fixture: default_json_fixture(),
            csv_fixture: default_csv_fixture(),
            default_chart_size: ChartSize::default(),
            recent_count: default_recent_count(),
            top_artists_count: default_top_artists_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_entry_keeps_unknown_fields() {
        let raw = r#"{"song":"A","artist":"B","plays":2,"datetime":"2025-01-01","mood":"calm"}"#;
        let entry: Entry = serde_json::from_str(raw).expect("parse");
        assert_eq!(entry.album, UNKNOWN_ALBUM);
        assert_eq!(entry.extra.get("mood"), Some(&Value::from("calm")));

        let back = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(back["mood"], "calm");
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"recent_count":5}"#).expect("parse");
        assert_eq!(settings.recent_count, 5);
        assert_eq!(settings.default_chart_size, ChartSize::Top10);
        assert_eq!(settings.json_fixture, Some(PathBuf::from("data/2025.json")));
    }

    #[test]
    fn chart_sizes_match_page_presets() {
        assert_eq!(ChartSize::from_limit(20), Some(ChartSize::Top20));
        assert_eq!(ChartSize::from_limit(15), None);
        assert_eq!(ChartSize::Top100.limit(), 100);
        assert_eq!(ChartSize::Top10.label(), "Top 10");
    }

    #[test]
    fn stats_serialize_in_camel_case() {
        let value = serde_json::to_value(Stats::default()).expect("serialize");
        assert_eq!(value["totalPlays"], 0);
        assert_eq!(value["uniqueArtists"], 0);
    }
}
