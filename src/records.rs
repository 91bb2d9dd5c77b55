use crate::csv::tokenize_line;
use crate::error::{Error, Result};
use crate::model::{Entry, UNKNOWN_ALBUM, album_or_default};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const REQUIRED_CSV_HEADERS: &[&str] = &["song", "artist", "plays", "datetime"];

const SONG_KEYS: &[&str] = &["song", "title", "track"];
const ARTIST_KEYS: &[&str] = &["artist", "performer"];
const ALBUM_KEYS: &[&str] = &["album", "record"];
const PLAYS_KEYS: &[&str] = &["plays", "playcount", "play_count", "count"];
const DATETIME_KEYS: &[&str] = &["datetime", "timestamp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Json,
    Csv,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::format(
                "Unsupported file format. Please use JSON or CSV.",
            )),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }

    pub fn song(&self) -> Option<String> {
        self.first_present(SONG_KEYS).and_then(value_text)
    }

    pub fn artist(&self) -> Option<String> {
        self.first_present(ARTIST_KEYS).and_then(value_text)
    }

    pub fn album(&self) -> Option<String> {
        self.first_present(ALBUM_KEYS).and_then(value_text)
    }

    /// Play count as a signed integer; `None` when absent or non-numeric.
    pub fn plays(&self) -> Option<i64> {
        match self.first_present(PLAYS_KEYS)? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|n| n.is_finite())
                        .map(|n| n.trunc() as i64)
                }),
            Value::String(text) => parse_leading_int(text),
            _ => None,
        }
    }

    /// The timestamp text, combining separate `date` and `time` fields when no
    /// single timestamp key is present. Falsy values count as missing.
    pub fn datetime(&self) -> Option<String> {
        if let Some(value) = self.first_present(DATETIME_KEYS) {
            return value_text(value).filter(|text| !text.is_empty());
        }

        let date = self.get("date").and_then(value_text).filter(|d| !d.is_empty())?;
        match self.get("time").and_then(value_text).filter(|t| !t.is_empty()) {
            Some(time) => Some(crate::datetime::combine_date_time(&date, &time)),
            None => Some(date),
        }
    }

    fn extras(&self) -> Map<String, Value> {
        let consumed = |key: &str| {
            SONG_KEYS
                .iter()
                .chain(ARTIST_KEYS)
                .chain(ALBUM_KEYS)
                .chain(PLAYS_KEYS)
                .chain(DATETIME_KEYS)
                .chain(&["date", "time"])
                .any(|known| *known == key)
        };
        self.0
            .iter()
            .filter(|(key, _)| !consumed(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn to_entry(&self) -> Option<Entry> {
        let plays = u64::try_from(self.plays()?).ok().filter(|n| *n >= 1)?;
        Some(Entry {
            song: self.song()?,
            artist: self.artist()?,
            album: album_or_default(&self.album().unwrap_or_default()),
            plays,
            datetime: self.datetime()?,
            extra: self.extras(),
        })
    }

    /// Best-effort conversion for fixture data, which is never validated.
    /// Only song and artist are needed to place the record in a chart.
    pub fn to_entry_lenient(&self) -> Option<Entry> {
        let song = self.song()?;
        let artist = self.artist()?;
        let plays = self
            .plays()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0);
        Some(Entry {
            song,
            artist,
            album: album_or_default(&self.album().unwrap_or_default()),
            plays,
            datetime: self.datetime().unwrap_or_default(),
            extra: self.extras(),
        })
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reads an optional sign followed by leading digits, ignoring anything after
/// them: `" 12abc"` is 12, `"abc"` is `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

pub fn parse_document(text: &str, kind: SourceKind) -> Result<Vec<RawRecord>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    match kind {
        SourceKind::Json => parse_json(text),
        SourceKind::Csv => parse_csv(text),
    }
}

pub fn parse_file(path: &Path) -> Result<Vec<RawRecord>> {
    let kind = SourceKind::from_path(path)?;
    let text = fs::read_to_string(path)
        .map_err(|err| Error::format(format!("Failed to read file: {err}")))?;
    let records = parse_document(&text, kind)?;
    log::debug!(
        "parsed {} {} records from {}",
        records.len(),
        kind.label(),
        path.display()
    );
    Ok(records)
}

fn parse_json(text: &str) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| Error::format(format!("Invalid JSON format: {err}")))?;
    let Value::Array(items) = value else {
        return Err(Error::format("JSON file must contain an array of entries"));
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => RawRecord(map),
            _ => RawRecord::new(),
        })
        .collect())
}

fn parse_csv(text: &str) -> Result<Vec<RawRecord>> {
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(Error::format(
            "CSV file must have a header row and at least one data row",
        ));
    }

    let headers: Vec<String> = tokenize_line(lines[0])
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    let missing: Vec<&str> = REQUIRED_CSV_HEADERS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|header| header == required))
        .collect();
    if !missing.is_empty() {
        return Err(Error::format(format!(
            "CSV missing required headers: {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::with_capacity(lines.len() - 1);
    for line in &lines[1..] {
        let values = tokenize_line(line);
        if values.is_empty() {
            continue;
        }

        let mut record = RawRecord::new();
        for (index, header) in headers.iter().enumerate() {
            let value = values
                .get(index)
                .map(|value| value.trim().to_string())
                .unwrap_or_default();
            record.insert(header.clone(), value);
        }

        if let Some(Value::String(plays)) = record.get("plays").cloned() {
            if !plays.is_empty() {
                let coerced = parse_leading_int(&plays).map_or(Value::Null, Value::from);
                record.insert("plays", coerced);
            }
        }

        let album_blank = record
            .get("album")
            .and_then(Value::as_str)
            .is_none_or(|album| album.trim().is_empty());
        if album_blank {
            record.insert("album", UNKNOWN_ALBUM);
        }

        records.push(record);
    }

    Ok(records)
}
