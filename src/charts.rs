use crate::datetime::parse_datetime;
use crate::model::{AggregatedSong, ArtistTotal, Entry, Stats};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationPolicy {
    /// Album and datetime come from the first entry seen for a key and are
    /// never replaced; plays are summed across all entries.
    #[default]
    FirstSeenDescriptiveSummedCounts,
}

/// Case-insensitive grouping identity. Only lower-casing is applied, so
/// accented and unaccented spellings stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongKey {
    song: String,
    artist: String,
}

impl SongKey {
    pub fn of(entry: &Entry) -> Self {
        Self {
            song: entry.song.to_lowercase(),
            artist: entry.artist.to_lowercase(),
        }
    }
}

fn artist_key(artist: &str) -> String {
    artist.to_lowercase()
}

pub fn aggregate_songs(entries: &[Entry]) -> Vec<AggregatedSong> {
    aggregate_songs_with(entries, AggregationPolicy::default())
}

pub fn aggregate_songs_with(entries: &[Entry], policy: AggregationPolicy) -> Vec<AggregatedSong> {
    let mut songs: Vec<AggregatedSong> = Vec::new();
    let mut lookup: HashMap<SongKey, usize> = HashMap::new();

    for entry in entries {
        match lookup.get(&SongKey::of(entry)).copied() {
            Some(index) => match policy {
                AggregationPolicy::FirstSeenDescriptiveSummedCounts => {
                    let song = &mut songs[index];
                    song.plays = song.plays.saturating_add(entry.plays);
                }
            },
            None => {
                lookup.insert(SongKey::of(entry), songs.len());
                songs.push(AggregatedSong {
                    song: entry.song.clone(),
                    artist: entry.artist.clone(),
                    album: entry.album.clone(),
                    plays: entry.plays,
                    datetime: entry.datetime.clone(),
                });
            }
        }
    }

    songs
}

/// Aggregated songs ranked by total plays. Ties keep first-seen order.
pub fn sort_songs_by_plays(entries: &[Entry], limit: Option<usize>) -> Vec<AggregatedSong> {
    let mut songs = aggregate_songs(entries);
    songs.sort_by(|a, b| b.plays.cmp(&a.plays));
    if let Some(limit) = limit {
        songs.truncate(limit);
    }
    songs
}

/// Newest entries first. Entries whose datetime does not parse sort after
/// every parseable one and keep their relative order.
pub fn get_recent_plays(entries: &[Entry], limit: usize) -> Vec<Entry> {
    let mut keyed: Vec<(Option<OffsetDateTime>, &Entry)> = entries
        .iter()
        .map(|entry| (parse_datetime(&entry.datetime), entry))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_newest_first(*a, *b));
    keyed
        .into_iter()
        .take(limit)
        .map(|(_, entry)| entry.clone())
        .collect()
}

fn compare_newest_first(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn filter_by_artist(entries: &[Entry], term: &str) -> Vec<Entry> {
    let needle = term.to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.artist.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Entries whose datetime falls within `[start, end]`. A bound that does not
/// parse matches nothing, and neither does an entry whose datetime does not
/// parse. A date-only `end` means midnight at the start of that day.
pub fn filter_by_date_range(entries: &[Entry], start: &str, end: &str) -> Vec<Entry> {
    let (Some(start), Some(end)) = (parse_datetime(start), parse_datetime(end)) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|entry| {
            parse_datetime(&entry.datetime).is_some_and(|at| at >= start && at <= end)
        })
        .cloned()
        .collect()
}

pub fn get_top_artists(entries: &[Entry], limit: usize) -> Vec<ArtistTotal> {
    let mut artists: Vec<ArtistTotal> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = artist_key(&entry.artist);
        match lookup.get(&key).copied() {
            Some(index) => {
                artists[index].plays = artists[index].plays.saturating_add(entry.plays);
            }
            None => {
                lookup.insert(key, artists.len());
                artists.push(ArtistTotal {
                    artist: entry.artist.clone(),
                    plays: entry.plays,
                });
            }
        }
    }

    artists.sort_by(|a, b| b.plays.cmp(&a.plays));
    artists.truncate(limit);
    artists
}

pub fn get_stats(entries: &[Entry]) -> Stats {
    if entries.is_empty() {
        return Stats::default();
    }

    let total_plays = entries
        .iter()
        .fold(0_u64, |sum, entry| sum.saturating_add(entry.plays));
    let unique_songs = entries.iter().map(SongKey::of).collect::<HashSet<_>>().len();
    let unique_artists = entries
        .iter()
        .map(|entry| artist_key(&entry.artist))
        .collect::<HashSet<_>>()
        .len();

    Stats {
        total_plays,
        unique_songs,
        unique_artists,
        total_entries: entries.len(),
    }
}
