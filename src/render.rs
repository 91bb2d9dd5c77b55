use crate::datetime::format_datetime;
use crate::model::{AggregatedSong, ArtistTotal, Entry, ImportResult, Stats, UNKNOWN_ALBUM};
use std::fmt::Write;

const MAX_LISTED_ERRORS: usize = 10;
const SONG_COLUMN_WIDTH: usize = 48;

pub fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn chart_table(songs: &[AggregatedSong], total_entries: usize) -> String {
    if songs.is_empty() {
        return String::from("No songs to display yet. Add some entries to see your charts!\n");
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:<SONG_COLUMN_WIDTH$}  {:>9}", "Rank", "Song / Artist", "Plays");
    for (index, song) in songs.iter().enumerate() {
        let label = truncate_text(
            &format!("{} - {}", song.song, song.artist),
            SONG_COLUMN_WIDTH,
        );
        let _ = writeln!(
            out,
            "{:>5}  {:<SONG_COLUMN_WIDTH$}  {:>9}",
            format!("#{}", index + 1),
            label,
            format_number(song.plays)
        );
    }
    let _ = writeln!(
        out,
        "Showing {} of {} total entries",
        songs.len(),
        total_entries
    );
    out
}

pub fn artist_table(artists: &[ArtistTotal]) -> String {
    let mut out = String::new();
    for (index, artist) in artists.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5}  {:<SONG_COLUMN_WIDTH$}  {:>9}",
            format!("#{}", index + 1),
            truncate_text(&artist.artist, SONG_COLUMN_WIDTH),
            format_number(artist.plays)
        );
    }
    out
}

pub fn entry_list(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = write!(
            out,
            "{} by {}  |  {} plays",
            entry.song,
            entry.artist,
            format_number(entry.plays)
        );
        if entry.album != UNKNOWN_ALBUM {
            let _ = write!(out, "  |  {}", entry.album);
        }
        let _ = writeln!(out, "  |  {}", format_datetime(&entry.datetime));
    }
    out
}

pub fn stats_block(stats: &Stats) -> String {
    format!(
        "Total plays:    {}\nUnique songs:   {}\nUnique artists: {}\nTotal entries:  {}\n",
        format_number(stats.total_plays),
        format_number(stats.unique_songs as u64),
        format_number(stats.unique_artists as u64),
        format_number(stats.total_entries as u64)
    )
}

pub fn import_summary(result: &ImportResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} entries imported successfully", result.successful);
    if result.failed > 0 {
        let _ = writeln!(out, "{} entries failed", result.failed);
    }
    if result.successful > 0 && !result.persisted {
        let _ = writeln!(out, "Warning: imported entries could not be saved");
    }

    for error in result.errors.iter().take(MAX_LISTED_ERRORS) {
        let _ = write!(out, "  Row {}: {}", error.line, error.errors.join(", "));
        match error.entry.song() {
            Some(song) if !song.is_empty() => {
                let _ = writeln!(out, " ({song})");
            }
            _ => out.push('\n'),
        }
    }
    if result.errors.len() > MAX_LISTED_ERRORS {
        let _ = writeln!(
            out,
            "  ...and {} more errors",
            result.errors.len() - MAX_LISTED_ERRORS
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImportRowError;
    use crate::records::RawRecord;

    #[test]
    fn numbers_group_in_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a long song title", 10), "a long ...");
    }

    #[test]
    fn chart_lists_ranks_and_footer() {
        let songs = vec![AggregatedSong {
            song: String::from("Song"),
            artist: String::from("Band"),
            album: String::from(UNKNOWN_ALBUM),
            plays: 1_500,
            datetime: String::new(),
        }];
        let table = chart_table(&songs, 4);
        assert!(table.contains("#1"));
        assert!(table.contains("Song - Band"));
        assert!(table.contains("1,500"));
        assert!(table.ends_with("Showing 1 of 4 total entries\n"));
    }

    #[test]
    fn summary_caps_listed_errors() {
        let errors = (0..12)
            .map(|n| ImportRowError {
                line: n + 2,
                entry: RawRecord::new().with("song", format!("s{n}")),
                errors: vec![String::from("Artist name is required")],
            })
            .collect();
        let result = ImportResult {
            total: 12,
            successful: 0,
            failed: 12,
            errors,
            persisted: false,
        };
        let summary = import_summary(&result);
        assert!(summary.contains("Row 2: Artist name is required (s0)"));
        assert!(!summary.contains("Row 12:"));
        assert!(summary.contains("...and 2 more errors"));
    }
}
