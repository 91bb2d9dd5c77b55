use anyhow::Context;
use std::path::PathBuf;
use tunechart::import::{self, ManualEntry};
use tunechart::loader::DataLoader;
use tunechart::model::{ChartSize, Settings};
use tunechart::store::{FileBackend, LocalStore};
use tunechart::{charts, config, csv, datetime, render};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Charts { top: Option<usize>, artist: Option<String> },
    Artists { top: Option<usize> },
    Recent { limit: usize },
    Stats,
    Range { start: String, end: String },
    Add(AddArgs),
    Import { path: PathBuf },
    Additions,
    Export,
    Clear,
    Init,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct AddArgs {
    song: String,
    artist: String,
    album: String,
    plays: Option<String>,
    date: Option<String>,
    time: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    verbose: bool,
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    run(args.command)
}

fn run(command: Command) -> anyhow::Result<()> {
    let settings = config::load_settings()?;
    let mut store = open_store();
    let loader = DataLoader::from_settings(&settings);

    match command {
        Command::Charts { top, artist } => {
            let entries = loader.load(&store);
            let scoped = match artist.as_deref() {
                Some(term) if !term.trim().is_empty() => charts::filter_by_artist(&entries, term),
                _ => entries.clone(),
            };
            let limit = top.unwrap_or(settings.default_chart_size.limit());
            let songs = charts::sort_songs_by_plays(&scoped, Some(limit));
            if let Some(size) = ChartSize::from_limit(limit) {
                println!("{}", size.label());
            }
            print!("{}", render::chart_table(&songs, entries.len()));
        }
        Command::Artists { top } => {
            let entries = loader.load(&store);
            let artists =
                charts::get_top_artists(&entries, top.unwrap_or(settings.top_artists_count));
            print!("{}", render::artist_table(&artists));
        }
        Command::Recent { limit } => {
            let entries = loader.load(&store);
            print!("{}", render::entry_list(&charts::get_recent_plays(&entries, limit)));
        }
        Command::Stats => {
            let entries = loader.load(&store);
            print!("{}", render::stats_block(&charts::get_stats(&entries)));
        }
        Command::Range { start, end } => {
            let entries = loader.load(&store);
            let in_range = charts::filter_by_date_range(&entries, &start, &end);
            let songs = charts::sort_songs_by_plays(&in_range, None);
            print!("{}", render::chart_table(&songs, in_range.len()));
        }
        Command::Add(add) => {
            let form = manual_entry(add);
            let entry = import::submit_entry(&mut store, &form)?;
            println!("Successfully added \"{}\" by {}!", entry.song, entry.artist);
            print_additions(&store, &settings);
        }
        Command::Import { path } => {
            let result = import::import_file(&mut store, &path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            print!("{}", render::import_summary(&result));
            print_additions(&store, &settings);
        }
        Command::Additions => print_additions(&store, &settings),
        Command::Export => {
            println!("song,artist,album,plays,datetime");
            for entry in store.load() {
                let fields = [
                    entry.song,
                    entry.artist,
                    entry.album,
                    entry.plays.to_string(),
                    entry.datetime,
                ];
                if fields.iter().any(|field| field.contains(['\n', '\r'])) {
                    log::warn!("flattening line breaks in \"{}\" for export", fields[0]);
                }
                let fields = fields.map(|field| csv::single_line(&field));
                println!("{}", csv::join_line(&fields));
            }
        }
        Command::Clear => {
            store.clear()?;
            println!("Local entries cleared");
        }
        Command::Init => {
            config::save_settings(&Settings::default())?;
            println!("Wrote {}", config::settings_path()?.display());
        }
    }
    Ok(())
}

fn open_store() -> LocalStore {
    match config::ensure_config_dir() {
        Ok(root) => LocalStore::new(FileBackend::new(root)),
        Err(err) => {
            log::warn!("local store unavailable, using memory only: {err:#}");
            LocalStore::in_memory()
        }
    }
}

fn print_additions(store: &LocalStore, settings: &Settings) {
    let recent = store.recent_additions(settings.recent_count);
    if recent.is_empty() {
        return;
    }
    println!("\nRecently added:");
    print!("{}", render::entry_list(&recent));
}

fn manual_entry(add: AddArgs) -> ManualEntry {
    let (today, now) = datetime::now_date_time_parts();
    ManualEntry {
        song: add.song,
        artist: add.artist,
        album: add.album,
        plays: add.plays.unwrap_or_else(|| String::from("1")),
        date: add.date.unwrap_or(today),
        time: add.time.unwrap_or(now),
    }
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut verbose = false;
    let mut rest = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => rest.push(arg),
        }
    }

    let Some((name, options)) = rest.split_first() else {
        anyhow::bail!("missing command; try --help");
    };
    let command = match name.as_str() {
        "charts" => {
            let mut top = None;
            let mut artist = None;
            let mut index = 0;
            while index < options.len() {
                match options[index].as_str() {
                    "--top" => top = Some(parse_count("--top", value_after(options, &mut index)?)?),
                    "--artist" => artist = Some(value_after(options, &mut index)?.to_string()),
                    other => anyhow::bail!("unknown argument {other}"),
                }
                index += 1;
            }
            Command::Charts { top, artist }
        }
        "artists" => {
            let mut top = None;
            let mut index = 0;
            while index < options.len() {
                match options[index].as_str() {
                    "--top" => top = Some(parse_count("--top", value_after(options, &mut index)?)?),
                    other => anyhow::bail!("unknown argument {other}"),
                }
                index += 1;
            }
            Command::Artists { top }
        }
        "recent" => {
            let mut limit = 5;
            let mut index = 0;
            while index < options.len() {
                match options[index].as_str() {
                    "--limit" => limit = parse_count("--limit", value_after(options, &mut index)?)?,
                    other => anyhow::bail!("unknown argument {other}"),
                }
                index += 1;
            }
            Command::Recent { limit }
        }
        "stats" => Command::Stats,
        "range" => match options {
            [start, end] => Command::Range {
                start: start.clone(),
                end: end.clone(),
            },
            _ => anyhow::bail!("range requires START and END dates"),
        },
        "add" => {
            let mut add = AddArgs::default();
            let mut index = 0;
            while index < options.len() {
                let flag = options[index].as_str();
                let value = value_after(options, &mut index)?.to_string();
                match flag {
                    "--song" => add.song = value,
                    "--artist" => add.artist = value,
                    "--album" => add.album = value,
                    "--plays" => add.plays = Some(value),
                    "--date" => add.date = Some(value),
                    "--time" => add.time = Some(value),
                    other => anyhow::bail!("unknown argument {other}"),
                }
                index += 1;
            }
            Command::Add(add)
        }
        "import" => match options {
            [path] => Command::Import {
                path: PathBuf::from(path),
            },
            _ => anyhow::bail!("import requires exactly one FILE"),
        },
        "additions" => Command::Additions,
        "export" => Command::Export,
        "clear" => Command::Clear,
        "init" => Command::Init,
        other => anyhow::bail!("unknown command {other}"),
    };

    Ok(CliArgs { verbose, command })
}

fn value_after<'a>(options: &'a [String], index: &mut usize) -> anyhow::Result<&'a str> {
    let flag = &options[*index];
    *index += 1;
    let Some(value) = options.get(*index) else {
        anyhow::bail!("{flag} requires a value");
    };
    Ok(value.as_str())
}

fn parse_count(flag: &str, value: &str) -> anyhow::Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{flag} expects a whole number, got {value}"))
}

fn print_help() {
    println!("tunechart");
    println!("  charts [--top N] [--artist TERM]   Top songs by plays");
    println!("  artists [--top N]                  Top artists by plays");
    println!("  recent [--limit N]                 Most recent plays");
    println!("  stats                              Totals across all sources");
    println!("  range START END                    Chart for a date range");
    println!("  add --song S --artist A [--album AL] [--plays N] [--date D] [--time T]");
    println!("  import FILE                        Import a .json or .csv file");
    println!("  additions                          Recently added local entries");
    println!("  export                             Print local entries as CSV, one line each");
    println!("                                     (line breaks become spaces; import trims values)");
    println!("  clear                              Remove all local entries");
    println!("  init                               Write default settings");
    println!("  -v, --verbose                      Debug logging");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_charts_with_options() {
        let parsed = parse_args(args(&["charts", "--top", "20", "--artist", "muse"])).expect("parse");
        assert_eq!(
            parsed.command,
            Command::Charts {
                top: Some(20),
                artist: Some(String::from("muse"))
            }
        );
    }

    #[test]
    fn verbose_flag_can_appear_anywhere() {
        let parsed = parse_args(args(&["stats", "--verbose"])).expect("parse");
        assert!(parsed.verbose);
        assert_eq!(parsed.command, Command::Stats);
    }

    #[test]
    fn add_collects_form_fields() {
        let parsed = parse_args(args(&[
            "add", "--song", "Song", "--artist", "Band", "--plays", "4",
        ]))
        .expect("parse");
        let Command::Add(add) = parsed.command else {
            panic!("expected add");
        };
        assert_eq!(add.song, "Song");
        assert_eq!(add.plays.as_deref(), Some("4"));
        assert_eq!(add.date, None);
    }

    #[test]
    fn rejects_missing_values_and_unknown_commands() {
        assert!(parse_args(args(&["charts", "--top"])).is_err());
        assert!(parse_args(args(&["charts", "--top", "ten"])).is_err());
        assert!(parse_args(args(&["dance"])).is_err());
        assert!(parse_args(Vec::new()).is_err());
    }
}
