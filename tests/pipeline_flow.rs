use std::fs;
use tempfile::tempdir;
use tunechart::charts;
use tunechart::import;
use tunechart::loader::DataLoader;
use tunechart::model::Entry;
use tunechart::records::RawRecord;
use tunechart::store::{FileBackend, LocalStore};

#[test]
fn csv_upload_feeds_charts() {
    let dir = tempdir().expect("tempdir");
    let fixture = dir.path().join("2025.json");
    fs::write(
        &fixture,
        r#"[
            {"song":"Everlong","artist":"Foo Fighters","album":"The Colour and the Shape","plays":10,"datetime":"2025-01-03T20:00"},
            {"song":"Creep","artist":"Radiohead","plays":4,"datetime":"2025-01-04T21:00"}
        ]"#,
    )
    .expect("write fixture");

    let upload = dir.path().join("upload.CSV");
    fs::write(
        &upload,
        "song,artist,album,plays,datetime\n\
         everlong,FOO FIGHTERS,Greatest Hits,7,2025-02-01T10:00\n\
         \"Paranoid Android\",Radiohead,,,2025-02-02T10:00\n\
         Karma Police,Radiohead,OK Computer,5,2025-02-03T10:00\n",
    )
    .expect("write upload");

    let mut store = LocalStore::new(FileBackend::new(dir.path().join("state")));
    let result = import::import_file(&mut store, &upload).expect("import");
    assert_eq!(result.total, 3);
    assert_eq!(result.successful, 2);
    assert_eq!(result.errors[0].line, 3);

    let loader = DataLoader::new(Some(fixture), Some(dir.path().join("absent.csv")));
    let entries = loader.load(&store);
    assert_eq!(entries.len(), 4);

    let top = charts::sort_songs_by_plays(&entries, Some(2));
    assert_eq!(top[0].song, "Everlong");
    assert_eq!(top[0].plays, 17);
    assert_eq!(top[0].album, "The Colour and the Shape");
    assert_eq!(top[1].song, "Karma Police");

    let stats = charts::get_stats(&entries);
    assert_eq!(stats.total_plays, 26);
    assert_eq!(stats.unique_songs, 3);
    assert_eq!(stats.unique_artists, 2);
}

#[test]
fn failed_json_fixture_still_yields_local_entries() {
    let dir = tempdir().expect("tempdir");
    let mut store = LocalStore::new(FileBackend::new(dir.path()));
    store
        .save(&[
            Entry::new("One", "A", "", 1, "2025-01-01T00:00"),
            Entry::new("Two", "B", "", 2, "2025-01-02T00:00"),
        ])
        .expect("seed");

    let broken = dir.path().join("2025.json");
    fs::write(&broken, "{ not an array").expect("write");

    let entries = DataLoader::new(Some(broken), None).load(&store);
    assert_eq!(entries.len(), 2);
}

#[test]
fn import_appends_to_existing_store_in_one_write() {
    let dir = tempdir().expect("tempdir");
    let mut store = LocalStore::new(FileBackend::new(dir.path()));
    store
        .append(Entry::new("Before", "X", "", 1, "2025-01-01T00:00"))
        .expect("seed");

    let record = |song: &str, artist: &str| {
        RawRecord::new()
            .with("song", song)
            .with("artist", artist)
            .with("plays", 1)
            .with("datetime", "2025-03-01T00:00")
    };
    let result = import::import_records(
        &mut store,
        vec![record("A", "One"), record("B", ""), record("C", "Three")],
    );

    assert_eq!((result.total, result.successful, result.failed), (3, 2, 1));
    assert_eq!(result.errors[0].line, 3);

    let reopened = LocalStore::new(FileBackend::new(dir.path()));
    let songs: Vec<String> = reopened.load().into_iter().map(|e| e.song).collect();
    assert_eq!(songs, vec!["Before", "A", "C"]);
    assert_eq!(
        reopened
            .recent_additions(3)
            .into_iter()
            .map(|e| e.song)
            .collect::<Vec<_>>(),
        vec!["C", "A", "Before"]
    );
}
