#![no_main]

use libfuzzer_sys::fuzz_target;
use tunechart::csv::{join_line, tokenize_line};
use tunechart::import::import_records;
use tunechart::records::{SourceKind, parse_document};
use tunechart::store::LocalStore;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for line in text.lines() {
        let fields = tokenize_line(line);
        assert!(!fields.is_empty());
        if !line.contains('\r') {
            assert_eq!(tokenize_line(&join_line(&fields)), fields);
        }
    }

    if let Ok(records) = parse_document(text, SourceKind::Csv) {
        let total = records.len();
        let mut store = LocalStore::in_memory();
        let result = import_records(&mut store, records);
        assert_eq!(result.successful + result.failed, total);
        assert_eq!(store.load().len(), result.successful);
    }
});
