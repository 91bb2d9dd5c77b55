use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

const LOCAL_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const MINUTE_ZULU_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]Z");
const MINUTE_OFFSET_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
);

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month repr:short] [day padding:none], [year], [hour repr:12]:[minute] [period]"
);

/// Parses an ISO-like timestamp. Returns `None` for anything unparseable.
pub fn parse_datetime(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, MINUTE_OFFSET_FORMAT) {
        return Some(parsed);
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(raw, MINUTE_ZULU_FORMAT) {
        return Some(parsed.assume_utc());
    }

    for format in LOCAL_FORMATS {
        if let Ok(parsed) = PrimitiveDateTime::parse(raw, *format) {
            return Some(parsed.assume_utc());
        }
    }

    Date::parse(raw, DATE_FORMAT)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

pub fn combine_date_time(date: &str, time: &str) -> String {
    format!("{}T{}", date.trim(), time.trim())
}

pub fn now_date_time_parts() -> (String, String) {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let date = now.format(DATE_FORMAT).unwrap_or_default();
    let time = now.format(TIME_FORMAT).unwrap_or_default();
    (date, time)
}

pub fn format_datetime(raw: &str) -> String {
    parse_datetime(raw)
        .and_then(|parsed| parsed.format(DISPLAY_FORMAT).ok())
        .unwrap_or_else(|| raw.to_string())
}
