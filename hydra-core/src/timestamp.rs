use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

/// Format EXIF uses for `DateTimeDigitized`: `"2020:07:04 10:00:00"`.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Parses an `EXIF DateTimeDigitized` value into a naive local datetime.
/// Returns `None` on any malformed or placeholder (`"0000:00:00 00:00:00"`)
/// value, which the caller treats the same as a missing tag.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT).ok()
}

/// `YYYYMMDD` for a naive datetime (date-mover's destination folder name).
pub fn date_key(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%d").to_string()
}

/// `HHMMSS` for a naive datetime (renamer's proposed basename stem).
pub fn time_key(dt: &NaiveDateTime) -> String {
    dt.format("%H%M%S").to_string()
}

/// Renamer's sentinel for "no usable EXIF time" (§4.8).
pub const RENAME_FALLBACK_STEM: &str = "000000";

/// `YYYYMMDD` derived from a file's mtime, used as the date-mover's fallback
/// when no EXIF `DateTimeDigitized` is present.
pub fn mtime_date_key(metadata: &Metadata) -> std::io::Result<String> {
    let modified = metadata.modified()?;
    Ok(date_key(&system_time_to_naive_local(modified)))
}

fn system_time_to_naive_local(time: SystemTime) -> NaiveDateTime {
    let dt: DateTime<Local> = time.into();
    dt.naive_local()
}

/// `YYYYMMDD_HHMM` timestamp used to name the indexer's SQLite file and the
/// per-run log file (§6), computed once at process start.
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_exif_datetime() {
        let dt = parse_exif_datetime("2020:07:04 10:00:00").unwrap();
        assert_eq!(date_key(&dt), "20200704");
        assert_eq!(time_key(&dt), "100000");
    }

    #[test]
    fn rejects_malformed_exif_datetime() {
        assert!(parse_exif_datetime("not a date").is_none());
        assert!(parse_exif_datetime("").is_none());
    }

    #[test]
    fn run_stamp_has_expected_shape() {
        let now: DateTime<Local> = "2024-03-05T08:30:00Z".parse::<DateTime<chrono::Utc>>().unwrap().into();
        let stamp = run_stamp(now);
        assert_eq!(stamp.len(), "YYYYMMDD_HHMM".len());
        assert!(stamp.contains('_'));
    }
}
