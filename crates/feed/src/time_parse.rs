// ABOUTME: Flexible date parsing for RSS/Atom/RDF feed dates.
// ABOUTME: Tries RFC 3339, RFC 2822, named zones, and common malformed variants.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Named zone abbreviations seen in the wild, with their offsets in seconds.
/// Ambiguous abbreviations resolve to the first entry.
const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UTC", 0),
    ("UT", 0),
    ("Z", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("AKST", -9 * 3600),
    ("AKDT", -8 * 3600),
    ("HST", -10 * 3600),
    ("AST", -4 * 3600),
    ("ADT", -3 * 3600),
    ("NST", -(3 * 3600 + 30 * 60)),
    ("NDT", -(2 * 3600 + 30 * 60)),
    ("WET", 0),
    ("WEST", 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("EET", 2 * 3600),
    ("EEST", 3 * 3600),
    ("BST", 3600),
    ("MSK", 3 * 3600),
    ("IST", 5 * 3600 + 30 * 60),
    ("JST", 9 * 3600),
    ("KST", 9 * 3600),
    ("AEST", 10 * 3600),
    ("AEDT", 11 * 3600),
    ("AWST", 8 * 3600),
    ("NZST", 12 * 3600),
    ("NZDT", 13 * 3600),
];

/// Layouts carrying a numeric offset.
///
/// Within each table the two-digit `%y` layouts come first: `%Y` happily
/// reads `20` as the year 20.
const FORMATS_WITH_OFFSET: &[&str] = &[
    "%d %b %y %H:%M:%S %z",
    "%d %b %y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%d %B %Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Layouts without a zone; the time is taken as UTC.
const FORMATS_NAIVE: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d %b %y %H:%M:%S",
    "%d %b %y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Layouts used in front of a named zone abbreviation.
const FORMATS_BEFORE_NAMED_ZONE: &[&str] = &[
    "%d %b %y %H:%M:%S",
    "%d %b %y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
];

const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %y", "%d %b %Y", "%d %B %Y", "%Y/%m/%d"];

/// Parses a feed date string into a UTC datetime.
/// Returns `None` if no known layout matches.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    // Weekday names are routinely wrong or spelled out, and chrono rejects a
    // weekday that disagrees with the date, so parse without it.
    let without_weekday = strip_weekday(&normalized).unwrap_or(&normalized);
    parse_without_weekday(without_weekday)
}

/// Parses a feed date string into epoch milliseconds.
pub fn parse_date_millis(s: &str) -> Option<i64> {
    parse_flexible_time(s).map(|dt| dt.timestamp_millis())
}

fn parse_without_weekday(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // A trailing `Z` designator as used by RFC 3339.
    let with_offset = match s.strip_suffix('Z') {
        Some(base) if base.contains('T') => format!("{base}+00:00"),
        _ => s.to_string(),
    };

    for fmt in FORMATS_WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    if let Some(dt) = parse_with_named_zone(s) {
        return Some(dt);
    }

    for fmt in FORMATS_NAIVE {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for fmt in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Handles zone abbreviations (MST, CEST, ...) that chrono's `%Z` cannot parse.
fn parse_with_named_zone(s: &str) -> Option<DateTime<Utc>> {
    let (base, zone) = s.rsplit_once(' ')?;
    let offset_secs = NAMED_ZONES
        .iter()
        .find(|(name, _)| zone.eq_ignore_ascii_case(name))
        .map(|(_, offset)| *offset)?;
    let offset = FixedOffset::east_opt(offset_secs)?;

    FORMATS_BEFORE_NAMED_ZONE.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(base, fmt).ok()?;
        let dt = offset.from_local_datetime(&naive).single()?;
        Some(dt.with_timezone(&Utc))
    })
}

/// Drops a leading `Mon,` / `Monday,` token.
fn strip_weekday(s: &str) -> Option<&str> {
    let (head, rest) = s.split_once(',')?;
    if head.len() >= 3 && head.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(rest.trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_rfc3339() {
        let dt = parse_flexible_time("2023-06-15T14:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 6, 15, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_rfc3339_fraction_and_offset() {
        let dt = parse_flexible_time("2023-06-15T14:30:00.250+02:00").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_686_832_200_250);
    }

    #[test]
    fn test_rfc2822() {
        let dt = parse_flexible_time("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap());
    }

    #[test]
    fn test_wrong_weekday_is_ignored() {
        // 2 Jan 2020 was a Thursday.
        let dt = parse_flexible_time("Mon, 02 Jan 2020 10:00:00 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_long_weekday() {
        let dt = parse_flexible_time("Thursday, 02 Jan 2020 10:00:00 +0200").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_named_zone_outside_rfc2822() {
        let dt = parse_with_named_zone("02 Jan 2020 10:00:00 CEST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap());
        let dt = parse_with_named_zone("02 Jan 2020 10:00 jst").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 1, 0, 0).unwrap());
        assert!(parse_with_named_zone("02 Jan 2020 10:00:00 XYZ").is_none());
    }

    #[test]
    fn test_named_zone_mst() {
        let dt = parse_flexible_time("Mon, 02 Jan 2006 15:04:05 MST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap());
    }

    #[test]
    fn test_two_digit_year() {
        let dt = parse_flexible_time("02 Jan 20 10:00:00 +0000").unwrap();
        assert_eq!(dt.year(), 2020);
    }

    #[test]
    fn test_two_digit_year_with_named_zone() {
        let dt = parse_flexible_time("02 Jan 20 10:00:00 CEST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap());
        let dt = parse_flexible_time("Thu, 02 Jan 20 10:00:00 CEST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap());
        let dt = parse_flexible_time("02 Jan 99 10:00 PST").unwrap();
        assert_eq!(dt.year(), 1999);
    }

    #[test]
    fn test_two_digit_year_without_zone() {
        let dt = parse_flexible_time("02 Jan 20 10:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 10, 0, 0).unwrap());
        let dt = parse_flexible_time("02 Jan 20 10:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 10, 0, 0).unwrap());
        let dt = parse_flexible_time("02 Jan 20").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_four_digit_year_unaffected_by_short_layouts() {
        let dt = parse_flexible_time("02 Jan 2020 10:00:00 CEST").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap());
        let dt = parse_flexible_time("02 Jan 2020 10:00").unwrap();
        assert_eq!(dt.year(), 2020);
        let dt = parse_flexible_time("02 Jan 2020").unwrap();
        assert_eq!(dt.year(), 2020);
    }

    #[test]
    fn test_missing_timezone_assumes_utc() {
        let dt = parse_flexible_time("2006-01-02T15:04:05").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap());
        let dt = parse_flexible_time("2006-01-02 15:04:05").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn test_date_only() {
        let dt = parse_flexible_time("2023-12-25").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_extra_whitespace() {
        assert!(parse_flexible_time("  Mon,  02 Jan 2006\n15:04:05 GMT ").is_some());
    }

    #[test]
    fn test_unparseable() {
        assert!(parse_flexible_time("").is_none());
        assert!(parse_flexible_time("   ").is_none());
        assert!(parse_flexible_time("not a date").is_none());
        assert!(parse_date_millis("yesterday, sometime").is_none());
    }
}
