//! Publish date detection from episode audio file names
//!
//! Recordings have been named with three different conventions over the years:
//! - `TPVOT-E{num}-{yy}-{mm}-{dd}-{dd}-{title-slug}.mp3` (legacy tagged)
//! - `{mm1}-{dd1}-{yy1}-{mm2}-{dd2}-{yy2}-{title-slug}.mp3` (two dates, second one wins)
//! - `{mm}-{dd}-{dd}-{yy}-{title-slug}.mp3` (default)
//!
//! The encoded date is the air date. Episodes are published the following day at
//! 10:00 in the recording time zone.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use thiserror::Error;

/// Marker present only in legacy tagged file names
const LEGACY_MARKER: &str = "TPVOT-";

/// Hour of day (reference time zone) an episode is published
const PUBLISH_HOUR: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilenameDateError {
    #[error("unrecognized file name dialect: {0:?}")]
    UnrecognizedFilenameDialect(String),

    #[error("invalid air date in {file_name:?} (month {month:?}, day {day:?}, year {year:?})")]
    InvalidAirDate {
        file_name: String,
        month: String,
        day: String,
        year: String,
    },
}

/// File name convention an episode was recorded under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameDialect {
    Legacy,
    DualDate,
    Default,
}

/// Raw date tokens pulled out of a file name, before any numeric parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirDateTokens<'a> {
    pub month: &'a str,
    pub day: &'a str,
    /// Two digit year, without the century
    pub year: &'a str,
}

/// Classifies a file name into one of the known dialects.
///
/// Checked in order, first match wins. Anything that is neither legacy tagged nor
/// carries a numeric fifth token falls through to [`FilenameDialect::Default`].
pub fn classify(file_name: &str) -> FilenameDialect {
    if file_name.contains(LEGACY_MARKER) {
        return FilenameDialect::Legacy;
    }

    match file_name.split('-').nth(4) {
        Some(token) if is_numeric_token(token) => FilenameDialect::DualDate,
        _ => FilenameDialect::Default,
    }
}

fn is_numeric_token(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Pulls the air date tokens for an already classified file name
pub fn extract_tokens(file_name: &str, dialect: FilenameDialect) -> Option<AirDateTokens<'_>> {
    let parts: Vec<&str> = file_name.split('-').collect();
    match dialect {
        FilenameDialect::Legacy => extract_legacy(&parts),
        FilenameDialect::DualDate => extract_dual_date(&parts),
        FilenameDialect::Default => extract_default(&parts),
    }
}

// TPVOT-E363-19-03-16-17-...: the second day of the range is the air date
fn extract_legacy<'a>(parts: &[&'a str]) -> Option<AirDateTokens<'a>> {
    Some(AirDateTokens {
        month: *parts.get(3)?,
        day: *parts.get(5)?,
        year: *parts.get(2)?,
    })
}

// 02-29-20-03-01-20-...: only the second date is used
fn extract_dual_date<'a>(parts: &[&'a str]) -> Option<AirDateTokens<'a>> {
    Some(AirDateTokens {
        month: *parts.get(3)?,
        day: *parts.get(4)?,
        year: *parts.get(5)?,
    })
}

// 02-20-21-21-...
fn extract_default<'a>(parts: &[&'a str]) -> Option<AirDateTokens<'a>> {
    Some(AirDateTokens {
        month: *parts.first()?,
        day: *parts.get(2)?,
        year: *parts.get(3)?,
    })
}

/// Computes the air date (10:00 in `offset`) encoded in a file name
pub fn air_date_from_filename(
    file_name: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, FilenameDateError> {
    if file_name.trim().is_empty() {
        return Err(FilenameDateError::UnrecognizedFilenameDialect(
            file_name.to_string(),
        ));
    }

    let dialect = classify(file_name);
    let tokens = extract_tokens(file_name, dialect).ok_or_else(|| {
        FilenameDateError::UnrecognizedFilenameDialect(file_name.to_string())
    })?;

    let invalid = || FilenameDateError::InvalidAirDate {
        file_name: file_name.to_string(),
        month: tokens.month.to_string(),
        day: tokens.day.to_string(),
        year: tokens.year.to_string(),
    };

    if !is_numeric_token(tokens.month)
        || !is_numeric_token(tokens.day)
        || tokens.year.trim().len() != 2
        || !is_numeric_token(tokens.year)
    {
        return Err(invalid());
    }

    let month: u32 = tokens.month.trim().parse().map_err(|_| invalid())?;
    let day: u32 = tokens.day.trim().parse().map_err(|_| invalid())?;
    // "20" prefix, no century rollover
    let year: i32 = format!("20{}", tokens.year.trim())
        .parse()
        .map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(PUBLISH_HOUR, 0, 0).ok_or_else(invalid)?;

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(invalid)
}

/// Computes the publish date for an episode file: the air date plus one calendar day.
///
/// # Examples
/// ```ignore
/// let cst = FixedOffset::west_opt(6 * 3600).unwrap();
/// let date = publish_date_from_filename(
///     "TPVOT-E363-19-03-16-17-Entering-the-Promised-Land.mp3",
///     cst,
/// )?;
/// assert_eq!(date.date_naive(), NaiveDate::from_ymd_opt(2019, 3, 18).unwrap());
/// ```
pub fn publish_date_from_filename(
    file_name: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, FilenameDateError> {
    let air_date = air_date_from_filename(file_name, offset)?;
    air_date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| FilenameDateError::InvalidAirDate {
            file_name: file_name.to_string(),
            month: air_date.format("%m").to_string(),
            day: air_date.format("%d").to_string(),
            year: air_date.format("%y").to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cst() -> FixedOffset {
        FixedOffset::west_opt(6 * 3600).unwrap()
    }

    fn expected(year: i32, month: u32, day: u32) -> DateTime<FixedOffset> {
        cst().with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_default_dialect() {
        let file = "02-20-21-21-Prophetic-Voice-of-our-Time-[mixdown]-01.mp3";
        assert_eq!(classify(file), FilenameDialect::Default);
        assert_eq!(
            publish_date_from_filename(file, cst()).unwrap(),
            expected(2021, 2, 22)
        );
    }

    #[test]
    fn test_legacy_dialect() {
        let file = "TPVOT-E363-19-03-16-17-Entering-the-Promised-Land.mp3";
        assert_eq!(classify(file), FilenameDialect::Legacy);
        assert_eq!(
            publish_date_from_filename(file, cst()).unwrap(),
            expected(2019, 3, 18)
        );
    }

    #[test]
    fn test_legacy_dialect_month_rollover() {
        let file = "TPVOT-E365-19-03-30-31-Uproot-the-False-Narratives-in-Your-Life.mp3";
        assert_eq!(
            publish_date_from_filename(file, cst()).unwrap(),
            expected(2019, 4, 1)
        );
    }

    #[test]
    fn test_dual_date_dialect() {
        let file = "02-29-20-03-01-20-Prophetic-Voice-of-our-Time-[mixdown]-01.mp3";
        assert_eq!(classify(file), FilenameDialect::DualDate);
        assert_eq!(
            publish_date_from_filename(file, cst()).unwrap(),
            expected(2020, 3, 2)
        );
    }

    #[test]
    fn test_air_date_is_one_day_earlier() {
        let file = "02-20-21-21-Prophetic-Voice-of-our-Time-[mixdown]-01.mp3";
        assert_eq!(
            air_date_from_filename(file, cst()).unwrap(),
            expected(2021, 2, 21)
        );
    }

    #[test]
    fn test_legacy_marker_wins_over_numeric_token() {
        // token 4 ("16") is numeric but the marker is checked first
        let file = "TPVOT-E363-19-03-16-17-Entering-the-Promised-Land.mp3";
        let tokens = extract_tokens(file, classify(file)).unwrap();
        assert_eq!(
            tokens,
            AirDateTokens {
                month: "03",
                day: "17",
                year: "19"
            }
        );
    }

    #[test]
    fn test_publish_time_is_ten_in_reference_zone() {
        let file = "12-06-06-22-Some-Title.mp3";
        let date = publish_date_from_filename(file, cst()).unwrap();
        assert_eq!(date.to_rfc3339(), "2022-12-07T10:00:00-06:00");
    }

    #[test]
    fn test_year_end_rollover() {
        let file = "12-30-31-21-Watch-Night.mp3";
        assert_eq!(
            publish_date_from_filename(file, cst()).unwrap(),
            expected(2022, 1, 1)
        );
    }

    #[test]
    fn test_empty_file_name() {
        assert!(matches!(
            publish_date_from_filename("", cst()),
            Err(FilenameDateError::UnrecognizedFilenameDialect(_))
        ));
    }

    #[test]
    fn test_too_few_tokens() {
        assert!(matches!(
            publish_date_from_filename("episode.mp3", cst()),
            Err(FilenameDateError::UnrecognizedFilenameDialect(_))
        ));
        assert!(matches!(
            publish_date_from_filename("TPVOT-E1-19-03.mp3", cst()),
            Err(FilenameDateError::UnrecognizedFilenameDialect(_))
        ));
    }

    #[test]
    fn test_non_numeric_tokens() {
        let result = publish_date_from_filename("Feb-20-21-21-Title.mp3", cst());
        assert!(matches!(
            result,
            Err(FilenameDateError::InvalidAirDate { ref month, .. }) if month == "Feb"
        ));
    }

    #[test]
    fn test_year_must_be_two_digits() {
        for file in ["02-20-21-1-Title.mp3", "02-20-21-2021-Title.mp3"] {
            assert!(
                matches!(
                    publish_date_from_filename(file, cst()),
                    Err(FilenameDateError::InvalidAirDate { .. })
                ),
                "{} should be rejected",
                file
            );
        }
    }

    #[test]
    fn test_signed_tokens_rejected() {
        assert!(matches!(
            publish_date_from_filename("+2-20-+21-21-Title.mp3", cst()),
            Err(FilenameDateError::InvalidAirDate { .. })
        ));
        assert!(matches!(
            publish_date_from_filename("02-+20-+21-21-Title.mp3", cst()),
            Err(FilenameDateError::InvalidAirDate { .. })
        ));
    }

    #[test]
    fn test_impossible_calendar_date() {
        // 2021 is not a leap year
        assert!(matches!(
            publish_date_from_filename("02-29-29-21-Title.mp3", cst()),
            Err(FilenameDateError::InvalidAirDate { .. })
        ));
        assert!(matches!(
            publish_date_from_filename("13-01-01-21-Title.mp3", cst()),
            Err(FilenameDateError::InvalidAirDate { .. })
        ));
    }
}
