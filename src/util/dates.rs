//! Calendar-date helpers shared by the store, sitemap and renderer.

use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DOTTED_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year].[month].[day]");
const BACKUP_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second]");

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Parse the date portion of an ISO-8601 value such as `2025-01-22` or
/// `2025-01-22T09:00:00+09:00`.
pub fn parse_iso_date(value: &str) -> Option<Date> {
    let trimmed = value.trim();
    let date_part = trimmed.split('T').next().unwrap_or(trimmed);
    Date::parse(date_part, ISO_DATE).ok()
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_default()
}

/// Render a date the way article cards display it (`YYYY.MM.DD`).
pub fn format_dotted_date(date: Date) -> String {
    date.format(DOTTED_DATE).unwrap_or_default()
}

pub fn backup_stamp(now: OffsetDateTime) -> String {
    now.format(BACKUP_STAMP).unwrap_or_default()
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}
