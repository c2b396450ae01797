use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::cmp::Ordering;

/// Granularity used by [`is_same_date`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateUnit {
    Day,
    Month,
    Year,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Token {
    // Longest first so "YYYY" never splits into something shorter.
    const TABLE: [(&'static str, Token); 6] = [
        ("YYYY", Token::Year),
        ("MM", Token::Month),
        ("DD", Token::Day),
        ("HH", Token::Hour),
        ("mm", Token::Minute),
        ("ss", Token::Second),
    ];

    fn width(self) -> usize {
        match self {
            Token::Year => 4,
            _ => 2,
        }
    }

    fn is_time(self) -> bool {
        matches!(self, Token::Hour | Token::Minute | Token::Second)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Piece {
    Token(Token),
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        match Token::TABLE.iter().find(|(text, _)| rest.starts_with(text)) {
            Some((text, token)) => {
                pieces.push(Piece::Token(*token));
                rest = &rest[text.len()..];
            }
            None => {
                pieces.push(Piece::Literal(ch));
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    pieces
}

/// Substitutes `YYYY`, `MM`, `DD`, `HH`, `mm` and `ss` in `pattern`.
/// Anything else is copied through literally.
pub fn format_date(date: NaiveDateTime, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    for piece in tokenize(pattern) {
        match piece {
            Piece::Literal(ch) => out.push(ch),
            Piece::Token(Token::Year) => out.push_str(&format!("{:04}", date.year())),
            Piece::Token(Token::Month) => out.push_str(&format!("{:02}", date.month())),
            Piece::Token(Token::Day) => out.push_str(&format!("{:02}", date.day())),
            Piece::Token(Token::Hour) => out.push_str(&format!("{:02}", date.hour())),
            Piece::Token(Token::Minute) => out.push_str(&format!("{:02}", date.minute())),
            Piece::Token(Token::Second) => out.push_str(&format!("{:02}", date.second())),
        }
    }
    out
}

/// Parses `text` against `pattern`.
///
/// Returns `None` for malformed input; callers must check before use. Text that
/// does not follow the pattern's structure at all falls back to a handful of
/// common layouts (ISO 8601, RFC 3339, `YYYY/MM/DD`, `MM/DD/YYYY`).
pub fn parse_date(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let pieces = tokenize(pattern);
    if pieces.iter().any(|p| matches!(p, Piece::Token(_))) {
        if let Some(parsed) = parse_with_pieces(text, &pieces) {
            return parsed;
        }
    }
    parse_generic(text)
}

/// Outer `None` means the text did not follow the pattern's shape.
/// Inner `None` means it did, but names an impossible date or time.
fn parse_with_pieces(text: &str, pieces: &[Piece]) -> Option<Option<NaiveDateTime>> {
    let (mut year, mut month, mut day) = (None, None, None);
    let (mut hour, mut minute, mut second) = (0u32, 0u32, 0u32);
    let mut rest = text;

    for (idx, piece) in pieces.iter().enumerate() {
        if rest.is_empty() {
            // A date-only value is accepted by a pattern that also carries a time.
            let only_time_left = pieces[idx..].iter().all(|p| match p {
                Piece::Token(t) => t.is_time(),
                Piece::Literal(_) => true,
            });
            if only_time_left && year.is_some() && month.is_some() && day.is_some() {
                break;
            }
            return None;
        }
        match piece {
            Piece::Literal(expected) => {
                let ch = rest.chars().next()?;
                if ch != *expected {
                    return None;
                }
                rest = &rest[ch.len_utf8()..];
            }
            Piece::Token(token) => {
                let digits = rest
                    .chars()
                    .take(token.width())
                    .take_while(|c| c.is_ascii_digit())
                    .count();
                if digits == 0 {
                    return None;
                }
                let value: u32 = rest[..digits].parse().ok()?;
                rest = &rest[digits..];
                match token {
                    Token::Year => year = Some(value as i32),
                    Token::Month => month = Some(value),
                    Token::Day => day = Some(value),
                    Token::Hour => hour = value,
                    Token::Minute => minute = value,
                    Token::Second => second = value,
                }
            }
        }
    }

    if !rest.is_empty() {
        return None;
    }
    let year = year?;
    let date = NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1));
    let time = NaiveTime::from_hms_opt(hour, minute, second);
    Some(date.zip(time).map(|(d, t)| d.and_time(t)))
}

fn parse_generic(text: &str) -> Option<NaiveDateTime> {
    const DATE_TIME_LAYOUTS: [&str; 7] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
    ];
    const DATE_LAYOUTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y"];

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for layout in DATE_TIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn last_instant_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Same calendar date at 00:00:00.000.
pub fn start_of_day(date: NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(NaiveTime::MIN)
}

/// Same calendar date at 23:59:59.999.
pub fn end_of_day(date: NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(last_instant_of_day())
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 0,
    }
}

/// Calendar-month arithmetic. The day of month is clamped when the target month
/// is shorter (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let year = date.year();
    let month = date.month() as i32;
    let new_total = month - 1 + months;
    let new_month = (new_total.rem_euclid(12) + 1) as u32;
    let new_year = year + new_total.div_euclid(12);
    let max_day = days_in_month(new_year, new_month);
    let new_day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap_or(date)
}

/// [`add_months`] for a timestamp; the time of day is kept.
pub fn add_months_dt(date: NaiveDateTime, months: i32) -> NaiveDateTime {
    add_months(date.date(), months).and_time(date.time())
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    date.with_day(last).unwrap_or(date)
}

pub fn compare_dates(a: NaiveDateTime, b: NaiveDateTime) -> Ordering {
    a.cmp(&b)
}

pub fn is_same_date<A: Datelike, B: Datelike>(a: &A, b: &B, unit: DateUnit) -> bool {
    match unit {
        DateUnit::Day => a.year() == b.year() && a.month() == b.month() && a.day() == b.day(),
        DateUnit::Month => a.year() == b.year() && a.month() == b.month(),
        DateUnit::Year => a.year() == b.year(),
    }
}

/// Sunday-based weekday number, 0..=6.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// The latest date on or before `date` whose weekday is `first_day` (0 = Sunday).
pub fn start_of_week(date: NaiveDate, first_day: u32) -> NaiveDate {
    let back = (weekday_index(date) + 7 - first_day % 7) % 7;
    add_days(date, -(back as i64))
}

/// Inclusive day count between two instants: `ceil((end - start) / 1 day)`.
/// A range from 00:00 to 23:59:59.999 of the same day counts as one.
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    const DAY_MS: i64 = 86_400_000;
    let ms = end.signed_duration_since(start).num_milliseconds();
    -((-ms).div_euclid(DAY_MS))
}
