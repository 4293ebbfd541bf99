//! Time handling for the text dialects: subtitle durations, sniffing datetimes out of free text
//! and turning the (often oddly punctuated) result into epoch seconds.

use chrono::prelude::*;
use regex::Regex;

#[derive(Fail, Debug, PartialEq)]
pub enum TimeframeError {
    #[fail(display = "no '{}' separator found", _0)]
    NoSeparator(String),
    #[fail(display = "'{}' is not a duration", _0)]
    BadDuration(String),
}

/// Parse a subtitle duration such as `00:01:02,033` or `0:00:01.00` into seconds.
pub fn parse_duration(text: &str) -> Option<f64> {
    lazy_static! {
        static ref DURATION: Regex =
            Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2})(?:[.,](\d+))?$")
                .expect("Failed to compile regex");
    }

    let caps = DURATION.captures(text.trim())?;
    let field = |idx| caps.get(idx).map_or(Ok(0.0), |m| m.as_str().parse::<f64>());
    let hours = field(1).ok()?;
    let minutes = field(2).ok()?;
    let seconds = field(3).ok()?;
    let fraction = match caps.get(4) {
        Some(m) => format!("0.{}", m.as_str()).parse::<f64>().ok()?,
        None => 0.0,
    };
    Some(hours * 3600.0 + minutes * 60.0 + seconds + fraction)
}

/// Split a line like `00:00:00,033 --> 00:00:00,066` around `separator` and parse both sides.
pub fn parse_timeframe(line: &str, separator: &str) -> Result<(f64, f64), TimeframeError> {
    let pos = line
        .find(separator)
        .ok_or_else(|| TimeframeError::NoSeparator(separator.to_string()))?;
    let (begin, end) = (&line[..pos], &line[pos + separator.len()..]);
    let parse = |text: &str| {
        parse_duration(text).ok_or_else(|| TimeframeError::BadDuration(text.trim().to_string()))
    };
    Ok((parse(begin)?, parse(end)?))
}

/// A datetime found in free text, after separator clean-up, along with the byte span it came
/// from in the original text.
#[derive(Debug, Clone, PartialEq)]
pub struct DatetimeMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Look for anything that reasonably resembles a date followed by a time, eg
/// `2019-09-25 01:22:35,118,697`, `Jun 19, 2019 4:47:39 PM` or `2019.07.06 19:05:07`.
pub fn sniff_datetime(text: &str) -> Option<DatetimeMatch> {
    lazy_static! {
        static ref DATETIME: Regex = Regex::new(
            r"(?x)
            # date: word, separators, digits, separators, digits
            \w+ [\ \t,\-/.]* \d+ [\ \t,\-/.]* \d+ [\ \t]*
            # time, then a fraction whose separator may appear a second time
            \d+:\d+:\d+ (?: \.[\ \t]*\d*\.? | ,[\ \t]*\d*,? )? [\ \t]*\d*
            # meridiem
            (?: [\ \t]*[aApP]\.?[mM]\b\.? )?"
        )
        .expect("Failed to compile regex");
    }

    let m = DATETIME.find(text)?;
    // an empty fraction can swallow the comma or period that follows the time
    let found = m
        .as_str()
        .trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '.');
    Some(DatetimeMatch {
        text: reduce_fraction_separator(found),
        start: m.start(),
        end: m.start() + found.len(),
    })
}

/// Some firmware writes sub-second values with the separator twice (`12:00:00.123.456`). Keep
/// the first separator of the fractional part and drop any repeats. Idempotent.
pub fn reduce_fraction_separator(datetime: &str) -> String {
    lazy_static! {
        static ref HMS: Regex = Regex::new(r"\d+:\d+:\d+").expect("Failed to compile regex");
    }

    let tail_start = match HMS.find(datetime) {
        Some(m) => m.end(),
        None => return datetime.to_string(),
    };
    let (head, tail) = datetime.split_at(tail_start);
    let sep = match tail.chars().next() {
        Some(c) if c == '.' || c == ',' => c,
        _ => return datetime.to_string(),
    };
    if tail.matches(sep).count() < 2 {
        return datetime.to_string();
    }

    let mut out = String::with_capacity(datetime.len());
    out.push_str(head);
    out.push(sep);
    out.extend(tail[1..].chars().filter(|c| *c != sep));
    out
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    MONTHS.iter().position(|m| *m == prefix).map(|idx| idx as u32 + 1)
}

/// Interpret a sniffed datetime as a calendar time. Numeric dates are read year first when the
/// first component has four digits, otherwise month first unless that can't be a month.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    lazy_static! {
        static ref PARTS: Regex = Regex::new(
            r"(?x)
            ^(?P<a>\w+) [\ \t,\-/.]* (?P<b>\d+) [\ \t,\-/.]* (?P<c>\d+) [\ \t]*
            (?P<h>\d+) : (?P<mi>\d+) : (?P<s>\d+)
            (?P<rest>.*)$"
        )
        .expect("Failed to compile regex");
    }

    let caps = PARTS.captures(text.trim())?;
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
    let a = caps.name("a")?.as_str();

    let (year, month, day) = if a.chars().all(|c| c.is_ascii_digit()) {
        let a = a.parse::<u32>().ok()?;
        let (b, c) = (num("b")?, num("c")?);
        if a > 31 {
            (a, b, c)
        } else if a > 12 {
            (c, b, a)
        } else {
            (c, a, b)
        }
    } else {
        (num("c")?, month_from_name(a)?, num("b")?)
    };
    let year = if year < 100 { year + 2000 } else { year };

    let mut hour = num("h")?;
    let (minute, second) = (num("mi")?, num("s")?);

    let rest = caps.name("rest").map_or("", |m| m.as_str());
    let mut micros = 0;
    if rest.starts_with('.') || rest.starts_with(',') {
        let digits: String = rest[1..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ' ' || *c == '\t')
            .filter(char::is_ascii_digit)
            .take(6)
            .collect();
        if !digits.is_empty() {
            micros = format!("{:0<6}", digits).parse::<u32>().ok()?;
        }
    }

    let meridiem = rest.to_lowercase();
    if meridiem.contains('p') && hour < 12 {
        hour += 12;
    } else if meridiem.contains('a') && hour == 12 {
        hour = 0;
    }

    NaiveDate::from_ymd_opt(year as i32, month, day)?
        .and_hms_micro_opt(hour, minute, second, micros)
}

/// Epoch seconds, keeping microseconds.
pub fn datetime_epoch<Tz: TimeZone>(datetime: &DateTime<Tz>) -> f64 {
    datetime.timestamp() as f64 + f64::from(datetime.timestamp_subsec_micros()) / 1e6
}

/// Epoch seconds for a naive datetime, taken to be UTC.
pub fn naive_to_epoch(datetime: &NaiveDateTime) -> f64 {
    datetime_epoch(&Utc.from_utc_datetime(datetime))
}

pub fn datetime_to_epoch(text: &str) -> Option<f64> {
    parse_datetime(text).map(|dt| naive_to_epoch(&dt))
}

/// Parse the `creation_time` style tags containers carry, eg `2019-06-19T16:47:39.000000Z`.
pub fn parse_creation_time(text: &str) -> Option<f64> {
    match DateTime::parse_from_rfc3339(text.trim()) {
        Ok(dt) => Some(datetime_epoch(&dt)),
        Err(_) => datetime_to_epoch(text),
    }
}
