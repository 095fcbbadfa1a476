//! Individual parsing strategies.
//!
//! Each strategy is a pure `&str -> Option<ExtendedDate>` function that
//! normalizes whitespace itself, so any one of them can be called alone.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::edtf;
use super::types::{Endpoint, ExtendedDate, Interval, PartialDate};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        #[allow(clippy::expect_used)]
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).expect("valid regex"));
    };
}

pattern!(WHITESPACE, r"\s+");
pattern!(
    MONTH_DAY_YEAR,
    r"^(0?[1-9]|1[012])[-/.](0?[1-9]|[12]\d|3[01])[-/.](\d{4})$"
);
pattern!(SHARED_PREFIX_RANGE, r"^(\d{4}(?:-\d{2})*)-(\d{2})/(\d{2})$");
pattern!(SHARED_YEAR_RANGE, r"^(\d{4})-(\d{2})-(\d{2})/(\d{2})-(\d{2})$");
pattern!(DECADE_HYPHEN, r"^(\d{3})-$");
pattern!(MONTH_YEAR, r"^(\d{1,2})[-/](\d{4})$");
pattern!(DECADE_S, r"^(\d{3})0'?s$");
pattern!(HYPHENATED_RANGE, r"^(\d{2})(\d{2})-(\d{2})$");
pattern!(ORDINAL, r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b");
pattern!(ABBREVIATION_DOT, r"([A-Za-z]{3,})\.");
pattern!(RANGE_SEPARATOR, r"(?i)\.\.|\s+(?:to|until)\s+|/");
pattern!(HYPHEN_SEPARATOR, r"-");
pattern!(YEAR_ANCHOR, r"\d{3}");
pattern!(
    LEADING_DATE,
    r"^(?:\d{3,4}|\d{1,2}[-/.]\d{1,2}[-/.]\d{4}|[A-Za-z]+\.?,?\s.*\d{3})"
);

/// Collapse runs of whitespace and trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// `MM-DD-YYYY` with `-`, `/` or `.` separators.
#[must_use]
pub fn month_day_year(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let caps = MONTH_DAY_YEAR.captures(&text)?;
    PartialDate::ymd(caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
        .map(ExtendedDate::Date)
}

/// Strict EDTF after rewriting `.` separators as `-`.
#[must_use]
pub fn edtf_dotted(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let text = if text.contains("..") {
        text
    } else {
        text.replace('.', "-")
    };
    edtf::parse(&text)
}

/// Intervals abbreviating the shared leading components of the end date:
/// `2014-01/03`, `2014-01-05/07`, `2014-01-05/02-03`.
#[must_use]
pub fn partial_interval(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    if let Some(caps) = SHARED_YEAR_RANGE.captures(&text) {
        let expanded = format!(
            "{0}-{1}-{2}/{0}-{3}-{4}",
            &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]
        );
        return edtf::parse(&expanded);
    }
    let caps = SHARED_PREFIX_RANGE.captures(&text)?;
    let expanded = format!("{0}-{1}/{0}-{2}", &caps[1], &caps[2], &caps[3]);
    edtf::parse(&expanded)
}

/// `199-` as the 1990s.
#[must_use]
pub fn decade_hyphen(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let caps = DECADE_HYPHEN.captures(&text)?;
    caps[1].parse().ok().map(ExtendedDate::Decade)
}

/// `MM-YYYY` as a month-precision date.
#[must_use]
pub fn month_year(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let caps = MONTH_YEAR.captures(&text)?;
    PartialDate::year_month(caps[2].parse().ok()?, caps[1].parse().ok()?).map(ExtendedDate::Date)
}

/// `1990s` as the 1990s.
#[must_use]
pub fn decade_s(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let caps = DECADE_S.captures(&text)?;
    caps[1].parse().ok().map(ExtendedDate::Decade)
}

/// `1995-98` as 1995 to 1998, borrowing the century of the first year.
#[must_use]
pub fn hyphenated_partial_range(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let caps = HYPHENATED_RANGE.captures(&text)?;
    let century: i32 = caps[1].parse().ok()?;
    let begin: i32 = caps[2].parse().ok()?;
    let end: i32 = caps[3].parse().ok()?;
    if end <= begin {
        return None;
    }
    let from = PartialDate::year(century * 100 + begin)?;
    let to = PartialDate::year(century * 100 + end)?;
    Some(ExtendedDate::Interval(Interval::new(
        Endpoint::Date(from),
        Endpoint::Date(to),
    )))
}

const DAY_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%Y %B %d",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
    "%Y/%m/%d",
    "%Y %m %d",
];

const MONTH_FORMATS: &[&str] = &["%B %Y", "%B, %Y", "%Y %B"];

/// Free-form single dates such as `May 5, 1990` or `June 1990`.
#[must_use]
pub fn natural_language(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let text = ORDINAL.replace_all(&text, "$1");
    let text = ABBREVIATION_DOT.replace_all(&text, "$1");

    for format in DAY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return PartialDate::ymd(date.year(), date.month(), date.day()).map(ExtendedDate::Date);
        }
    }
    // chrono needs a day to build a date; supply one and keep month precision
    let padded = format!("{text} 1");
    for format in MONTH_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&padded, &format!("{format} %d")) {
            return PartialDate::year_month(date.year(), date.month()).map(ExtendedDate::Date);
        }
    }
    None
}

/// Split on a range separator with a year-bearing value on both sides and
/// parse each side on its own. The begin side contributes its earliest
/// point and the end side its latest; a side that cannot be parsed becomes
/// an unknown endpoint.
///
/// Text that is already a well-formed EDTF interval is taken as is. `..`,
/// `/`, `to` and `until` are tried before `-`, and a split where both sides
/// parse wins over one that leaves a side unknown.
#[must_use]
pub fn interval(text: &str) -> Option<ExtendedDate> {
    let text = normalize(text);
    let whole = edtf::parse(&text).or_else(|| partial_interval(&text));
    if let Some(range) = whole.filter(|date| date.as_interval().is_some()) {
        return Some(range);
    }

    let mut half_open = None;
    for separators in [&*RANGE_SEPARATOR, &*HYPHEN_SEPARATOR] {
        for separator in separators.find_iter(&text) {
            let left = text[..separator.start()].trim();
            let right = text[separator.end()..].trim();
            if !YEAR_ANCHOR.is_match(left) || !LEADING_DATE.is_match(right) {
                continue;
            }

            let begin = super::parse(left).and_then(|d| d.first_point());
            let end = super::parse(right).and_then(|d| d.last_point());
            match (begin, end) {
                (None, None) => {}
                (Some(from), Some(to)) if from.earliest() > to.latest() => {}
                (Some(from), Some(to)) => {
                    tracing::trace!(left, right, "split date interval");
                    return Some(ExtendedDate::Interval(Interval::new(
                        Endpoint::Date(from),
                        Endpoint::Date(to),
                    )));
                }
                (from, to) => {
                    half_open = half_open.or_else(|| {
                        Some(ExtendedDate::Interval(Interval::new(
                            from.map_or(Endpoint::Unknown, Endpoint::Date),
                            to.map_or(Endpoint::Unknown, Endpoint::Date),
                        )))
                    });
                }
            }
        }
    }
    half_open
}
