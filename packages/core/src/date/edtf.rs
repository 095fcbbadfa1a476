//! Strict grammar for the Extended Date/Time Format subset the parser emits.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{Endpoint, ExtendedDate, Interval, PartialDate};

#[allow(clippy::expect_used)]
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(-?\d{4})(?:-(\d{2})(?:-(\d{2})(?:T\d{2}:\d{2}(?::\d{2})?(?:Z|[+-]\d{2}(?::?\d{2})?)?)?)?)?([?~%])?$",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static DECADE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})[Xxu]$").expect("valid regex"));

#[allow(clippy::expect_used)]
static CENTURY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})[Xxu]{2}$").expect("valid regex"));

#[allow(clippy::expect_used)]
static UNSPECIFIED_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d{4})-[Xxu]{2}(?:-[Xxu]{2})?$").expect("valid regex"));

#[allow(clippy::expect_used)]
static UNSPECIFIED_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d{4})-(\d{2})-[Xxu]{2}$").expect("valid regex"));

/// Parse a strict EDTF expression: a date, an unspecified decade or century,
/// or an interval of two such values.
#[must_use]
pub fn parse(text: &str) -> Option<ExtendedDate> {
    let text = text.trim();
    match text.split_once('/') {
        Some((from, to)) => parse_interval(from, to),
        None => parse_single(text),
    }
}

fn parse_interval(from: &str, to: &str) -> Option<ExtendedDate> {
    let from = parse_endpoint(from, true)?;
    let to = parse_endpoint(to, false)?;
    match (from, to) {
        (Endpoint::Date(begin), Endpoint::Date(end)) if begin.earliest() > end.earliest() => None,
        (Endpoint::Date(_), _) | (_, Endpoint::Date(_)) => {
            Some(ExtendedDate::Interval(Interval::new(from, to)))
        }
        _ => None,
    }
}

fn parse_endpoint(text: &str, begin: bool) -> Option<Endpoint> {
    match text.trim() {
        "" | "unknown" => Some(Endpoint::Unknown),
        ".." | "open" => Some(Endpoint::Open),
        other => {
            let value = parse_single(other)?;
            let point = if begin {
                value.first_point()
            } else {
                value.last_point()
            };
            point.map(Endpoint::Date)
        }
    }
}

fn parse_single(text: &str) -> Option<ExtendedDate> {
    if let Some(caps) = DATE.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let date = match (caps.get(2), caps.get(3)) {
            (Some(month), Some(day)) => {
                PartialDate::ymd(year, month.as_str().parse().ok()?, day.as_str().parse().ok()?)
            }
            (Some(month), None) => PartialDate::year_month(year, month.as_str().parse().ok()?),
            _ => PartialDate::year(year),
        }?;
        let date = match caps.get(4).map(|q| q.as_str()) {
            Some("?") => date.with_uncertain(true),
            Some("~") => date.with_approximate(true),
            Some("%") => date.with_uncertain(true).with_approximate(true),
            _ => date,
        };
        return Some(ExtendedDate::Date(date));
    }

    if let Some(caps) = DECADE.captures(text) {
        return caps[1].parse().ok().map(ExtendedDate::Decade);
    }
    if let Some(caps) = CENTURY.captures(text) {
        return caps[1].parse().ok().map(ExtendedDate::Century);
    }
    if let Some(caps) = UNSPECIFIED_MONTH.captures(text) {
        return PartialDate::year(caps[1].parse().ok()?).map(ExtendedDate::Date);
    }
    if let Some(caps) = UNSPECIFIED_DAY.captures(text) {
        return PartialDate::year_month(caps[1].parse().ok()?, caps[2].parse().ok()?)
            .map(ExtendedDate::Date);
    }
    None
}
