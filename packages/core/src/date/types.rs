//! Structured date values produced by the extended date parser.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

/// How much of a date was actually specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Day,
    Month,
    Year,
    Decade,
    Century,
}

/// A calendar date known to day, month or year precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialDate {
    start: NaiveDate,
    precision: Precision,
    uncertain: bool,
    approximate: bool,
}

impl PartialDate {
    /// A year-precision date.
    #[must_use]
    pub fn year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1).map(|start| Self::new(start, Precision::Year))
    }

    /// A month-precision date; `None` for an invalid month.
    #[must_use]
    pub fn year_month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|start| Self::new(start, Precision::Month))
    }

    /// A day-precision date; `None` for an invalid calendar date.
    #[must_use]
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|start| Self::new(start, Precision::Day))
    }

    fn new(start: NaiveDate, precision: Precision) -> Self {
        Self {
            start,
            precision,
            uncertain: false,
            approximate: false,
        }
    }

    #[must_use]
    pub fn with_uncertain(mut self, uncertain: bool) -> Self {
        self.uncertain = uncertain;
        self
    }

    #[must_use]
    pub fn with_approximate(mut self, approximate: bool) -> Self {
        self.approximate = approximate;
        self
    }

    #[must_use]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[must_use]
    pub fn is_uncertain(&self) -> bool {
        self.uncertain
    }

    #[must_use]
    pub fn is_approximate(&self) -> bool {
        self.approximate
    }

    #[must_use]
    pub fn year_value(&self) -> i32 {
        self.start.year()
    }

    /// Month, when the date is at least month-precise.
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        (self.precision <= Precision::Month).then(|| self.start.month())
    }

    /// Day, when the date is day-precise.
    #[must_use]
    pub fn day(&self) -> Option<u32> {
        (self.precision == Precision::Day).then(|| self.start.day())
    }

    /// First calendar day covered.
    #[must_use]
    pub fn earliest(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day covered.
    #[must_use]
    pub fn latest(&self) -> NaiveDate {
        let next = match self.precision {
            Precision::Day => return self.start,
            Precision::Month => {
                if self.start.month() == 12 {
                    NaiveDate::from_ymd_opt(self.start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(self.start.year(), self.start.month() + 1, 1)
                }
            }
            _ => NaiveDate::from_ymd_opt(self.start.year() + 1, 1, 1),
        };
        next.and_then(|d| d.pred_opt()).unwrap_or(self.start)
    }
}

fn write_year(f: &mut fmt::Formatter<'_>, year: i32) -> fmt::Result {
    if year < 0 {
        write!(f, "-{:04}", -year)
    } else {
        write!(f, "{year:04}")
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_year(f, self.start.year())?;
        if let Some(month) = self.month() {
            write!(f, "-{month:02}")?;
        }
        if let Some(day) = self.day() {
            write!(f, "-{day:02}")?;
        }
        match (self.uncertain, self.approximate) {
            (true, true) => f.write_str("%"),
            (true, false) => f.write_str("?"),
            (false, true) => f.write_str("~"),
            (false, false) => Ok(()),
        }
    }
}

/// One end of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Date(PartialDate),
    /// The bound exists but is not known.
    Unknown,
    /// The interval is unbounded on this side.
    Open,
}

impl Endpoint {
    #[must_use]
    pub fn as_date(&self) -> Option<&PartialDate> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => date.fmt(f),
            Self::Unknown => Ok(()),
            Self::Open => f.write_str(".."),
        }
    }
}

/// A begin/end date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    from: Endpoint,
    to: Endpoint,
}

impl Interval {
    #[must_use]
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn from(&self) -> &Endpoint {
        &self.from
    }

    #[must_use]
    pub fn to(&self) -> &Endpoint {
        &self.to
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A normalized date: a single partial date, an unspecified decade or
/// century, or an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedDate {
    Date(PartialDate),
    /// Decade by its leading three digits (`199` is the 1990s).
    Decade(i32),
    /// Century by its leading two digits (`19` is 1900-1999).
    Century(i32),
    Interval(Interval),
}

impl ExtendedDate {
    /// Precision of a single value; intervals have none.
    #[must_use]
    pub fn precision(&self) -> Option<Precision> {
        match self {
            Self::Date(date) => Some(date.precision()),
            Self::Decade(_) => Some(Precision::Decade),
            Self::Century(_) => Some(Precision::Century),
            Self::Interval(_) => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&PartialDate> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_interval(&self) -> Option<&Interval> {
        match self {
            Self::Interval(interval) => Some(interval),
            _ => None,
        }
    }

    /// Earliest calendar day covered, if bounded.
    #[must_use]
    pub fn earliest(&self) -> Option<NaiveDate> {
        self.first_point().map(|date| date.earliest())
    }

    /// Latest calendar day covered, if bounded.
    #[must_use]
    pub fn latest(&self) -> Option<NaiveDate> {
        self.last_point().map(|date| date.latest())
    }

    /// The earliest partial date this value starts at.
    pub(crate) fn first_point(&self) -> Option<PartialDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Decade(decade) => PartialDate::year(decade * 10),
            Self::Century(century) => PartialDate::year(century * 100),
            Self::Interval(interval) => interval.from.as_date().copied(),
        }
    }

    /// The latest partial date this value ends at.
    pub(crate) fn last_point(&self) -> Option<PartialDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Decade(decade) => PartialDate::year(decade * 10 + 9),
            Self::Century(century) => PartialDate::year(century * 100 + 99),
            Self::Interval(interval) => interval.to.as_date().copied(),
        }
    }

    /// Mark every contained date approximate.
    #[must_use]
    pub fn approximate(self) -> Self {
        let mark = |endpoint: Endpoint| match endpoint {
            Endpoint::Date(date) => Endpoint::Date(date.with_approximate(true)),
            other => other,
        };
        match self {
            Self::Date(date) => Self::Date(date.with_approximate(true)),
            Self::Interval(interval) => {
                Self::Interval(Interval::new(mark(interval.from), mark(interval.to)))
            }
            other => other,
        }
    }
}

impl fmt::Display for ExtendedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => date.fmt(f),
            Self::Decade(decade) => write!(f, "{decade:03}X"),
            Self::Century(century) => write!(f, "{century:02}XX"),
            Self::Interval(interval) => interval.fmt(f),
        }
    }
}

impl Serialize for ExtendedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
