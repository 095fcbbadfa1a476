//! Heuristic normalization of free-text dates.
//!
//! Catalogue records carry dates such as `1990s`, `ca. 1850`, `12-1992` or
//! `May 5, 1990 - June 1992`. [`parse`] turns them into an [`ExtendedDate`]
//! by trying an ordered list of strategies and keeping the first match.
//! Nothing here returns an error: input no strategy understands yields `None`.
//!
//! ```
//! use crosswalk_core::date::{self, ExtendedDate, Precision};
//!
//! assert_eq!(date::parse("1990s"), Some(ExtendedDate::Decade(199)));
//! assert_eq!(date::parse("12-1992"), date::parse("1992-12"));
//! assert_eq!(
//!     date::parse("1992").and_then(|d| d.precision()),
//!     Some(Precision::Year)
//! );
//! assert_eq!(date::parse("not a date"), None);
//! ```

mod edtf;
pub mod strategies;
mod types;

use std::sync::LazyLock;

use regex::Regex;

pub use types::{Endpoint, ExtendedDate, Interval, PartialDate, Precision};

type Strategy = fn(&str) -> Option<ExtendedDate>;

/// Single-value strategies, in the order they are tried.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("month_day_year", strategies::month_day_year),
    ("edtf", strategies::edtf_dotted),
    ("partial_interval", strategies::partial_interval),
    ("decade_hyphen", strategies::decade_hyphen),
    ("month_year", strategies::month_year),
    ("decade_s", strategies::decade_s),
    ("hyphenated_partial_range", strategies::hyphenated_partial_range),
    ("natural_language", strategies::natural_language),
];

#[allow(clippy::expect_used)]
static EARLY_LATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:early|late|mid)\b-?").expect("valid regex"));

#[allow(clippy::expect_used)]
static CIRCA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:circa|ca\.|ca|c\.|approx\.|approximately|about)\s*").expect("valid regex")
});

#[allow(clippy::expect_used)]
static DECADE_ZERO_S: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]+0s$").expect("valid regex"));

#[allow(clippy::expect_used)]
static TRAILING_HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]+-+$").expect("valid regex"));

/// Configurable entry point to the strategy chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedDateParser {
    intervals: bool,
}

impl ExtendedDateParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also split ranges such as `1990 to 1995` or `1850-1875`.
    #[must_use]
    pub fn with_intervals(mut self) -> Self {
        self.intervals = true;
        self
    }

    /// Parse `text`, returning `None` when no strategy matches.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<ExtendedDate> {
        let (text, approximate) = preprocess(text);
        if text.is_empty() {
            return None;
        }

        let interval = if self.intervals {
            strategies::interval(&text)
        } else {
            None
        };
        let parsed = interval.or_else(|| {
            STRATEGIES.iter().find_map(|(name, strategy)| {
                let result = strategy(&text);
                if result.is_some() {
                    tracing::trace!(strategy = name, text = %text, "date strategy matched");
                }
                result
            })
        })?;

        Some(if approximate {
            parsed.approximate()
        } else {
            parsed
        })
    }
}

/// Parse a single date value.
#[must_use]
pub fn parse(text: &str) -> Option<ExtendedDate> {
    ExtendedDateParser::new().parse(text)
}

/// Parse a date value that may be a range.
#[must_use]
pub fn parse_range(text: &str) -> Option<ExtendedDate> {
    ExtendedDateParser::new().with_intervals().parse(text)
}

/// Normalize whitespace, drop qualifiers the model cannot carry and detect
/// circa markers. Returns the cleaned text and whether it was approximate.
fn preprocess(text: &str) -> (String, bool) {
    let text = strategies::normalize(text);
    let text = EARLY_LATE.replace_all(&text, "");
    let approximate = CIRCA.is_match(&text);
    let text = CIRCA.replace(&text, "");
    let mut text = strategies::normalize(&text);

    if DECADE_ZERO_S.is_match(&text) {
        text = text.replacen("0s", "x", 1);
    } else if TRAILING_HYPHENS.is_match(&text) {
        text = text.replace('-', "x");
    }
    (text, approximate)
}
