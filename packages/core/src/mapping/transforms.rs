//! Ready-made per-value transforms for [`Mapping::property_with`].
//!
//! [`Mapping::property_with`]: super::Mapping::property_with

use super::source::Datum;
use crate::date;
use crate::error::Result;

/// Parse text as a date or date range. Text no strategy understands is kept
/// as a literal so the original value is not lost.
pub fn edtf_date(datum: Datum) -> Result<Datum> {
    let Some(text) = datum.text() else {
        return Ok(datum);
    };
    Ok(match date::parse_range(&text) {
        Some(parsed) => Datum::Date(parsed),
        None => {
            tracing::debug!(text = %text, "date not recognized, keeping literal");
            Datum::Text(text)
        }
    })
}

/// Replace a record node with its trimmed text.
pub fn text(datum: Datum) -> Result<Datum> {
    Ok(match datum.text() {
        Some(text) => Datum::Text(text.trim().to_string()),
        None => datum,
    })
}

/// Treat text as a URI.
pub fn uri(datum: Datum) -> Result<Datum> {
    Ok(match datum.text() {
        Some(text) => Datum::Uri(text.trim().to_string()),
        None => datum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::ExtendedDate;

    #[test]
    fn test_edtf_date_parses_ranges() {
        let Datum::Date(parsed) = edtf_date(Datum::from("1850-1875")).unwrap() else {
            panic!("expected a date");
        };
        assert_eq!(parsed.to_string(), "1850/1875");
    }

    #[test]
    fn test_edtf_date_keeps_unparseable_text() {
        let datum = edtf_date(Datum::from("sometime")).unwrap();
        assert!(matches!(datum, Datum::Text(text) if text == "sometime"));
    }

    #[test]
    fn test_edtf_date_decade() {
        let datum = edtf_date(Datum::from("1990s")).unwrap();
        assert!(matches!(datum, Datum::Date(ExtendedDate::Decade(199))));
    }

    #[test]
    fn test_uri_trims() {
        let datum = uri(Datum::from(" http://example.org/1 ")).unwrap();
        assert!(matches!(datum, Datum::Uri(text) if text == "http://example.org/1"));
    }
}
