//! Locale-aware exact decimal parsing for price cells.
//!
//! Prices on the page are rendered with digit grouping (`1,234.50`). The
//! grouping character is dropped and the decimal mark normalised to `.`
//! before the text is handed to `rust_decimal`, so values keep their exact
//! scale and never pass through binary floating point.
use rust_decimal::Decimal;

use crate::error::RateError;

/// Digit grouping and decimal mark used by a price column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Thousands separator, removed wherever it appears.
    pub grouping: char,
    /// Decimal mark, replaced with `.` before parsing.
    pub decimal: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            grouping: ',',
            decimal: '.',
        }
    }
}

impl NumberFormat {
    /// Creates a format with the given grouping character and decimal mark.
    pub fn new(grouping: char, decimal: char) -> Self {
        NumberFormat { grouping, decimal }
    }

    /// Parses `text` as an exact decimal.
    ///
    /// Surrounding and embedded whitespace is ignored along with every grouping
    /// character. Fails with `RateError::NumericParse` carrying the original
    /// text when nothing numeric remains or the digits cannot be represented.
    pub fn parse(&self, text: &str) -> Result<Decimal, RateError> {
        let normalized: String = text
            .chars()
            .filter(|c| *c != self.grouping && !c.is_whitespace())
            .map(|c| if c == self.decimal { '.' } else { c })
            .collect();

        Decimal::from_str_exact(&normalized).map_err(|source| RateError::NumericParse {
            text: text.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_strips_grouping() {
        let format = NumberFormat::default();
        assert_eq!(format.parse("1,234.50").unwrap(), dec!(1234.50));
        assert_eq!(format.parse(" 1,240.00 ").unwrap(), dec!(1240.00));
    }

    #[test]
    fn test_parse_keeps_exact_scale() {
        let format = NumberFormat::default();
        let value = format.parse("12,345.67").unwrap();
        assert_eq!(value.to_string(), "12345.67");

        let value = format.parse("1,240.00").unwrap();
        assert_eq!(value.to_string(), "1240.00");
        assert_eq!(value.scale(), 2);
    }

    #[test]
    fn test_parse_european_format() {
        let format = NumberFormat::new('.', ',');
        assert_eq!(format.parse("3.141.592,65").unwrap(), dec!(3141592.65));
    }

    #[test]
    fn test_parse_small_fraction_is_not_rounded() {
        let format = NumberFormat::default();
        let value = format.parse("0.000012345").unwrap();
        assert_eq!(value.to_string(), "0.000012345");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let format = NumberFormat::default();
        match format.parse("N/A") {
            Err(RateError::NumericParse { text, .. }) => assert_eq!(text, "N/A"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_empty() {
        let format = NumberFormat::default();
        assert!(matches!(
            format.parse("  "),
            Err(RateError::NumericParse { .. })
        ));
    }
}
