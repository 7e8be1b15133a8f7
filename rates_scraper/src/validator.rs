//! Page readiness checks.
//!
//! The rates page is rendered client-side and a fetch can come back before
//! the price region is populated. A `Validator` decides whether a document is
//! complete enough to extract from. `PriceCellValidator` is the default
//! check for the moneybees layout; any `Fn(&Html) -> bool` works as well.
use rates_common::RateError;
use scraper::{Html, Selector};

use crate::dom::{compile, element_text};

/// Marker shared by every price cell of the rates table.
pub const PRICE_CELL_MARKER: &str = r#"span[class*="font-rubik tracked"]"#;

/// Decides whether a fetched document carries fully populated data.
pub trait Validator {
    /// Returns `true` when `document` is ready for extraction.
    fn is_valid(&self, document: &Html) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&Html) -> bool,
{
    fn is_valid(&self, document: &Html) -> bool {
        self(document)
    }
}

/// Accepts a page only when every price cell has text.
///
/// A page where the marker matches nothing is rejected unless
/// [`PriceCellValidator::allow_empty`] is used: an empty match set usually means
/// the price region has not rendered or the layout changed.
#[derive(Debug, Clone)]
pub struct PriceCellValidator {
    selector: Selector,
    min_matches: usize,
}

impl PriceCellValidator {
    /// Validator for cells matching `marker`, requiring at least one match.
    pub fn new(marker: &str) -> Result<Self, RateError> {
        Ok(PriceCellValidator {
            selector: compile(marker)?,
            min_matches: 1,
        })
    }

    /// Validator for the moneybees price cells.
    pub fn moneybees() -> Result<Self, RateError> {
        Self::new(PRICE_CELL_MARKER)
    }

    /// Require at least `count` matching cells.
    pub fn min_matches(mut self, count: usize) -> Self {
        self.min_matches = count;
        self
    }

    /// Accept documents where the marker matches nothing.
    pub fn allow_empty(self) -> Self {
        self.min_matches(0)
    }
}

impl Validator for PriceCellValidator {
    fn is_valid(&self, document: &Html) -> bool {
        let mut matched = 0;
        for cell in document.select(&self.selector) {
            if element_text(cell).is_empty() {
                return false;
            }
            matched += 1;
        }
        matched >= self.min_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLED: &str = r#"<div>
        <span class="font-rubik tracked-tight">1,234.50</span>
        <span class="font-rubik tracked-tight">1,240.00</span>
    </div>"#;

    const HALF_RENDERED: &str = r#"<div>
        <span class="font-rubik tracked-tight">1,234.50</span>
        <span class="font-rubik tracked-tight">   </span>
    </div>"#;

    const NO_PRICES: &str = "<div><p>Loading...</p></div>";

    #[test]
    fn test_accepts_fully_rendered_prices() {
        let validator = PriceCellValidator::moneybees().unwrap();
        assert!(validator.is_valid(&Html::parse_document(FILLED)));
    }

    #[test]
    fn test_rejects_blank_price_cell() {
        let validator = PriceCellValidator::moneybees().unwrap();
        assert!(!validator.is_valid(&Html::parse_document(HALF_RENDERED)));
    }

    #[test]
    fn test_empty_match_set_rejected_by_default() {
        let validator = PriceCellValidator::moneybees().unwrap();
        assert!(!validator.is_valid(&Html::parse_document(NO_PRICES)));
    }

    #[test]
    fn test_allow_empty_accepts_vacuous_page() {
        let validator = PriceCellValidator::moneybees().unwrap().allow_empty();
        assert!(validator.is_valid(&Html::parse_document(NO_PRICES)));
        assert!(!validator.is_valid(&Html::parse_document(HALF_RENDERED)));
    }

    #[test]
    fn test_min_matches_threshold() {
        let validator = PriceCellValidator::moneybees().unwrap().min_matches(3);
        assert!(!validator.is_valid(&Html::parse_document(FILLED)));
    }

    #[test]
    fn test_closure_is_a_validator() {
        let ready = |doc: &Html| doc.root_element().text().any(|t| t.contains("1,240.00"));
        assert!(ready.is_valid(&Html::parse_document(FILLED)));
        assert!(!ready.is_valid(&Html::parse_document(NO_PRICES)));
    }

    #[test]
    fn test_invalid_marker_is_an_error() {
        assert!(matches!(
            PriceCellValidator::new("span[class*="),
            Err(RateError::InvalidSelector { .. })
        ));
    }
}
