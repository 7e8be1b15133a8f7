//! Small helpers over the `scraper` document tree.
use rates_common::RateError;
use scraper::{ElementRef, Selector};

/// Compile a CSS selector, keeping its source text in the error.
pub fn compile(selector: &str) -> Result<Selector, RateError> {
    Selector::parse(selector).map_err(|e| RateError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Concatenated descendant text of `element`, trimmed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_compile_reports_selector_text() {
        match compile("div[[") {
            Err(RateError::InvalidSelector { selector, .. }) => assert_eq!(selector, "div[["),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_element_text_joins_and_trims() {
        let doc = Html::parse_fragment("<p>  <b>1,2</b>34.<i>5</i>  </p>");
        let selector = compile("p").unwrap();
        let p = doc.select(&selector).next().unwrap();
        assert_eq!(element_text(p), "1,234.5");
    }
}
