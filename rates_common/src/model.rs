//! Rate data model.
//!
//! A `RateEntry` is one data row of the quote table: the instrument's display
//! name, its ticker symbol and the buy/sell prices as exact decimals. A
//! `RateSnapshot` bundles the ordered rows of one invocation with the source
//! URL and the UTC time they were fetched, ready for the output layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// One row of the quote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    /// Display name of the instrument (trimmed).
    pub name: String,
    /// Short ticker symbol (trimmed).
    pub symbol: String,
    /// Bid price.
    pub buy_price: Decimal,
    /// Ask price.
    pub sell_price: Decimal,
}

impl RateEntry {
    /// Create a new entry.
    pub fn new(name: &str, symbol: &str, buy_price: Decimal, sell_price: Decimal) -> Self {
        RateEntry {
            name: String::from(name),
            symbol: String::from(symbol),
            buy_price,
            sell_price,
        }
    }

    /// Difference between the ask and the bid. May be negative; the page does
    /// not guarantee any ordering between the two columns.
    pub fn spread(&self) -> Decimal {
        self.sell_price - self.buy_price
    }
}

/// Ordered rates extracted by one fetch/extract cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// URL the document was fetched from.
    pub source: String,
    /// UTC time the snapshot was assembled.
    pub fetched_at: DateTime<Utc>,
    /// Rows in document order, header excluded.
    pub rates: Vec<RateEntry>,
}

impl RateSnapshot {
    /// Wrap `rates` fetched from `source`, stamped with the current time.
    pub fn new(source: &str, rates: Vec<RateEntry>) -> Self {
        RateSnapshot {
            source: String::from(source),
            fetched_at: Utc::now(),
            rates,
        }
    }

    /// Encode the snapshot as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, RateError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_spread_can_be_negative() {
        let entry = RateEntry::new("Odd", "ODD", dec!(10.00), dec!(9.50));
        assert_eq!(entry.spread(), dec!(-0.50));
    }

    #[test]
    fn test_snapshot_json_keeps_decimal_text() {
        let snapshot = RateSnapshot::new(
            "https://example.test/rates?ccy=php",
            vec![RateEntry::new("Bitcoin", "BTC", dec!(1234.50), dec!(1240.00))],
        );
        let json = snapshot.to_json_pretty().unwrap();
        assert!(json.contains("\"1234.50\""));
        assert!(json.contains("\"1240.00\""));
        assert!(json.contains("\"symbol\": \"BTC\""));
    }
}
