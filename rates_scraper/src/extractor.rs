//! Structural extraction of rate rows from a validated document.
//!
//! The rates page has no semantic table markup. Rows are addressed by
//! position inside a fixed container path:
//!
//! - the data region is the first element matching the table selector;
//! - every row selector match inside it is a row, and the first one is the
//!   column header row;
//! - the name is the first span of the identity cell, the symbol the third
//!   (the second holds a separator);
//! - buy and sell are the second and third columns. When several elements
//!   match a price selector inside one row the last one is used.
//!
//! What happens to a malformed row is chosen with `RowPolicy`.
use clap::ValueEnum;
use log::{debug, warn};
use rates_common::{NumberFormat, RateEntry, RateError};
use scraper::{ElementRef, Html, Selector};
use strum_macros::{Display, EnumString};

use crate::dom::{compile, element_text};

/// Data region of the moneybees rates page.
pub const TABLE_SELECTOR: &str = r#"div#table-view>div>div>div[class*="flex-column"]"#;
/// One row of the rates table, header included.
pub const ROW_SELECTOR: &str = "div.mb1px.justify-center";
/// Instrument display name inside a row.
pub const NAME_SELECTOR: &str = "div.flex.items-center > div > span:nth-child(1)";
/// Instrument symbol inside a row.
pub const SYMBOL_SELECTOR: &str = "div.flex.items-center > div > span:nth-child(3)";
/// Buy price column inside a row.
pub const BUY_SELECTOR: &str = "div:nth-child(2)";
/// Sell price column inside a row.
pub const SELL_SELECTOR: &str = "div:nth-child(3)";

/// What to do with a row that is missing a field or has an unreadable price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[value(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RowPolicy {
    /// Fail the whole extraction on the first bad row.
    #[default]
    Abort,
    /// Log the bad row and continue with the next one.
    Skip,
}

/// Compiled selectors addressing the rates table.
#[derive(Debug, Clone)]
pub struct TableLayout {
    table: Selector,
    row: Selector,
    name: Selector,
    symbol: Selector,
    buy: Selector,
    sell: Selector,
}

impl TableLayout {
    /// Compile a layout from selector source text.
    pub fn new(
        table: &str,
        row: &str,
        name: &str,
        symbol: &str,
        buy: &str,
        sell: &str,
    ) -> Result<Self, RateError> {
        Ok(TableLayout {
            table: compile(table)?,
            row: compile(row)?,
            name: compile(name)?,
            symbol: compile(symbol)?,
            buy: compile(buy)?,
            sell: compile(sell)?,
        })
    }

    /// Layout of the moneybees rates page.
    pub fn moneybees() -> Result<Self, RateError> {
        Self::new(
            TABLE_SELECTOR,
            ROW_SELECTOR,
            NAME_SELECTOR,
            SYMBOL_SELECTOR,
            BUY_SELECTOR,
            SELL_SELECTOR,
        )
    }
}

/// Converts a rates document into ordered `RateEntry` rows.
#[derive(Debug, Clone)]
pub struct RateExtractor {
    layout: TableLayout,
    policy: RowPolicy,
    format: NumberFormat,
}

impl RateExtractor {
    /// Extractor for `layout`, aborting on bad rows and parsing `1,234.50` prices.
    pub fn new(layout: TableLayout) -> Self {
        RateExtractor {
            layout,
            policy: RowPolicy::default(),
            format: NumberFormat::default(),
        }
    }

    /// Extractor for the moneybees rates page.
    pub fn moneybees() -> Result<Self, RateError> {
        Ok(Self::new(TableLayout::moneybees()?))
    }

    /// Set the malformed-row policy.
    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the number format of the price columns.
    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Extract every data row of `document` in document order.
    ///
    /// A missing table is always an error. A table with only its header row
    /// yields an empty list.
    pub fn extract(&self, document: &Html) -> Result<Vec<RateEntry>, RateError> {
        let table = document.select(&self.layout.table).next().ok_or_else(|| {
            RateError::StructuralMismatch(String::from("rates table not found"))
        })?;

        let mut rates = Vec::new();
        for (index, row) in table.select(&self.layout.row).enumerate().skip(1) {
            match self.parse_row(row) {
                Ok(entry) => rates.push(entry),
                Err(e) => match self.policy {
                    RowPolicy::Abort => return Err(e),
                    RowPolicy::Skip => warn!("Skipping row {}: {}", index, e),
                },
            }
        }
        debug!("Extracted {} rates", rates.len());
        Ok(rates)
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Result<RateEntry, RateError> {
        let name = first_text(row, &self.layout.name, "name")?;
        let symbol = first_text(row, &self.layout.symbol, "symbol")?;
        let buy_price = self.format.parse(&last_text(row, &self.layout.buy, "buy price")?)?;
        let sell_price = self.format.parse(&last_text(row, &self.layout.sell, "sell price")?)?;

        Ok(RateEntry {
            name,
            symbol,
            buy_price,
            sell_price,
        })
    }
}

fn first_text(row: ElementRef<'_>, selector: &Selector, field: &str) -> Result<String, RateError> {
    non_empty(row.select(selector).next(), field)
}

fn last_text(row: ElementRef<'_>, selector: &Selector, field: &str) -> Result<String, RateError> {
    non_empty(row.select(selector).last(), field)
}

fn non_empty(element: Option<ElementRef<'_>>, field: &str) -> Result<String, RateError> {
    element
        .map(element_text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| RateError::StructuralMismatch(format!("row has no {}", field)))
}
