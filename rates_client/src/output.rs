//! Presentation of an extracted snapshot.
use clap::ValueEnum;
use rates_common::{RateError, RateSnapshot};
use strum_macros::{Display, EnumString};

/// How the snapshot is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[value(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Aligned text columns.
    Table,
    /// Pretty-printed JSON with decimals as strings.
    Json,
}

/// Format `snapshot` for printing.
pub fn format_snapshot(snapshot: &RateSnapshot, format: OutputFormat) -> Result<String, RateError> {
    match format {
        OutputFormat::Json => snapshot.to_json_pretty(),
        OutputFormat::Table => Ok(table(snapshot)),
    }
}

fn table(snapshot: &RateSnapshot) -> String {
    let mut out = format!(
        "{} @ {}\n{:<24} {:<8} {:>18} {:>18}\n",
        snapshot.source,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
        "NAME",
        "SYMBOL",
        "BUY",
        "SELL"
    );
    for rate in &snapshot.rates {
        out.push_str(&format!(
            "{:<24} {:<8} {:>18} {:>18}\n",
            rate.name,
            rate.symbol,
            rate.buy_price.to_string(),
            rate.sell_price.to_string()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rates_common::RateEntry;
    use rust_decimal_macros::dec;

    fn snapshot() -> RateSnapshot {
        RateSnapshot {
            source: String::from("https://hive.moneybees.ph/rates?ccy=php"),
            fetched_at: Utc.with_ymd_and_hms(2026, 10, 14, 8, 30, 0).unwrap(),
            rates: vec![
                RateEntry::new("Bitcoin", "BTC", dec!(1234.50), dec!(1240.00)),
                RateEntry::new("Tether", "USDT", dec!(56.10), dec!(56.90)),
            ],
        }
    }

    #[test]
    fn test_table_lists_rows_in_order() {
        let text = format_snapshot(&snapshot(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("2026-10-14 08:30:00 UTC"));
        assert!(lines[1].starts_with("NAME"));
        assert!(lines[2].starts_with("Bitcoin"));
        assert!(lines[2].contains("1234.50"));
        assert!(lines[3].contains("USDT"));
    }

    #[test]
    fn test_json_output() {
        let text = format_snapshot(&snapshot(), OutputFormat::Json).unwrap();
        assert!(text.contains("\"buy_price\": \"1234.50\""));
        assert!(text.contains("\"fetched_at\": \"2026-10-14T08:30:00Z\""));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!("TABLE".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
    }
}
