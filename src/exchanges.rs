use crate::config::Exchanges as ExchangesConfig;
use std::collections::{HashMap, HashSet};

/// Maps export exchange codes to platform exchange names and builds market ids
#[derive(Debug, Clone)]
pub struct ExchangeTable {
    codes: HashMap<String, String>,
    backwards: HashSet<String>,
}

impl ExchangeTable {
    pub fn new(codes: HashMap<String, String>, backwards: HashSet<String>) -> Self {
        Self { codes, backwards }
    }

    /// Resolve an exchange code to the platform exchange name
    pub fn exchange(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// Whether the exchange quotes its pairs as QUOTE/BASE
    pub fn is_backwards(&self, exchange: &str) -> bool {
        self.backwards.contains(exchange)
    }

    /// Build the platform market id for an exported `BASE/QUOTE` market name
    pub fn market_id(&self, code: &str, market_name: &str) -> Option<String> {
        let exchange = self.exchange(code)?;
        let (base, quote) = market_name.split_once('/')?;

        if base.is_empty() || quote.is_empty() || quote.contains('/') {
            return None;
        }

        Some(spot_market_id(exchange, base, quote, self.is_backwards(exchange)))
    }
}

impl Default for ExchangeTable {
    fn default() -> Self {
        ExchangesConfig::default().into()
    }
}

impl From<ExchangesConfig> for ExchangeTable {
    fn from(config: ExchangesConfig) -> Self {
        Self::new(config.codes, config.backwards)
    }
}

fn spot_market_id(exchange: &str, base: &str, quote: &str, backwards: bool) -> String {
    if backwards {
        format!("{}_SPOT_{}_{}", exchange, quote, base)
    } else {
        format!("{}_SPOT_{}_{}", exchange, base, quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExchangeTable {
        ExchangeTable::new(
            HashMap::from([
                ("PLNX".to_string(), "POLONIEX".to_string()),
                ("EXCH".to_string(), "EXCHANGE".to_string()),
            ]),
            HashSet::from(["POLONIEX".to_string()]),
        )
    }

    #[test]
    fn backwards_exchange_swaps_the_pair() {
        assert_eq!(
            table().market_id("PLNX", "BTC/USD").as_deref(),
            Some("POLONIEX_SPOT_USD_BTC")
        );
    }

    #[test]
    fn regular_exchange_keeps_the_pair() {
        assert_eq!(
            table().market_id("EXCH", "BTC/USD").as_deref(),
            Some("EXCHANGE_SPOT_BTC_USD")
        );
    }

    #[test]
    fn unknown_code_has_no_market() {
        assert_eq!(table().market_id("NOPE", "BTC/USD"), None);
    }

    #[test]
    fn malformed_market_names_have_no_market() {
        let table = table();

        assert_eq!(table.market_id("EXCH", "BTCUSD"), None);
        assert_eq!(table.market_id("EXCH", "BTC/"), None);
        assert_eq!(table.market_id("EXCH", "BTC/USD/EUR"), None);
    }

    #[test]
    fn default_table_only_marks_poloniex_backwards() {
        let table = ExchangeTable::default();

        assert!(table.is_backwards("POLONIEX"));
        assert!(!table.is_backwards("BITSTAMP"));
        assert_eq!(table.exchange("PLNX"), None);
    }
}
