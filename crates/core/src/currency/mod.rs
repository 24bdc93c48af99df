use async_trait::async_trait;
use std::collections::HashMap;
use tracing::warn;

/// Source of exchange rates for a rate table refresh
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the latest rates relative to `base`, keyed by currency
    /// symbol
    async fn latest(&self, base: &str) -> crate::Result<HashMap<String, f64>>;
}

/// USD-based exchange rate table with per-event overrides.
///
/// Conversion is a presentation concern: converted totals are shown to
/// the user, but the settlement math itself always runs in a single
/// reporting currency.
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Units of each currency per one USD
    rates: HashMap<String, f64>,

    /// Event id -> currency -> user-pinned rate toward USD
    custom: HashMap<String, HashMap<String, f64>>,
}

impl Default for RateTable {
    /// Built-in fallback rates, used until a refresh succeeds
    fn default() -> Self {
        let rates = [
            ("USD".to_string(), 1.0),
            ("EUR".to_string(), 0.92),
            ("GBP".to_string(), 0.79),
            ("JPY".to_string(), 150.0),
        ]
        .into_iter()
        .collect();

        Self {
            rates,
            custom: HashMap::new(),
        }
    }
}

impl RateTable {
    /// Creates a table with the built-in fallback rates
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the table with rates fetched from a provider. On
    /// failure the current rates are kept, so the fallbacks stay usable
    /// offline.
    pub async fn refresh(&mut self, provider: &dyn RateProvider) {
        match provider.latest("USD").await {
            Ok(rates) => {
                self.rates = rates;
                self.rates.insert("USD".to_string(), 1.0);
            }
            Err(e) => {
                warn!("Could not fetch live rates, keeping current table: {e}");
            }
        }
    }

    /// Pins a rate toward USD for one event, overriding the global
    /// table
    pub fn set_custom_rate(&mut self, event_id: &str, from: &str, rate: f64) {
        self.custom
            .entry(event_id.to_string())
            .or_default()
            .insert(from.to_string(), rate);
    }

    /// Exchange rate from one currency to another, bridged through USD.
    /// Unknown symbols fall back to a rate of 1.
    pub fn rate(&self, from: &str, to: &str, event_id: Option<&str>) -> f64 {
        // Event overrides are pinned toward USD only
        if to == "USD" {
            if let Some(rate) = event_id
                .and_then(|id| self.custom.get(id))
                .and_then(|rates| rates.get(from))
            {
                return *rate;
            }
        }

        let from_rate = self.rates.get(from).copied().unwrap_or(1.0);
        let to_rate = self.rates.get(to).copied().unwrap_or(1.0);
        to_rate / from_rate
    }

    /// Converts an amount between currencies
    pub fn convert(&self, amount: f64, from: &str, to: &str, event_id: Option<&str>) -> f64 {
        if from == to {
            return amount;
        }
        amount * self.rate(from, to, event_id)
    }

    /// Known currency symbols, sorted for stable display
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.rates.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(HashMap<String, f64>);

    #[async_trait]
    impl RateProvider for FixedProvider {
        async fn latest(&self, _base: &str) -> crate::Result<HashMap<String, f64>> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        async fn latest(&self, _base: &str) -> crate::Result<HashMap<String, f64>> {
            Err(crate::Error::RateFetch("network unreachable".to_string()))
        }
    }

    #[test]
    fn test_same_currency_is_identity() {
        let table = RateTable::new();
        assert_eq!(table.convert(42.0, "EUR", "EUR", None), 42.0);
    }

    #[test]
    fn test_usd_bridge_conversion() {
        let table = RateTable::new();
        // EUR -> GBP goes through USD: 0.79 / 0.92
        let rate = table.rate("EUR", "GBP", None);
        assert!((rate - 0.79 / 0.92).abs() < 1e-9);
        assert!((table.convert(92.0, "EUR", "USD", None) - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_unknown_symbol_falls_back_to_one() {
        let table = RateTable::new();
        assert_eq!(table.rate("XXX", "USD", None), 1.0);
    }

    #[test]
    fn test_custom_rate_applies_only_toward_usd() {
        let mut table = RateTable::new();
        table.set_custom_rate("ev1", "EUR", 0.5);

        assert_eq!(table.rate("EUR", "USD", Some("ev1")), 0.5);
        // Other events and other targets keep the global table
        assert!((table.rate("EUR", "USD", Some("ev2")) - 1.0 / 0.92).abs() < 1e-9);
        assert!((table.rate("EUR", "GBP", Some("ev1")) - 0.79 / 0.92).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_refresh_replaces_rates() {
        let mut table = RateTable::new();
        let provider = FixedProvider(
            [("EUR".to_string(), 0.95), ("CHF".to_string(), 0.88)]
                .into_iter()
                .collect(),
        );

        table.refresh(&provider).await;

        assert_eq!(table.rate("USD", "EUR", None), 0.95);
        assert_eq!(table.rate("USD", "CHF", None), 0.88);
        // USD anchor is always present after a refresh
        assert_eq!(table.rate("USD", "USD", None), 1.0);
        // Symbols not in the fresh payload are gone
        assert_eq!(table.rate("JPY", "USD", None), 1.0);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_fallbacks() {
        let mut table = RateTable::new();
        table.refresh(&FailingProvider).await;

        assert_eq!(table.rate("USD", "JPY", None), 150.0);
        assert_eq!(table.symbols(), vec!["EUR", "GBP", "JPY", "USD"]);
    }
}
