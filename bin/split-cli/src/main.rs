use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use split_core::{settlement, split, Event, RateProvider, RateTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const RATES_URL: &str = "https://api.frankfurter.app/latest";

/// Expense splitting and settlement from the command line
#[derive(Parser)]
#[command(name = "split-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print net balances and the transfer plan for an event file
    Settle {
        /// Path to an event JSON file
        file: PathBuf,

        /// Convert displayed amounts into this currency
        #[arg(long)]
        currency: Option<String>,

        /// Fetch live exchange rates before converting
        #[arg(long)]
        live_rates: bool,
    },

    /// Print per-expense final totals and the event grand total
    Totals {
        /// Path to an event JSON file
        file: PathBuf,

        /// Convert displayed amounts into this currency
        #[arg(long)]
        currency: Option<String>,

        /// Fetch live exchange rates before converting
        #[arg(long)]
        live_rates: bool,
    },

    /// Print the exchange rate table
    Rates {
        /// Base currency to quote against
        #[arg(long, default_value = "USD")]
        base: String,
    },
}

/// Live rates from api.frankfurter.app, the same source the fallback
/// table mirrors
struct FrankfurterProvider {
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct FrankfurterResponse {
    rates: HashMap<String, f64>,
}

impl FrankfurterProvider {
    fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    async fn latest(&self, base: &str) -> split_core::Result<HashMap<String, f64>> {
        let response = self
            .client
            .get(RATES_URL)
            .query(&[("from", base)])
            .send()
            .await
            .map_err(|e| split_core::Error::RateFetch(e.to_string()))?;

        let payload: FrankfurterResponse = response
            .json()
            .await
            .map_err(|e| split_core::Error::RateFetch(e.to_string()))?;

        Ok(payload.rates)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Settle {
            file,
            currency,
            live_rates,
        } => {
            let event = load_event(&file)?;
            let rates = rate_table(live_rates).await;
            print_settlement(&event, &rates, currency.as_deref());
        }
        Command::Totals {
            file,
            currency,
            live_rates,
        } => {
            let event = load_event(&file)?;
            let rates = rate_table(live_rates).await;
            print_totals(&event, &rates, currency.as_deref());
        }
        Command::Rates { base } => {
            let mut rates = RateTable::new();
            rates.refresh(&FrankfurterProvider::new()).await;
            for symbol in rates.symbols() {
                println!("{symbol:>4}  {:.4}", rates.rate(&base, &symbol, None));
            }
        }
    }

    Ok(())
}

fn load_event(path: &Path) -> anyhow::Result<Event> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading event file {}", path.display()))?;
    let event: Event = serde_json::from_str(&data)
        .with_context(|| format!("parsing event file {}", path.display()))?;

    info!(
        event = %event.id,
        participants = event.participants.len(),
        expenses = event.expenses.len(),
        "loaded event"
    );

    // The engine still computes an answer for invalid splits; surface
    // them so the numbers can be read with that in mind
    for expense in &event.expenses {
        if let Err(e) = expense.validate() {
            warn!(expense = %expense.id, "{e}");
        }
    }

    Ok(event)
}

async fn rate_table(live: bool) -> RateTable {
    let mut rates = RateTable::new();
    if live {
        rates.refresh(&FrankfurterProvider::new()).await;
    }
    rates
}

fn display_name(event: &Event, participant_id: &str) -> String {
    event
        .participant(participant_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| participant_id.to_string())
}

fn print_settlement(event: &Event, rates: &RateTable, currency: Option<&str>) {
    let target = currency.unwrap_or(&event.base_currency);
    let summary = settlement::summarize(event);

    println!("Event: {} ({})", event.name, target);
    println!();
    println!("Net balances:");
    for participant in &event.participants {
        let balance = summary.balances.get(&participant.id).copied().unwrap_or(0.0);
        let shown = rates.convert(balance, &event.base_currency, target, Some(&event.id));
        println!("  {:<20} {:>10.2}", participant.name, shown);
    }

    println!();
    if summary.debts.is_empty() {
        println!("All settled, no transfers needed.");
        return;
    }

    println!("Transfers:");
    for debt in &summary.debts {
        let shown = rates.convert(debt.amount, &event.base_currency, target, Some(&event.id));
        println!(
            "  {} pays {} {:.2} {}",
            display_name(event, &debt.from),
            display_name(event, &debt.to),
            shown,
            target
        );
    }
}

fn print_totals(event: &Event, rates: &RateTable, currency: Option<&str>) {
    let target = currency.unwrap_or(&event.base_currency);

    println!("Event: {} ({})", event.name, target);
    println!();

    let mut grand_total = 0.0;
    for expense in &event.expenses {
        let total = split::final_total(expense);
        let converted = rates.convert(total, &expense.currency, target, Some(&event.id));
        grand_total += converted;
        println!(
            "  {:<30} {:>10.2} {}  (≈ {:.2} {})",
            expense.description, total, expense.currency, converted, target
        );
    }

    println!();
    println!("  {:<30} {:>10.2} {}", "Grand total", grand_total, target);
}
