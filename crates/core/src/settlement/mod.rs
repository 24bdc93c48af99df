use crate::domain::{Debt, Event};
use crate::split;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Balances within this tolerance are treated as settled. This is the
/// rounding policy for currency amounts with two decimal places.
pub const SETTLEMENT_EPSILON: f64 = 0.01;

/// Net balances plus the transfer plan that settles them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Participant id -> net balance; positive means "is owed money"
    pub balances: HashMap<String, f64>,

    /// Transfers that bring every balance to zero
    pub debts: Vec<Debt>,
}

/// Reduces an event's expenses into a net balance per participant.
///
/// For each expense the payer gains the expense's share sum (they
/// fronted that much) and every split member loses their own share. A
/// payer who is also a split member nets out partially, which is
/// correct: they are only owed the portion others owe them. Shares
/// belonging to ids no longer in the event are silently dropped,
/// matching the cascade on participant removal.
pub fn net_balances(event: &Event) -> HashMap<String, f64> {
    let mut balances: HashMap<String, f64> = event
        .participants
        .iter()
        .map(|p| (p.id.clone(), 0.0))
        .collect();

    for expense in &event.expenses {
        let shares = split::participant_shares(expense);
        let total_cost: f64 = shares.values().sum();

        if let Some(balance) = balances.get_mut(&expense.payer_id) {
            *balance += total_cost;
        }

        for (participant_id, share) in &shares {
            if let Some(balance) = balances.get_mut(participant_id) {
                *balance -= share;
            }
        }

        debug!(
            expense = %expense.id,
            payer = %expense.payer_id,
            total_cost,
            "accumulated expense"
        );
    }

    balances
}

/// Greedy debtor/creditor matching over balances in the given order.
///
/// Partitions the balances at the settlement tolerance, then runs a
/// two-pointer sweep emitting `min(debtor remaining, creditor remaining)`
/// transfers. Every emitted amount is positive by construction and the
/// sweep terminates with at most `debtors + creditors - 1` transfers.
/// The result is not guaranteed globally minimum; the input order makes
/// it deterministic.
pub fn match_debts(balances: &[(String, f64)]) -> Vec<Debt> {
    let mut debtors: Vec<(String, f64)> = Vec::new();
    let mut creditors: Vec<(String, f64)> = Vec::new();

    for (id, balance) in balances {
        if *balance < -SETTLEMENT_EPSILON {
            debtors.push((id.clone(), balance.abs()));
        } else if *balance > SETTLEMENT_EPSILON {
            creditors.push((id.clone(), *balance));
        }
    }

    let mut debts = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].1.min(creditors[j].1);

        debts.push(Debt {
            from: debtors[i].0.clone(),
            to: creditors[j].0.clone(),
            amount,
        });

        debtors[i].1 -= amount;
        creditors[j].1 -= amount;

        if debtors[i].1 < SETTLEMENT_EPSILON {
            i += 1;
        }
        if creditors[j].1 < SETTLEMENT_EPSILON {
            j += 1;
        }
    }

    debts
}

/// Produces the transfer plan that settles an event.
///
/// Balances are walked in participant insertion order so the plan is
/// deterministic across runs.
pub fn settle(event: &Event) -> Vec<Debt> {
    let balances = net_balances(event);

    let ordered: Vec<(String, f64)> = event
        .participants
        .iter()
        .map(|p| (p.id.clone(), balances.get(&p.id).copied().unwrap_or(0.0)))
        .collect();

    let debts = match_debts(&ordered);

    info!(
        event = %event.id,
        participants = event.participants.len(),
        expenses = event.expenses.len(),
        transfers = debts.len(),
        "settlement plan computed"
    );

    debts
}

/// Balances and transfer plan in one pass, for presentation
pub fn summarize(event: &Event) -> SettlementSummary {
    SettlementSummary {
        balances: net_balances(event),
        debts: settle(event),
    }
}
