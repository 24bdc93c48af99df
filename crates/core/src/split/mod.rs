use crate::domain::{Expense, SplitType};
use std::collections::HashMap;

/// Calculates the all-adjustments-included grand total of an expense,
/// independent of split mechanics. Used for display and for sorting or
/// filtering expenses by cost.
pub fn final_total(expense: &Expense) -> f64 {
    let mut total = expense.total_amount;

    for adjustment in &expense.adjustments {
        total += adjustment.signed_value(expense.total_amount);
    }

    // A large discount can push the total below zero
    total.max(0.0)
}

/// Calculates each split member's monetary share of one expense, in the
/// expense's currency.
///
/// Adjustments applied before the split are folded into the amount being
/// split; adjustments applied after are distributed in proportion to the
/// already-computed shares, so a member with a zero share pays none of a
/// delivery fee either. Degenerate inputs (no members, zero weights, zero
/// totals) resolve to zeros rather than errors.
pub fn participant_shares(expense: &Expense) -> HashMap<String, f64> {
    let mut shares: HashMap<String, f64> = HashMap::new();
    let member_count = expense.splits.len();
    if member_count == 0 {
        return shares;
    }

    let (before, after): (Vec<_>, Vec<_>) = expense
        .adjustments
        .iter()
        .partition(|a| a.applied_before_split);

    let amount_to_split: f64 = expense.total_amount
        + before
            .iter()
            .map(|a| a.signed_value(expense.total_amount))
            .sum::<f64>();

    match expense.split_type {
        SplitType::Equal => {
            let share = amount_to_split / member_count as f64;
            for member in &expense.splits {
                shares.insert(member.participant_id.clone(), share);
            }
        }
        SplitType::Percentage => {
            for member in &expense.splits {
                shares.insert(
                    member.participant_id.clone(),
                    amount_to_split * member.value / 100.0,
                );
            }
        }
        SplitType::Shares => {
            let total_weight = expense.split_value_total();
            // Guard the denominator so all-zero weights yield zero shares
            let total_weight = if total_weight == 0.0 { 1.0 } else { total_weight };
            for member in &expense.splits {
                shares.insert(
                    member.participant_id.clone(),
                    amount_to_split * member.value / total_weight,
                );
            }
        }
        SplitType::Custom => {
            // Custom values already represent each member's intended
            // contribution to the pre-after-adjustment pool
            for member in &expense.splits {
                shares.insert(member.participant_id.clone(), member.value);
            }
        }
    }

    let after_total: f64 = after
        .iter()
        .map(|a| a.signed_value(expense.total_amount))
        .sum();

    if after_total != 0.0 {
        let share_total: f64 = shares.values().sum();
        // Skip distribution when there is nothing to apportion against
        if share_total != 0.0 {
            for share in shares.values_mut() {
                *share += after_total * (*share / share_total);
            }
        }
    }

    shares
}
