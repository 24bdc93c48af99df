use serde::{Deserialize, Serialize};

/// Tolerance used when checking that split values add up
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// Rule determining how an expense's cost is distributed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    /// Uniform share per split member
    Equal,
    /// Each member's value is percentage points (0-100)
    Percentage,
    /// Each member's value is a relative weight
    Shares,
    /// Each member's value is an absolute currency amount
    Custom,
}

/// Expense category used for filtering and display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Food,
    Transport,
    Accommodation,
    Entertainment,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

/// Kind of adjustment layered on top of an expense's base amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Tax,
    Tip,
    Fee,
    ServiceFee,
    /// The only kind that subtracts from the total
    Discount,
}

/// A tax, tip, fee, or discount attached to one expense
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Adjustment {
    /// Unique adjustment identifier
    pub id: String,

    /// Display label (e.g. "VAT", "Delivery")
    pub name: String,

    /// Percentage of the base amount, or an absolute value in the
    /// expense's currency, depending on `is_percentage`
    pub amount: f64,

    /// Adjustment kind; discounts subtract, all other kinds add
    pub kind: AdjustmentKind,

    /// Interpret `amount` as a percentage of the base amount
    pub is_percentage: bool,

    /// Fold this adjustment into the amount being split, rather than
    /// distributing it proportionally after shares are computed
    pub applied_before_split: bool,
}

/// One participant's entry in an expense's split list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitMember {
    /// Participant included in the split
    pub participant_id: String,

    /// Meaning depends on the expense's split type
    pub value: f64,
}

/// A single line on a receipt, carried for display only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Unique item identifier
    pub id: String,

    /// Item label
    pub name: String,

    /// Item price in the expense's currency
    pub price: f64,
}

/// A shared expense within an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    /// Unique expense identifier
    pub id: String,

    /// Human-readable description
    pub description: String,

    /// Base amount before adjustments
    pub total_amount: f64,

    /// Currency the expense was paid in
    pub currency: String,

    /// Expense category
    #[serde(default)]
    pub category: Category,

    /// Participant who fronted the money
    pub payer_id: String,

    /// Unix timestamp in milliseconds
    pub date: i64,

    /// Rule used to distribute the cost
    pub split_type: SplitType,

    /// Participants included in the split; a participant absent from
    /// this list is not part of the split
    pub splits: Vec<SplitMember>,

    /// Adjustments applied on top of the base amount
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,

    /// Receipt line items
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Adjustment {
    /// Monetary value of this adjustment. Percentage adjustments are
    /// always evaluated against the base amount so they never compound
    /// on each other.
    pub fn value_against(&self, base_amount: f64) -> f64 {
        if self.is_percentage {
            base_amount * self.amount / 100.0
        } else {
            self.amount
        }
    }

    /// Signed monetary value: discounts subtract, all other kinds add
    pub fn signed_value(&self, base_amount: f64) -> f64 {
        match self.kind {
            AdjustmentKind::Discount => -self.value_against(base_amount),
            _ => self.value_against(base_amount),
        }
    }
}

impl Expense {
    /// Sum of the raw split values (percentage points, weights, or
    /// amounts depending on split type)
    pub fn split_value_total(&self) -> f64 {
        self.splits.iter().map(|s| s.value).sum()
    }

    /// Checks whether a participant is part of this expense's split
    pub fn includes(&self, participant_id: &str) -> bool {
        self.splits.iter().any(|s| s.participant_id == participant_id)
    }

    /// Validates the expense for saving.
    ///
    /// The share calculator itself never enforces this; it computes an
    /// answer from whatever values are present. Callers are expected to
    /// validate before persisting.
    pub fn validate(&self) -> crate::Result<()> {
        if self.total_amount < 0.0 {
            return Err(crate::Error::InvalidExpense(
                "Base amount must not be negative".to_string(),
            ));
        }

        if self.splits.is_empty() {
            return Err(crate::Error::InvalidExpense(
                "Expense must include at least one participant".to_string(),
            ));
        }

        match self.split_type {
            SplitType::Percentage => {
                let total = self.split_value_total();
                if (total - 100.0).abs() >= SPLIT_TOLERANCE {
                    return Err(crate::Error::InvalidExpense(format!(
                        "Percentage splits must sum to 100, got {:.2}",
                        total
                    )));
                }
            }
            SplitType::Custom => {
                let total = self.split_value_total();
                if (total - self.total_amount).abs() >= SPLIT_TOLERANCE {
                    return Err(crate::Error::InvalidExpense(format!(
                        "Custom splits must sum to the base amount {:.2}, got {:.2}",
                        self.total_amount, total
                    )));
                }
            }
            SplitType::Equal | SplitType::Shares => {}
        }

        Ok(())
    }
}
