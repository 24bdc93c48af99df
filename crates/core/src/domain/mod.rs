pub mod events;
pub mod expenses;

pub use events::{Debt, Event, Participant};
pub use expenses::{Adjustment, AdjustmentKind, Category, Expense, LineItem, SplitMember, SplitType};
