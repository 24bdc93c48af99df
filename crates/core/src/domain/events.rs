use serde::{Deserialize, Serialize};

use super::expenses::Expense;

/// A person taking part in an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    /// Unique participant identifier; identity is the id, names are
    /// free text and not guaranteed unique
    pub id: String,

    /// Display name
    pub name: String,
}

/// One required transfer between two participants. Computed, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    /// Participant who pays
    pub from: String,

    /// Participant who receives
    pub to: String,

    /// Amount in the event's reporting currency
    pub amount: f64,
}

/// A group of participants and the expenses they share
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Unique event identifier
    pub id: String,

    /// Event name
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Reporting currency for converted totals
    pub base_currency: String,

    /// Participants, in insertion order
    pub participants: Vec<Participant>,

    /// Expenses owned by this event
    pub expenses: Vec<Expense>,

    /// Unix timestamp in milliseconds
    pub created_at: i64,
}

impl Event {
    /// Creates a new empty event
    pub fn new(name: impl Into<String>, description: impl Into<String>, base_currency: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            base_currency: base_currency.into(),
            participants: Vec::new(),
            expenses: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Changes the reporting currency
    pub fn set_base_currency(&mut self, currency: impl Into<String>) {
        self.base_currency = currency.into();
    }

    /// Adds a participant with a generated id
    pub fn add_participant(&mut self, name: impl Into<String>) -> Participant {
        let participant = Participant {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        };
        self.participants.push(participant.clone());
        participant
    }

    /// Removes a participant and cascades: every expense drops that
    /// participant's split entry. The expenses themselves stay, so
    /// historic totals shrink by the removed member's share.
    pub fn remove_participant(&mut self, participant_id: &str) -> crate::Result<()> {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != participant_id);
        if self.participants.len() == before {
            return Err(crate::Error::UnknownParticipant(participant_id.to_string()));
        }

        for expense in &mut self.expenses {
            expense.splits.retain(|s| s.participant_id != participant_id);
        }

        Ok(())
    }

    /// Looks up a participant by id
    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// Checks whether an id belongs to a current participant
    pub fn is_participant(&self, participant_id: &str) -> bool {
        self.participant(participant_id).is_some()
    }

    /// Adds an expense to the event
    pub fn add_expense(&mut self, expense: Expense) {
        self.expenses.insert(0, expense);
    }

    /// Replaces an expense wholesale by id; returns false when no
    /// expense with that id exists
    pub fn update_expense(&mut self, expense: Expense) -> bool {
        match self.expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(slot) => {
                *slot = expense;
                true
            }
            None => false,
        }
    }

    /// Removes an expense by id; returns false when absent
    pub fn remove_expense(&mut self, expense_id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != expense_id);
        self.expenses.len() != before
    }

    /// Looks up an expense by id
    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expenses::{SplitMember, SplitType};

    fn create_test_event() -> Event {
        let mut event = Event::new("Trip", "Weekend trip", "USD");
        event.participants = vec![
            Participant { id: "a".to_string(), name: "Alice".to_string() },
            Participant { id: "b".to_string(), name: "Bob".to_string() },
        ];
        event
    }

    fn create_test_expense(id: &str) -> Expense {
        Expense {
            id: id.to_string(),
            description: "Lunch".to_string(),
            total_amount: 40.0,
            currency: "USD".to_string(),
            category: Default::default(),
            payer_id: "a".to_string(),
            date: 0,
            split_type: SplitType::Equal,
            splits: vec![
                SplitMember { participant_id: "a".to_string(), value: 0.0 },
                SplitMember { participant_id: "b".to_string(), value: 0.0 },
            ],
            adjustments: vec![],
            items: vec![],
        }
    }

    #[test]
    fn test_add_participant_generates_id() {
        let mut event = create_test_event();
        let id = event.add_participant("Charlie").id;
        assert!(!id.is_empty());
        assert!(event.is_participant(&id));
    }

    #[test]
    fn test_remove_participant_cascades_into_splits() {
        let mut event = create_test_event();
        event.add_expense(create_test_expense("e1"));
        event.add_expense(create_test_expense("e2"));

        event.remove_participant("b").unwrap();

        assert!(!event.is_participant("b"));
        for expense in &event.expenses {
            assert!(!expense.includes("b"));
            assert_eq!(expense.splits.len(), 1);
        }
        // The expenses themselves survive the removal
        assert_eq!(event.expenses.len(), 2);
    }

    #[test]
    fn test_remove_unknown_participant_errors() {
        let mut event = create_test_event();
        let res = event.remove_participant("nobody");
        assert!(matches!(res, Err(crate::Error::UnknownParticipant(_))));
    }

    #[test]
    fn test_update_expense_replaces_whole_record() {
        let mut event = create_test_event();
        event.add_expense(create_test_expense("e1"));

        let mut replacement = create_test_expense("e1");
        replacement.total_amount = 75.0;
        assert!(event.update_expense(replacement));
        assert_eq!(event.expense("e1").unwrap().total_amount, 75.0);

        assert!(!event.update_expense(create_test_expense("missing")));
    }

    #[test]
    fn test_remove_expense() {
        let mut event = create_test_event();
        event.add_expense(create_test_expense("e1"));
        assert!(event.remove_expense("e1"));
        assert!(!event.remove_expense("e1"));
        assert!(event.expenses.is_empty());
    }

    #[test]
    fn test_newest_expense_first() {
        let mut event = create_test_event();
        event.add_expense(create_test_expense("e1"));
        event.add_expense(create_test_expense("e2"));
        assert_eq!(event.expenses[0].id, "e2");
    }
}
