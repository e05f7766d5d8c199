use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One "giliran": the period in which a single member receives the pot.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Round {
    pub id: String,
    pub group_id: String,
    pub round_number: u32,
    pub winner_id: String,
    pub winner_name: String,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_collected: Money,
}

impl Round {
    pub fn record_payment(&mut self, amount: Money) {
        self.total_collected += amount;
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}
