use super::group::PenaltySettings;
use super::money::Money;
use crate::error::{ArisanError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Status persisted with a payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    /// The member says they paid and waits for an admin.
    Submitted,
    Rejected,
    #[serde(alias = "approved")]
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Submitted => "submitted",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Paid => "paid",
        };
        f.write_str(name)
    }
}

/// Status as seen at a given moment. `Overdue` is derived from the due date.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pending,
    Submitted,
    Rejected,
    Paid,
    Overdue,
}

/// One member's contribution for one round.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    pub id: String,
    pub group_id: String,
    pub member_id: String,
    pub round: u32,
    pub amount: Money,
    pub status: PaymentStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    /// Group account the member says they paid into.
    #[serde(default)]
    pub payment_account_id: Option<String>,
}

impl Payment {
    pub fn new(id: String, group_id: String, member_id: String, round: u32, amount: Money) -> Self {
        Self {
            id,
            group_id,
            member_id,
            round,
            amount,
            status: PaymentStatus::Pending,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            confirmed_by: None,
            confirmed_at: None,
            paid_at: None,
            note: None,
            payment_account_id: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Still open for submission or confirmation.
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Pending | PaymentStatus::Rejected
        )
    }

    /// Member claims to have paid, optionally naming the account used.
    pub fn submit(&mut self, at: DateTime<Utc>, account_id: Option<String>) -> Result<()> {
        self.transition("submit", &[PaymentStatus::Pending, PaymentStatus::Rejected])?;
        self.status = PaymentStatus::Submitted;
        self.submitted_at = Some(at);
        self.payment_account_id = account_id;
        self.note = None;
        Ok(())
    }

    /// Admin accepts a submitted payment.
    pub fn approve(&mut self, by: &str, at: DateTime<Utc>) -> Result<()> {
        self.transition("approve", &[PaymentStatus::Submitted])?;
        self.status = PaymentStatus::Paid;
        self.approved_by = Some(by.to_string());
        self.approved_at = Some(at);
        self.paid_at = Some(at);
        Ok(())
    }

    /// Admin sends a submitted payment back to the member.
    pub fn reject(&mut self, by: &str, at: DateTime<Utc>, note: Option<String>) -> Result<()> {
        self.transition("reject", &[PaymentStatus::Submitted])?;
        self.status = PaymentStatus::Rejected;
        self.approved_by = Some(by.to_string());
        self.approved_at = Some(at);
        self.note = note;
        Ok(())
    }

    /// Admin records a payment received outside the app, e.g. in cash.
    pub fn confirm(&mut self, by: &str, at: DateTime<Utc>) -> Result<()> {
        self.transition(
            "confirm",
            &[
                PaymentStatus::Pending,
                PaymentStatus::Submitted,
                PaymentStatus::Rejected,
            ],
        )?;
        self.status = PaymentStatus::Paid;
        self.confirmed_by = Some(by.to_string());
        self.confirmed_at = Some(at);
        self.paid_at = Some(at);
        Ok(())
    }

    fn transition(&self, action: &'static str, allowed: &[PaymentStatus]) -> Result<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(ArisanError::InvalidTransition {
                action,
                status: self.status.to_string(),
            })
        }
    }

    pub fn state_at(&self, due_date: DateTime<Utc>, now: DateTime<Utc>) -> PaymentState {
        match self.status {
            PaymentStatus::Paid => PaymentState::Paid,
            PaymentStatus::Submitted => PaymentState::Submitted,
            _ if now > due_date => PaymentState::Overdue,
            PaymentStatus::Pending => PaymentState::Pending,
            PaymentStatus::Rejected => PaymentState::Rejected,
        }
    }

    /// Started days past the due date, zero while not overdue.
    pub fn days_late(&self, due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        if self.state_at(due_date, now) != PaymentState::Overdue {
            return 0;
        }
        let seconds = (now - due_date).num_seconds();
        (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }

    pub fn penalty_at(
        &self,
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
        settings: &PenaltySettings,
    ) -> Money {
        settings.penalty_for(self.amount, self.days_late(due_date, now))
    }
}

/// A payment together with its derived state.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentReport {
    pub payment: Payment,
    pub state: PaymentState,
    pub penalty: Money,
}
