use super::member::{Member, NewMember};
use super::money::Money;
use super::schedule::{DecliningSchedule, TurnContribution, check_turn, validate_member_count};
use super::turn_order::DrawRecord;
use crate::error::{ArisanError, Result};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const INVITE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const INVITE_CODE_LEN: usize = 6;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum Period {
    #[serde(rename = "mingguan", alias = "weekly")]
    Weekly,
    #[serde(rename = "bulanan", alias = "monthly")]
    Monthly,
}

impl Period {
    pub fn length(self) -> Duration {
        match self {
            Period::Weekly => Duration::days(7),
            Period::Monthly => Duration::days(30),
        }
    }

    pub fn next_due_date(self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + self.length()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum GroupStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "aktif", alias = "active")]
    Active,
    #[serde(rename = "selesai", alias = "completed")]
    Completed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum TurnMethod {
    #[default]
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "undian", alias = "draw")]
    Draw,
}

/// How much each turn pays.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(tag = "mode")]
pub enum ContributionMode {
    /// Everyone pays the group nominal ("tetap").
    #[default]
    #[serde(rename = "tetap", alias = "fixed")]
    Fixed,
    /// Early turns pay more ("menurun").
    #[serde(rename = "menurun", alias = "declining")]
    Declining(DecliningSchedule),
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyKind {
    /// Percent of the payment per started day late.
    #[default]
    Percentage,
    /// One flat amount once the payment is late.
    Fixed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PenaltySettings {
    pub enabled: bool,
    pub kind: PenaltyKind,
    pub amount: Decimal,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: PenaltyKind::Percentage,
            amount: Decimal::ONE,
        }
    }
}

impl PenaltySettings {
    pub fn validate(&self) -> Result<()> {
        Money::non_negative(self.amount, "penalty amount")?;
        Ok(())
    }

    pub fn penalty_for(&self, amount: Money, days_late: i64) -> Money {
        if !self.enabled || days_late <= 0 {
            return Money::ZERO;
        }
        match self.kind {
            PenaltyKind::Percentage => {
                (amount * (self.amount / Decimal::ONE_HUNDRED * Decimal::from(days_late)))
                    .round_to_unit()
            }
            PenaltyKind::Fixed => Money::new(self.amount),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct GroupSettings {
    #[serde(default)]
    pub penalty: PenaltySettings,
}

impl GroupSettings {
    pub fn validate(&self) -> Result<()> {
        self.penalty.validate()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentAccountKind {
    Bank,
    #[serde(alias = "e-wallet")]
    Ewallet,
}

/// A bank or e-wallet account members transfer their contribution to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentAccount {
    pub id: String,
    pub kind: PaymentAccountKind,
    /// Bank or e-wallet name, e.g. BCA or GoPay.
    pub provider: String,
    pub account_number: String,
    pub account_holder: String,
    pub active: bool,
}

/// Input for registering a payment account.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewPaymentAccount {
    pub kind: PaymentAccountKind,
    pub provider: String,
    pub account_number: String,
    pub account_holder: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewPaymentAccount {
    pub fn validate(&self) -> Result<()> {
        for (value, what) in [
            (&self.provider, "account provider"),
            (&self.account_number, "account number"),
            (&self.account_holder, "account holder"),
        ] {
            if value.trim().is_empty() {
                return Err(ArisanError::ValidationError(format!(
                    "{what} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

impl PaymentAccount {
    pub fn new(id: String, account: NewPaymentAccount) -> Self {
        Self {
            id,
            kind: account.kind,
            provider: account.provider,
            account_number: account.account_number,
            account_holder: account.account_holder,
            active: account.active,
        }
    }
}

/// Checks an optional day of the month (1..=31).
fn validate_day(day: Option<u8>, what: &str) -> Result<()> {
    match day {
        Some(day) if !(1..=31).contains(&day) => Err(ArisanError::ValidationError(format!(
            "{what} must be a day of the month between 1 and 31 (got {day})"
        ))),
        _ => Ok(()),
    }
}

/// One rotating savings group ("arisan").
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Per-member contribution in fixed mode.
    pub nominal: Money,
    pub period: Period,
    pub total_members: u32,
    pub current_round: u32,
    pub status: GroupStatus,
    pub turn_method: TurnMethod,
    pub mode: ContributionMode,
    pub invite_code: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    /// Day of the month the pot is paid out.
    #[serde(default)]
    pub disbursement_day: Option<u8>,
    /// Day of the month contributions are due.
    #[serde(default)]
    pub payment_deadline_day: Option<u8>,
    #[serde(default)]
    pub settings: GroupSettings,
    #[serde(default)]
    pub payment_accounts: Vec<PaymentAccount>,
    #[serde(default)]
    pub draw_history: Vec<DrawRecord>,
}

impl Group {
    /// Amount a member holding `turn` pays each round.
    pub fn contribution_for_turn(&self, turn: u32) -> Result<Money> {
        check_turn(self.total_members, turn)?;
        match &self.mode {
            ContributionMode::Fixed => Ok(self.nominal),
            ContributionMode::Declining(schedule) => {
                schedule.contribution_for_turn(self.total_members, turn)
            }
        }
    }

    /// Contribution for a member taking `turn`, honouring an amount they chose
    /// themselves in fixed mode.
    pub fn contribution_for_member(&self, turn: u32, chosen: Option<Money>) -> Result<Money> {
        match (&self.mode, chosen) {
            (ContributionMode::Fixed, Some(amount)) => {
                Money::positive(amount.value(), "contribution")
            }
            _ => self.contribution_for_turn(turn),
        }
    }

    /// An active account members may pay into.
    pub fn active_account(&self, account_id: &str) -> Option<&PaymentAccount> {
        self.payment_accounts
            .iter()
            .find(|account| account.id == account_id && account.active)
    }

    pub fn is_declining(&self) -> bool {
        matches!(self.mode, ContributionMode::Declining(_))
    }

    pub fn is_completed(&self) -> bool {
        self.status == GroupStatus::Completed
    }

    /// The creator and any chair or treasurer may administer the group.
    pub fn is_admin(&self, user_id: &str, members: &[Member]) -> bool {
        self.created_by == user_id
            || members
                .iter()
                .any(|m| m.user_id.as_deref() == Some(user_id) && m.role.is_admin())
    }
}

/// Input for creating a group.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewGroup {
    pub name: String,
    pub nominal: Money,
    pub period: Period,
    pub total_members: u32,
    #[serde(default)]
    pub turn_method: TurnMethod,
    #[serde(default)]
    pub mode: ContributionMode,
    #[serde(default)]
    pub disbursement_day: Option<u8>,
    #[serde(default)]
    pub payment_deadline_day: Option<u8>,
    #[serde(default)]
    pub settings: GroupSettings,
    /// Initial members in turn order. The creator should be first.
    #[serde(default)]
    pub members: Vec<NewMember>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ArisanError::ValidationError(
                "group name must not be empty".to_string(),
            ));
        }
        Money::positive(self.nominal.value(), "nominal")?;
        validate_member_count(self.total_members)?;
        if self.members.len() > self.total_members as usize {
            return Err(ArisanError::ValidationError(format!(
                "{} members listed for a group of {}",
                self.members.len(),
                self.total_members
            )));
        }
        for member in &self.members {
            if member.name.trim().is_empty() {
                return Err(ArisanError::ValidationError(
                    "member name must not be empty".to_string(),
                ));
            }
            if let Some(amount) = member.contribution {
                Money::positive(amount.value(), "contribution")?;
            }
        }
        if let ContributionMode::Declining(schedule) = &self.mode {
            schedule.validate()?;
        }
        validate_day(self.disbursement_day, "disbursement day")?;
        validate_day(self.payment_deadline_day, "payment deadline")?;
        self.settings.validate()
    }

    /// Per-turn amounts the group would charge, turn 1 first.
    pub fn schedule(&self) -> Result<Vec<TurnContribution>> {
        validate_member_count(self.total_members)?;
        match &self.mode {
            ContributionMode::Fixed => Ok((1..=self.total_members)
                .map(|turn| TurnContribution {
                    turn,
                    reduction: Money::ZERO,
                    net: self.nominal,
                    contribution: self.nominal,
                    floored: false,
                })
                .collect()),
            ContributionMode::Declining(schedule) => schedule.contributions(self.total_members),
        }
    }
}

pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}
