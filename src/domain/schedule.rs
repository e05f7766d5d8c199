//! Declining ("menurun") contribution schedule.
//!
//! Early turns pay more than late turns. The contribution of every turn is
//! re-derived from the schedule parameters on each call, so changing a
//! parameter before members join never leaves a stale table behind.

use super::money::Money;
use crate::error::{ArisanError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest number of members a group can run with.
pub const MIN_MEMBERS: u32 = 2;
/// Largest number of members (and therefore rounds) a group can run with.
pub const MAX_MEMBERS: u32 = 1000;

pub(crate) fn validate_member_count(total: u32) -> Result<()> {
    if !(MIN_MEMBERS..=MAX_MEMBERS).contains(&total) {
        return Err(ArisanError::ValidationError(format!(
            "a group needs between {MIN_MEMBERS} and {MAX_MEMBERS} members (got {total})"
        )));
    }
    Ok(())
}

/// How many consecutive turns share one gap value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SubPeriod {
    One,
    Four,
    Six,
}

impl SubPeriod {
    pub fn turns(self) -> u32 {
        match self {
            SubPeriod::One => 1,
            SubPeriod::Four => 4,
            SubPeriod::Six => 6,
        }
    }
}

impl TryFrom<u8> for SubPeriod {
    type Error = ArisanError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(SubPeriod::One),
            4 => Ok(SubPeriod::Four),
            6 => Ok(SubPeriod::Six),
            other => Err(ArisanError::ValidationError(format!(
                "sub-period must be 1, 4 or 6 turns (got {other})"
            ))),
        }
    }
}

impl From<SubPeriod> for u8 {
    fn from(value: SubPeriod) -> Self {
        value.turns() as u8
    }
}

/// Parameters of a declining schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecliningSchedule {
    /// Pooled disbursement each round's winner should receive.
    pub target: Money,
    pub sub_period: SubPeriod,
    /// Gap between consecutive turns, one value per sub-period.
    #[serde(default)]
    pub gaps: Vec<Money>,
    /// Flat fee added to every member's contribution.
    #[serde(default)]
    pub admin_fee: Money,
}

/// One row of a computed schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnContribution {
    pub turn: u32,
    /// Cumulative gap deducted from the base for this turn.
    pub reduction: Money,
    /// Contribution before the admin fee, floored at zero.
    pub net: Money,
    /// Amount the member actually pays each round.
    pub contribution: Money,
    #[serde(skip)]
    pub floored: bool,
}

/// Result of comparing a schedule's collected total with its target.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleCheck {
    pub expected: Money,
    pub actual: Money,
    pub difference: Money,
    pub floored_turns: Vec<u32>,
    pub total_members: u32,
}

impl ScheduleCheck {
    /// Balanced when nothing was floored and the drift stays below one unit
    /// per member.
    pub fn is_balanced(&self) -> bool {
        self.floored_turns.is_empty()
            && self.difference.value().abs() < Decimal::from(self.total_members)
    }
}

impl DecliningSchedule {
    pub fn new(
        target: Money,
        sub_period: SubPeriod,
        gaps: Vec<Money>,
        admin_fee: Money,
    ) -> Result<Self> {
        let schedule = Self {
            target,
            sub_period,
            gaps,
            admin_fee,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        Money::positive(self.target.value(), "target disbursement")?;
        Money::non_negative(self.admin_fee.value(), "admin fee")?;
        for gap in &self.gaps {
            Money::non_negative(gap.value(), "gap")?;
        }
        Ok(())
    }

    /// Gap applied when stepping from `turn` to `turn + 1`.
    pub fn gap_after(&self, turn: u32) -> Money {
        if turn == 0 {
            return Money::ZERO;
        }
        let index = ((turn - 1) / self.sub_period.turns()) as usize;
        self.gaps
            .get(index)
            .or_else(|| self.gaps.last())
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// Sum of the gaps of turns `1..turn`.
    pub fn reduction(&self, turn: u32) -> Result<Money> {
        (1..turn).try_fold(Money::ZERO, |sum, j| add(sum, self.gap_after(j)))
    }

    /// Sum of every turn's reduction.
    pub fn total_reduction(&self, total: u32) -> Result<Money> {
        let mut running = Money::ZERO;
        let mut sum = Money::ZERO;
        for turn in 1..=total {
            sum = add(sum, running)?;
            running = add(running, self.gap_after(turn))?;
        }
        Ok(sum)
    }

    /// Turn 1's contribution before the admin fee.
    pub fn base(&self, total: u32) -> Result<Money> {
        validate_member_count(total)?;
        self.validate()?;
        let pool = add(self.target, self.total_reduction(total)?)?;
        Ok(Money::new(pool.value() / Decimal::from(total)).round_to_unit())
    }

    pub fn contribution_for_turn(&self, total: u32, turn: u32) -> Result<Money> {
        let base = self.base(total)?;
        check_turn(total, turn)?;
        let net = sub(base, self.reduction(turn)?)?.floor_at_zero();
        add(net, self.admin_fee)
    }

    pub fn contributions(&self, total: u32) -> Result<Vec<TurnContribution>> {
        let base = self.base(total)?;
        let mut reduction = Money::ZERO;
        let mut rows = Vec::with_capacity(total as usize);
        for turn in 1..=total {
            let raw = sub(base, reduction)?;
            let net = raw.floor_at_zero();
            rows.push(TurnContribution {
                turn,
                reduction,
                net,
                contribution: add(net, self.admin_fee)?,
                floored: raw != net,
            });
            reduction = add(reduction, self.gap_after(turn))?;
        }
        Ok(rows)
    }

    pub fn check(&self, total: u32) -> Result<ScheduleCheck> {
        let rows = self.contributions(total)?;
        let actual = rows.iter().try_fold(Money::ZERO, |sum, row| add(sum, row.net))?;
        Ok(ScheduleCheck {
            expected: self.target,
            actual,
            difference: sub(actual, self.target)?,
            floored_turns: rows.iter().filter(|r| r.floored).map(|r| r.turn).collect(),
            total_members: total,
        })
    }
}

fn overflow() -> ArisanError {
    ArisanError::ValidationError("schedule amounts exceed the supported range".to_string())
}

fn add(a: Money, b: Money) -> Result<Money> {
    a.checked_add(b).ok_or_else(overflow)
}

fn sub(a: Money, b: Money) -> Result<Money> {
    a.checked_sub(b).ok_or_else(overflow)
}

pub(crate) fn check_turn(total: u32, turn: u32) -> Result<()> {
    if turn == 0 || turn > total {
        return Err(ArisanError::ValidationError(format!(
            "turn {turn} is outside 1..={total}"
        )));
    }
    Ok(())
}
