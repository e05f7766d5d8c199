use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum MemberRole {
    #[serde(rename = "ketua", alias = "chair")]
    Chair,
    #[serde(rename = "bendahara", alias = "treasurer")]
    Treasurer,
    #[default]
    #[serde(rename = "anggota", alias = "member")]
    Member,
}

impl MemberRole {
    /// Chairs and treasurers run the group alongside its creator.
    pub fn is_admin(self) -> bool {
        matches!(self, MemberRole::Chair | MemberRole::Treasurer)
    }
}

/// A participant of one group, holding exactly one turn.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Member {
    pub id: String,
    pub group_id: String,
    /// Account of the person behind this seat, if they signed in to join.
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub role: MemberRole,
    /// Round in which this member receives the pooled payout.
    pub turn_order: u32,
    /// Amount this member pays every round.
    pub contribution: Money,
    pub joined_at: DateTime<Utc>,
}

/// Input for a member that does not exist yet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct NewMember {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: MemberRole,
    /// Own contribution in fixed mode; the group nominal applies when absent.
    #[serde(default)]
    pub contribution: Option<Money>,
    #[serde(default, skip_serializing)]
    pub user_id: Option<String>,
}

impl NewMember {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Member {
    pub fn new(
        id: String,
        group_id: String,
        new: NewMember,
        turn_order: u32,
        contribution: Money,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            group_id,
            user_id: new.user_id,
            name: new.name,
            phone: new.phone,
            role: new.role,
            turn_order,
            contribution,
            joined_at,
        }
    }
}
