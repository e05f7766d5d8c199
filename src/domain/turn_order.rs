//! Turn-order manager.
//!
//! Every operation leaves the members' turn numbers as a permutation of
//! `1..=members.len()`.

use super::member::Member;
use crate::error::{ArisanError, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DrawEntry {
    pub member_id: String,
    pub member_name: String,
    pub turn_order: u32,
}

/// Outcome of one random draw ("undian").
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DrawRecord {
    pub id: String,
    pub performed_at: DateTime<Utc>,
    pub performed_by: String,
    pub result: Vec<DrawEntry>,
}

pub fn sort_by_turn(members: &mut [Member]) {
    members.sort_by_key(|m| m.turn_order);
}

/// Numbers members `1..=n` in their current slice order.
pub fn assign_sequential(members: &mut [Member]) {
    for (index, member) in members.iter_mut().enumerate() {
        member.turn_order = index as u32 + 1;
    }
}

/// Renumbers after a removal, keeping relative order.
pub fn compact(members: &mut [Member]) {
    sort_by_turn(members);
    assign_sequential(members);
}

/// Draws a uniformly random turn order.
pub fn shuffle<R: Rng + ?Sized>(members: &mut [Member], rng: &mut R) -> Vec<DrawEntry> {
    members.shuffle(rng);
    assign_sequential(members);
    members
        .iter()
        .map(|m| DrawEntry {
            member_id: m.id.clone(),
            member_name: m.name.clone(),
            turn_order: m.turn_order,
        })
        .collect()
}

/// Swaps a member's turn with the neighbour in `direction`.
///
/// Returns `false` when the member already sits at that end of the order.
pub fn move_member(members: &mut [Member], member_id: &str, direction: Direction) -> Result<bool> {
    sort_by_turn(members);
    let index = members
        .iter()
        .position(|m| m.id == member_id)
        .ok_or_else(|| ArisanError::NotFound(format!("member {member_id}")))?;

    let target = match direction {
        Direction::Up if index > 0 => index - 1,
        Direction::Down if index + 1 < members.len() => index + 1,
        _ => return Ok(false),
    };

    let current = members[index].turn_order;
    members[index].turn_order = members[target].turn_order;
    members[target].turn_order = current;
    sort_by_turn(members);
    Ok(true)
}

pub fn member_at_turn(members: &[Member], turn: u32) -> Option<&Member> {
    members.iter().find(|m| m.turn_order == turn)
}

pub fn verify_permutation(members: &[Member]) -> Result<()> {
    let mut seen = vec![false; members.len()];
    for member in members {
        let turn = member.turn_order as usize;
        if turn == 0 || turn > members.len() || seen[turn - 1] {
            return Err(ArisanError::ValidationError(format!(
                "turn {} of member {} breaks the order 1..={}",
                member.turn_order,
                member.id,
                members.len()
            )));
        }
        seen[turn - 1] = true;
    }
    Ok(())
}
