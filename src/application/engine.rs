use crate::domain::group::{
    ContributionMode, Group, GroupSettings, GroupStatus, NewGroup, NewPaymentAccount,
    PaymentAccount, generate_invite_code,
};
use crate::domain::member::{Member, MemberRole, NewMember};
use crate::domain::money::Money;
use crate::domain::payment::{Payment, PaymentReport};
use crate::domain::ports::{ClockBox, Identity, IdentityProviderBox, Stores};
use crate::domain::round::Round;
use crate::domain::turn_order::{self, Direction, DrawRecord};
use crate::error::{ArisanError, Result};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, warn};

const ID_LEN: usize = 20;
const INVITE_CODE_ATTEMPTS: usize = 32;

/// What happened when a round was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundAdvance {
    /// The next round is open.
    Started(Round),
    /// Every member has had their turn.
    Completed,
}

/// Entry point for every arisan use case.
///
/// `ArisanService` owns the store ports plus the identity provider and clock.
/// Each operation reads the documents it needs, applies the domain rules and
/// writes the changed documents back; it keeps no state of its own besides
/// the random source used for ids, invite codes and draws.
pub struct ArisanService {
    stores: Stores,
    identity: IdentityProviderBox,
    clock: ClockBox,
    rng: Mutex<StdRng>,
}

impl ArisanService {
    /// Creates a new `ArisanService`.
    ///
    /// # Arguments
    ///
    /// * `stores` - The document-store collections.
    /// * `identity` - Reports who is signed in.
    /// * `clock` - Wall-clock time for due dates and overdue checks.
    pub fn new(stores: Stores, identity: IdentityProviderBox, clock: ClockBox) -> Self {
        Self {
            stores,
            identity,
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Makes ids, invite codes and draws reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    // ---- groups -------------------------------------------------------------

    /// Creates a group, seats the listed members in order and opens round 1.
    ///
    /// The first listed member is linked to the signed-in creator as chair
    /// unless the creator is listed explicitly. An empty list seats the
    /// creator alone.
    pub async fn create_group(&self, new: NewGroup) -> Result<Group> {
        new.validate()?;
        let user = self.require_user().await?;
        let now = self.clock.now();
        let due_date = new.period.next_due_date(now);
        let invite_code = self.unique_invite_code().await?;

        let group = Group {
            id: self.next_id(),
            name: new.name.trim().to_string(),
            nominal: new.nominal,
            period: new.period,
            total_members: new.total_members,
            current_round: 1,
            status: GroupStatus::Active,
            turn_method: new.turn_method,
            mode: new.mode,
            invite_code,
            created_by: user.user_id.clone(),
            created_at: now,
            due_date: Some(due_date),
            disbursement_day: new.disbursement_day,
            payment_deadline_day: new.payment_deadline_day,
            settings: new.settings,
            payment_accounts: Vec::new(),
            draw_history: Vec::new(),
        };

        if let ContributionMode::Declining(schedule) = &group.mode {
            let check = schedule.check(group.total_members)?;
            if !check.is_balanced() {
                warn!(
                    group = %group.name,
                    expected = %check.expected,
                    actual = %check.actual,
                    floored = ?check.floored_turns,
                    "declining schedule does not add up to the target"
                );
            }
        }

        let mut listed_members = new.members;
        if listed_members.is_empty() {
            listed_members.push(NewMember::named(user.email.clone()));
        }
        let creator_listed = listed_members
            .iter()
            .any(|m| m.user_id.as_deref() == Some(user.user_id.as_str()));
        let mut members = Vec::with_capacity(listed_members.len());
        for (index, mut listed) in listed_members.into_iter().enumerate() {
            if index == 0 && !creator_listed && listed.user_id.is_none() {
                listed.user_id = Some(user.user_id.clone());
                listed.role = MemberRole::Chair;
            }
            let turn = index as u32 + 1;
            let contribution = group.contribution_for_member(turn, listed.contribution)?;
            members.push(Member::new(
                self.next_id(),
                group.id.clone(),
                listed,
                turn,
                contribution,
                now,
            ));
        }
        turn_order::verify_permutation(&members)?;

        self.stores.groups.create(group.clone()).await?;
        for member in &members {
            self.stores.members.add(member.clone()).await?;
        }
        self.open_round(&group, &members, 1, due_date).await?;

        info!(
            group_id = %group.id,
            name = %group.name,
            members = members.len(),
            total = group.total_members,
            "group created"
        );
        Ok(group)
    }

    pub async fn group(&self, group_id: &str) -> Result<Group> {
        self.require_group(group_id).await
    }

    pub async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>> {
        self.stores
            .groups
            .find_by_invite_code(invite_code.trim())
            .await
    }

    /// Groups the signed-in user created or belongs to.
    pub async fn user_groups(&self) -> Result<Vec<Group>> {
        let user = self.require_user().await?;
        let mut groups = self.stores.groups.list_by_creator(&user.user_id).await?;
        for membership in self.stores.members.find_by_user(&user.user_id).await? {
            if groups.iter().any(|g| g.id == membership.group_id) {
                continue;
            }
            if let Some(group) = self.stores.groups.get(&membership.group_id).await? {
                groups.push(group);
            }
        }
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    pub async fn update_settings(
        &self,
        group_id: &str,
        settings: GroupSettings,
    ) -> Result<Group> {
        settings.validate()?;
        let mut group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;
        group.settings = settings;
        self.stores.groups.update(group.clone()).await?;
        debug!(group_id, "settings updated");
        Ok(group)
    }

    /// Registers a bank or e-wallet account members can pay into.
    pub async fn add_payment_account(
        &self,
        group_id: &str,
        account: NewPaymentAccount,
    ) -> Result<PaymentAccount> {
        account.validate()?;
        let mut group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;
        let account = PaymentAccount::new(self.next_id(), account);
        group.payment_accounts.push(account.clone());
        self.stores.groups.update(group).await?;
        debug!(group_id, account_id = %account.id, "payment account added");
        Ok(account)
    }

    /// Drops a payment account. Payments that already name it keep the id.
    pub async fn remove_payment_account(&self, group_id: &str, account_id: &str) -> Result<()> {
        let mut group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;
        let before = group.payment_accounts.len();
        group.payment_accounts.retain(|account| account.id != account_id);
        if group.payment_accounts.len() == before {
            return Err(ArisanError::NotFound(format!("payment account {account_id}")));
        }
        self.stores.groups.update(group).await?;
        debug!(group_id, account_id, "payment account removed");
        Ok(())
    }

    /// Deletes a group with its members, rounds and payments.
    pub async fn delete_group(&self, group_id: &str) -> Result<()> {
        let group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;
        self.stores.payments.delete_by_group(group_id).await?;
        self.stores.rounds.delete_by_group(group_id).await?;
        self.stores.members.remove_all(group_id).await?;
        self.stores.groups.delete(group_id).await?;
        info!(group_id, "group deleted");
        Ok(())
    }

    // ---- members ------------------------------------------------------------

    /// Members of a group in turn order.
    pub async fn members(&self, group_id: &str) -> Result<Vec<Member>> {
        let mut members = self.stores.members.list(group_id).await?;
        turn_order::sort_by_turn(&mut members);
        Ok(members)
    }

    pub async fn member(&self, group_id: &str, member_id: &str) -> Result<Member> {
        self.stores
            .members
            .get(group_id, member_id)
            .await?
            .ok_or_else(|| ArisanError::NotFound(format!("member {member_id}")))
    }

    /// Joins the signed-in user to the group behind `invite_code`.
    ///
    /// Joining twice returns the existing seat.
    pub async fn join_group(&self, invite_code: &str, request: NewMember) -> Result<Member> {
        let user = self.require_user().await?;
        let group = self
            .find_by_invite_code(invite_code)
            .await?
            .ok_or_else(|| ArisanError::NotFound(format!("invite code {invite_code}")))?;
        if group.is_completed() {
            return Err(ArisanError::GroupCompleted);
        }

        let mut members = self.members(&group.id).await?;
        if let Some(existing) = members
            .iter()
            .find(|m| m.user_id.as_deref() == Some(user.user_id.as_str()))
        {
            debug!(group_id = %group.id, member_id = %existing.id, "already a member");
            return Ok(existing.clone());
        }
        if members.len() >= group.total_members as usize {
            return Err(ArisanError::GroupFull(group.total_members));
        }

        let turn = members.len() as u32 + 1;
        let contribution = group.contribution_for_member(turn, request.contribution)?;
        let name = if request.name.trim().is_empty() {
            user.email.clone()
        } else {
            request.name
        };
        let seat = NewMember {
            name,
            phone: request.phone,
            role: MemberRole::Member,
            contribution: request.contribution,
            user_id: Some(user.user_id.clone()),
        };
        let member = Member::new(
            self.next_id(),
            group.id.clone(),
            seat,
            turn,
            contribution,
            self.clock.now(),
        );
        self.stores.members.add(member.clone()).await?;
        self.stores
            .payments
            .create(Payment::new(
                self.next_id(),
                group.id.clone(),
                member.id.clone(),
                group.current_round,
                contribution,
            ))
            .await?;

        members.push(member.clone());
        self.resync_current_round(&group, &members).await?;
        info!(group_id = %group.id, member_id = %member.id, turn, "member joined");
        Ok(member)
    }

    /// Removes a member, drops their unpaid current-round payment and closes
    /// the gap in the turn order.
    ///
    /// In a running group, members whose turn is at or before the current
    /// round cannot be removed.
    pub async fn remove_member(&self, group_id: &str, member_id: &str) -> Result<()> {
        let group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;
        let member = self.member(group_id, member_id).await?;
        if !group.is_completed() && member.turn_order <= group.current_round {
            return Err(ArisanError::ValidationError(format!(
                "{} holds turn {} and has already been drawn in round {}",
                member.name, member.turn_order, group.current_round
            )));
        }

        self.stores.members.remove(group_id, member_id).await?;
        for payment in self
            .stores
            .payments
            .list_by_round(group_id, group.current_round)
            .await?
        {
            if payment.member_id == member_id && !payment.is_paid() {
                self.stores.payments.delete(group_id, &payment.id).await?;
            }
        }

        let original: Vec<Member> = members.into_iter().filter(|m| m.id != member_id).collect();
        let mut remaining = original.clone();
        turn_order::compact(&mut remaining);
        self.save_order(&group, &original, &mut remaining).await?;
        info!(group_id, member_id, remaining = remaining.len(), "member removed");
        Ok(())
    }

    pub async fn update_member_role(
        &self,
        group_id: &str,
        member_id: &str,
        role: MemberRole,
    ) -> Result<Member> {
        let group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;
        let mut member = self.member(group_id, member_id).await?;
        member.role = role;
        self.stores.members.update(member.clone()).await?;
        debug!(group_id, member_id, ?role, "role updated");
        Ok(member)
    }

    // ---- turn order ---------------------------------------------------------

    /// Moves a member one position up or down. Returns `false` when the member
    /// already sits at that end of the order.
    pub async fn move_member(
        &self,
        group_id: &str,
        member_id: &str,
        direction: Direction,
    ) -> Result<bool> {
        let group = self.require_group(group_id).await?;
        let original = self.members(group_id).await?;
        self.require_admin(&group, &original).await?;

        let mut members = original.clone();
        if !turn_order::move_member(&mut members, member_id, direction)? {
            return Ok(false);
        }
        self.save_order(&group, &original, &mut members).await?;
        debug!(group_id, member_id, ?direction, "member moved");
        Ok(true)
    }

    /// Shuffles the turn order ("undian") and records the draw on the group.
    pub async fn draw_turn_order(&self, group_id: &str) -> Result<DrawRecord> {
        let mut group = self.require_group(group_id).await?;
        if group.is_completed() {
            return Err(ArisanError::GroupCompleted);
        }
        let original = self.members(group_id).await?;
        let user = self.require_admin(&group, &original).await?;

        let mut members = original.clone();
        let result = self.with_rng(|rng| turn_order::shuffle(&mut members, rng));
        self.save_order(&group, &original, &mut members).await?;

        let record = DrawRecord {
            id: self.next_id(),
            performed_at: self.clock.now(),
            performed_by: user.user_id,
            result,
        };
        group.draw_history.push(record.clone());
        self.stores.groups.update(group).await?;
        info!(group_id, draw_id = %record.id, "turn order drawn");
        Ok(record)
    }

    /// Amount the member holding `turn` pays each round.
    pub async fn contribution_for_turn(&self, group_id: &str, turn: u32) -> Result<Money> {
        self.require_group(group_id).await?.contribution_for_turn(turn)
    }

    // ---- rounds -------------------------------------------------------------

    pub async fn current_round(&self, group_id: &str) -> Result<Round> {
        let group = self.require_group(group_id).await?;
        self.require_round(group_id, group.current_round).await
    }

    /// Rounds of a group, newest first.
    pub async fn round_history(&self, group_id: &str) -> Result<Vec<Round>> {
        let mut rounds = self.stores.rounds.list(group_id).await?;
        rounds.reverse();
        Ok(rounds)
    }

    /// Closes the current round and opens the next one.
    ///
    /// Without `force` every payment of the current round must be paid. Closing
    /// the last round completes the group instead of opening a new one.
    pub async fn advance_round(&self, group_id: &str, force: bool) -> Result<RoundAdvance> {
        let mut group = self.require_group(group_id).await?;
        if group.is_completed() {
            return Err(ArisanError::GroupCompleted);
        }
        let members = self.members(group_id).await?;
        self.require_admin(&group, &members).await?;

        let unresolved = self
            .stores
            .payments
            .list_by_round(group_id, group.current_round)
            .await?
            .iter()
            .filter(|p| !p.is_paid())
            .count();
        if unresolved > 0 {
            if !force {
                return Err(ArisanError::RoundNotSettled {
                    round: group.current_round,
                    unresolved,
                });
            }
            warn!(
                group_id,
                round = group.current_round,
                unresolved,
                "advancing with unpaid payments"
            );
        }

        let next = group.current_round + 1;
        if next <= group.total_members && turn_order::member_at_turn(&members, next).is_none() {
            return Err(ArisanError::NotFound(format!("member holding turn {next}")));
        }

        let now = self.clock.now();
        if let Some(mut closing) = self.stores.rounds.get(group_id, group.current_round).await? {
            closing.completed_at = Some(now);
            self.stores.rounds.update(closing).await?;
        }

        if next > group.total_members {
            group.status = GroupStatus::Completed;
            group.due_date = None;
            self.stores.groups.update(group).await?;
            info!(group_id, "all turns paid out, group completed");
            return Ok(RoundAdvance::Completed);
        }

        let due_date = group.period.next_due_date(now);
        let round = self.open_round(&group, &members, next, due_date).await?;
        group.current_round = next;
        group.due_date = Some(due_date);
        self.stores.groups.update(group).await?;
        info!(group_id, round = next, winner = %round.winner_name, "round started");
        Ok(RoundAdvance::Started(round))
    }

    // ---- payments -----------------------------------------------------------

    /// Member (or an admin on their behalf) claims the payment was made,
    /// optionally into one of the group's active payment accounts.
    pub async fn submit_payment(
        &self,
        group_id: &str,
        member_id: &str,
        round: u32,
        account_id: Option<&str>,
    ) -> Result<Payment> {
        let user = self.require_user().await?;
        let group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        let member = members
            .iter()
            .find(|m| m.id == member_id)
            .ok_or_else(|| ArisanError::NotFound(format!("member {member_id}")))?;
        if member.user_id.as_deref() != Some(user.user_id.as_str())
            && !group.is_admin(&user.user_id, &members)
        {
            return Err(ArisanError::Unauthorized(format!(
                "{} cannot submit for member {member_id}",
                user.email
            )));
        }

        if let Some(account_id) = account_id
            && group.active_account(account_id).is_none()
        {
            return Err(ArisanError::NotFound(format!(
                "active payment account {account_id}"
            )));
        }

        let mut payment = self.require_payment(group_id, member_id, round).await?;
        payment.submit(self.clock.now(), account_id.map(str::to_string))?;
        self.stores.payments.update(payment.clone()).await?;
        debug!(group_id, member_id, round, "payment submitted");
        Ok(payment)
    }

    /// Admin accepts a submitted payment.
    pub async fn approve_payment(
        &self,
        group_id: &str,
        member_id: &str,
        round: u32,
    ) -> Result<Payment> {
        let (user, mut payment) = self.admin_payment(group_id, member_id, round).await?;
        payment.approve(&user.user_id, self.clock.now())?;
        self.settle(payment).await
    }

    /// Admin records a payment made outside the app.
    pub async fn confirm_payment(
        &self,
        group_id: &str,
        member_id: &str,
        round: u32,
    ) -> Result<Payment> {
        let (user, mut payment) = self.admin_payment(group_id, member_id, round).await?;
        payment.confirm(&user.user_id, self.clock.now())?;
        self.settle(payment).await
    }

    pub async fn reject_payment(
        &self,
        group_id: &str,
        member_id: &str,
        round: u32,
        note: Option<String>,
    ) -> Result<Payment> {
        let (user, mut payment) = self.admin_payment(group_id, member_id, round).await?;
        payment.reject(&user.user_id, self.clock.now(), note)?;
        self.stores.payments.update(payment.clone()).await?;
        debug!(group_id, member_id, round, "payment rejected");
        Ok(payment)
    }

    /// Payments of a round in turn order, with overdue state and late penalty
    /// evaluated against the clock.
    pub async fn payments_for_round(
        &self,
        group_id: &str,
        round: u32,
    ) -> Result<Vec<PaymentReport>> {
        let group = self.require_group(group_id).await?;
        let due_date = self.require_round(group_id, round).await?.due_date;
        let turns: HashMap<String, u32> = self
            .members(group_id)
            .await?
            .into_iter()
            .map(|m| (m.id, m.turn_order))
            .collect();
        let now = self.clock.now();

        let mut payments = self.stores.payments.list_by_round(group_id, round).await?;
        payments.sort_by_key(|p| turns.get(&p.member_id).copied().unwrap_or(u32::MAX));
        Ok(payments
            .into_iter()
            .map(|payment| PaymentReport {
                state: payment.state_at(due_date, now),
                penalty: payment.penalty_at(due_date, now, &group.settings.penalty),
                payment,
            })
            .collect())
    }

    // ---- helpers ------------------------------------------------------------

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    /// Draws invite codes until one is not taken by another group.
    async fn unique_invite_code(&self) -> Result<String> {
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = self.with_rng(|rng| generate_invite_code(rng));
            if self.stores.groups.find_by_invite_code(&code).await?.is_none() {
                return Ok(code);
            }
            debug!(code = %code, "invite code taken, drawing another");
        }
        Err(ArisanError::InternalError(
            format!("no free invite code after {INVITE_CODE_ATTEMPTS} attempts").into(),
        ))
    }

    fn next_id(&self) -> String {
        self.with_rng(|rng| {
            rng.sample_iter(&Alphanumeric)
                .take(ID_LEN)
                .map(char::from)
                .collect()
        })
    }

    async fn require_user(&self) -> Result<Identity> {
        self.identity
            .current_user()
            .await?
            .ok_or_else(|| ArisanError::Unauthorized("sign in required".to_string()))
    }

    async fn require_admin(&self, group: &Group, members: &[Member]) -> Result<Identity> {
        let user = self.require_user().await?;
        if group.is_admin(&user.user_id, members) {
            Ok(user)
        } else {
            Err(ArisanError::Unauthorized(format!(
                "{} does not administer group {}",
                user.email, group.id
            )))
        }
    }

    async fn require_group(&self, group_id: &str) -> Result<Group> {
        self.stores
            .groups
            .get(group_id)
            .await?
            .ok_or_else(|| ArisanError::NotFound(format!("group {group_id}")))
    }

    async fn require_round(&self, group_id: &str, round: u32) -> Result<Round> {
        self.stores
            .rounds
            .get(group_id, round)
            .await?
            .ok_or_else(|| ArisanError::NotFound(format!("round {round} of group {group_id}")))
    }

    async fn require_payment(
        &self,
        group_id: &str,
        member_id: &str,
        round: u32,
    ) -> Result<Payment> {
        self.stores
            .payments
            .list_by_round(group_id, round)
            .await?
            .into_iter()
            .find(|p| p.member_id == member_id)
            .ok_or_else(|| {
                ArisanError::NotFound(format!("payment of member {member_id} in round {round}"))
            })
    }

    async fn admin_payment(
        &self,
        group_id: &str,
        member_id: &str,
        round: u32,
    ) -> Result<(Identity, Payment)> {
        let group = self.require_group(group_id).await?;
        let members = self.members(group_id).await?;
        let user = self.require_admin(&group, &members).await?;
        let payment = self.require_payment(group_id, member_id, round).await?;
        Ok((user, payment))
    }

    /// Stores a payment that just became paid and credits its round.
    async fn settle(&self, payment: Payment) -> Result<Payment> {
        let mut round = self.require_round(&payment.group_id, payment.round).await?;
        round.record_payment(payment.amount);
        self.stores.payments.update(payment.clone()).await?;
        self.stores.rounds.update(round).await?;
        info!(
            group_id = %payment.group_id,
            member_id = %payment.member_id,
            round = payment.round,
            amount = %payment.amount,
            "payment settled"
        );
        Ok(payment)
    }

    /// Creates round `number` with fresh pending payments for every member.
    async fn open_round(
        &self,
        group: &Group,
        members: &[Member],
        number: u32,
        due_date: chrono::DateTime<chrono::Utc>,
    ) -> Result<Round> {
        let winner = turn_order::member_at_turn(members, number)
            .ok_or_else(|| ArisanError::NotFound(format!("member holding turn {number}")))?;
        let round = Round {
            id: self.next_id(),
            group_id: group.id.clone(),
            round_number: number,
            winner_id: winner.id.clone(),
            winner_name: winner.name.clone(),
            due_date,
            completed_at: None,
            total_collected: Money::ZERO,
        };
        self.stores.rounds.create(round.clone()).await?;
        for member in members {
            self.stores
                .payments
                .create(Payment::new(
                    self.next_id(),
                    group.id.clone(),
                    member.id.clone(),
                    number,
                    member.contribution,
                ))
                .await?;
        }
        Ok(round)
    }

    /// Persists a changed turn order. Declining groups re-derive each member's
    /// contribution from their new turn.
    async fn save_order(
        &self,
        group: &Group,
        original: &[Member],
        members: &mut [Member],
    ) -> Result<()> {
        turn_order::verify_permutation(members)?;
        for member in members.iter_mut() {
            if group.is_declining() {
                member.contribution = group.contribution_for_turn(member.turn_order)?;
            }
            let changed = original
                .iter()
                .find(|o| o.id == member.id)
                .is_none_or(|o| o != &*member);
            if changed {
                self.stores.members.update(member.clone()).await?;
            }
        }
        self.resync_current_round(group, members).await
    }

    /// Points the open round at the member now holding its turn and refreshes
    /// the amounts of payments nobody has acted on yet.
    async fn resync_current_round(&self, group: &Group, members: &[Member]) -> Result<()> {
        if group.is_completed() {
            return Ok(());
        }
        if let Some(mut round) = self.stores.rounds.get(&group.id, group.current_round).await? {
            match turn_order::member_at_turn(members, group.current_round) {
                Some(winner) if winner.id != round.winner_id => {
                    round.winner_id = winner.id.clone();
                    round.winner_name = winner.name.clone();
                    self.stores.rounds.update(round).await?;
                }
                Some(_) => {}
                None => {
                    return Err(ArisanError::NotFound(format!(
                        "member holding turn {} of group {}",
                        group.current_round, group.id
                    )));
                }
            }
        }

        for mut payment in self
            .stores
            .payments
            .list_by_round(&group.id, group.current_round)
            .await?
        {
            if !payment.is_unresolved() {
                continue;
            }
            if let Some(member) = members.iter().find(|m| m.id == payment.member_id)
                && member.contribution != payment.amount
            {
                payment.amount = member.contribution;
                self.stores.payments.update(payment).await?;
            }
        }
        Ok(())
    }
}
