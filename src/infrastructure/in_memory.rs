use crate::domain::group::Group;
use crate::domain::member::Member;
use crate::domain::payment::Payment;
use crate::domain::ports::{GroupStore, MemberStore, PaymentStore, RoundStore, Stores};
use crate::domain::round::Round;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for groups.
///
/// Uses `Arc<RwLock<HashMap<String, Group>>>` to allow shared concurrent access.
#[derive(Default, Clone)]
pub struct InMemoryGroupStore {
    groups: Arc<RwLock<HashMap<String, Group>>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn create(&self, group: Group) -> Result<()> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get(&self, group_id: &str) -> Result<Option<Group>> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>> {
        let groups = self.groups.read().await;
        Ok(groups
            .values()
            .find(|g| g.invite_code.eq_ignore_ascii_case(invite_code))
            .cloned())
    }

    async fn list_by_creator(&self, user_id: &str) -> Result<Vec<Group>> {
        let groups = self.groups.read().await;
        Ok(groups
            .values()
            .filter(|g| g.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, group: Group) -> Result<()> {
        self.create(group).await
    }

    async fn delete(&self, group_id: &str) -> Result<()> {
        let mut groups = self.groups.write().await;
        groups.remove(group_id);
        Ok(())
    }
}

/// Members keyed by `(group_id, member_id)`.
#[derive(Default, Clone)]
pub struct InMemoryMemberStore {
    members: Arc<RwLock<HashMap<(String, String), Member>>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn add(&self, member: Member) -> Result<()> {
        let mut members = self.members.write().await;
        members.insert((member.group_id.clone(), member.id.clone()), member);
        Ok(())
    }

    async fn get(&self, group_id: &str, member_id: &str) -> Result<Option<Member>> {
        let members = self.members.read().await;
        Ok(members
            .get(&(group_id.to_string(), member_id.to_string()))
            .cloned())
    }

    async fn list(&self, group_id: &str) -> Result<Vec<Member>> {
        let members = self.members.read().await;
        Ok(members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Member>> {
        let members = self.members.read().await;
        Ok(members
            .values()
            .filter(|m| m.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn update(&self, member: Member) -> Result<()> {
        self.add(member).await
    }

    async fn remove(&self, group_id: &str, member_id: &str) -> Result<()> {
        let mut members = self.members.write().await;
        members.remove(&(group_id.to_string(), member_id.to_string()));
        Ok(())
    }

    async fn remove_all(&self, group_id: &str) -> Result<()> {
        let mut members = self.members.write().await;
        members.retain(|(group, _), _| group != group_id);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn list_by_round(&self, group_id: &str, round: u32) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| p.group_id == group_id && p.round == round)
            .cloned()
            .collect())
    }

    async fn update(&self, payment: Payment) -> Result<()> {
        self.create(payment).await
    }

    async fn delete(&self, _group_id: &str, payment_id: &str) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.remove(payment_id);
        Ok(())
    }

    async fn delete_by_group(&self, group_id: &str) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.retain(|_, p| p.group_id != group_id);
        Ok(())
    }
}

/// Rounds keyed by `(group_id, round_number)`.
#[derive(Default, Clone)]
pub struct InMemoryRoundStore {
    rounds: Arc<RwLock<HashMap<(String, u32), Round>>>,
}

impl InMemoryRoundStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoundStore for InMemoryRoundStore {
    async fn create(&self, round: Round) -> Result<()> {
        let mut rounds = self.rounds.write().await;
        rounds.insert((round.group_id.clone(), round.round_number), round);
        Ok(())
    }

    async fn get(&self, group_id: &str, round_number: u32) -> Result<Option<Round>> {
        let rounds = self.rounds.read().await;
        Ok(rounds.get(&(group_id.to_string(), round_number)).cloned())
    }

    async fn list(&self, group_id: &str) -> Result<Vec<Round>> {
        let rounds = self.rounds.read().await;
        let mut list: Vec<Round> = rounds
            .values()
            .filter(|r| r.group_id == group_id)
            .cloned()
            .collect();
        list.sort_by_key(|r| r.round_number);
        Ok(list)
    }

    async fn update(&self, round: Round) -> Result<()> {
        self.create(round).await
    }

    async fn delete_by_group(&self, group_id: &str) -> Result<()> {
        let mut rounds = self.rounds.write().await;
        rounds.retain(|(group, _), _| group != group_id);
        Ok(())
    }
}

/// Fresh in-memory collections for every record type.
pub fn in_memory_stores() -> Stores {
    Stores {
        groups: Box::new(InMemoryGroupStore::new()),
        members: Box::new(InMemoryMemberStore::new()),
        payments: Box::new(InMemoryPaymentStore::new()),
        rounds: Box::new(InMemoryRoundStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::NewMember;
    use crate::domain::money::Money;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn member(group: &str, id: &str, user: Option<&str>) -> Member {
        let mut new = NewMember::named(id);
        new.user_id = user.map(str::to_string);
        Member::new(
            id.to_string(),
            group.to_string(),
            new,
            1,
            Money::new(dec!(100000)),
            Utc::now(),
        )
    }

    fn round(group: &str, number: u32) -> Round {
        Round {
            id: format!("{group}-{number}"),
            group_id: group.to_string(),
            round_number: number,
            winner_id: "m1".to_string(),
            winner_name: "m1".to_string(),
            due_date: Utc::now(),
            completed_at: None,
            total_collected: Money::ZERO,
        }
    }

    #[tokio::test]
    async fn test_in_memory_member_store() {
        let store = InMemoryMemberStore::new();
        store.add(member("g1", "m1", Some("u1"))).await.unwrap();
        store.add(member("g1", "m2", None)).await.unwrap();
        store.add(member("g2", "m1", Some("u1"))).await.unwrap();

        assert_eq!(store.list("g1").await.unwrap().len(), 2);
        assert_eq!(store.find_by_user("u1").await.unwrap().len(), 2);
        assert!(store.get("g2", "m2").await.unwrap().is_none());

        store.remove("g1", "m2").await.unwrap();
        assert_eq!(store.list("g1").await.unwrap().len(), 1);

        store.remove_all("g1").await.unwrap();
        assert!(store.list("g1").await.unwrap().is_empty());
        assert_eq!(store.list("g2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_round_store_orders_rounds() {
        let store = InMemoryRoundStore::new();
        for number in [3, 1, 2] {
            store.create(round("g1", number)).await.unwrap();
        }
        store.create(round("g2", 1)).await.unwrap();

        let numbers: Vec<u32> = store
            .list("g1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.round_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        store.delete_by_group("g1").await.unwrap();
        assert!(store.get("g1", 1).await.unwrap().is_none());
        assert!(store.get("g2", 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_in_memory_payment_store() {
        let store = InMemoryPaymentStore::new();
        let payment = Payment::new(
            "p1".to_string(),
            "g1".to_string(),
            "m1".to_string(),
            1,
            Money::new(dec!(100000)),
        );
        store.create(payment.clone()).await.unwrap();

        assert_eq!(store.list_by_round("g1", 1).await.unwrap(), vec![payment]);
        assert!(store.list_by_round("g1", 2).await.unwrap().is_empty());

        store.delete("g1", "p1").await.unwrap();
        assert!(store.list_by_round("g1", 1).await.unwrap().is_empty());
    }
}
