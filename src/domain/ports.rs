use super::group::Group;
use super::member::Member;
use super::payment::Payment;
use super::round::Round;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create(&self, group: Group) -> Result<()>;
    async fn get(&self, group_id: &str) -> Result<Option<Group>>;
    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>>;
    async fn list_by_creator(&self, user_id: &str) -> Result<Vec<Group>>;
    async fn update(&self, group: Group) -> Result<()>;
    async fn delete(&self, group_id: &str) -> Result<()>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn add(&self, member: Member) -> Result<()>;
    async fn get(&self, group_id: &str, member_id: &str) -> Result<Option<Member>>;
    async fn list(&self, group_id: &str) -> Result<Vec<Member>>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Member>>;
    async fn update(&self, member: Member) -> Result<()>;
    async fn remove(&self, group_id: &str, member_id: &str) -> Result<()>;
    async fn remove_all(&self, group_id: &str) -> Result<()>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<()>;
    async fn list_by_round(&self, group_id: &str, round: u32) -> Result<Vec<Payment>>;
    async fn update(&self, payment: Payment) -> Result<()>;
    async fn delete(&self, group_id: &str, payment_id: &str) -> Result<()>;
    async fn delete_by_group(&self, group_id: &str) -> Result<()>;
}

#[async_trait]
pub trait RoundStore: Send + Sync {
    async fn create(&self, round: Round) -> Result<()>;
    async fn get(&self, group_id: &str, round_number: u32) -> Result<Option<Round>>;
    /// Rounds of a group in ascending round number.
    async fn list(&self, group_id: &str) -> Result<Vec<Round>>;
    async fn update(&self, round: Round) -> Result<()>;
    async fn delete_by_group(&self, group_id: &str) -> Result<()>;
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<Identity>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type GroupStoreBox = Box<dyn GroupStore>;
pub type MemberStoreBox = Box<dyn MemberStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type RoundStoreBox = Box<dyn RoundStore>;
pub type IdentityProviderBox = Box<dyn IdentityProvider>;
pub type ClockBox = Box<dyn Clock>;

/// The document-store collections the service works against.
pub struct Stores {
    pub groups: GroupStoreBox,
    pub members: MemberStoreBox,
    pub payments: PaymentStoreBox,
    pub rounds: RoundStoreBox,
}
