use crate::domain::group::Group;
use crate::domain::member::Member;
use crate::domain::payment::Payment;
use crate::domain::ports::{GroupStore, MemberStore, PaymentStore, RoundStore, Stores};
use crate::domain::round::Round;
use crate::error::{ArisanError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const CF_GROUPS: &str = "groups";
/// Keyed by `group_id/member_id`.
pub const CF_MEMBERS: &str = "members";
/// Keyed by `group_id/payment_id`.
pub const CF_PAYMENTS: &str = "payments";
/// Keyed by `group_id/round_number`, zero-padded so keys sort by round.
pub const CF_ROUNDS: &str = "rounds";

const COLUMN_FAMILIES: [&str; 4] = [CF_GROUPS, CF_MEMBERS, CF_PAYMENTS, CF_ROUNDS];

/// A persistent document store backed by RocksDB.
///
/// Each collection lives in its own column family and documents are stored as
/// JSON. Child documents are keyed under their group id so a group's members,
/// payments and rounds can be read with one prefix scan.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    /// Opens or creates a database at `path`, creating missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// All four collections backed by this database.
    pub fn stores(&self) -> Stores {
        Stores {
            groups: Box::new(self.clone()),
            members: Box::new(self.clone()),
            payments: Box::new(self.clone()),
            rounds: Box::new(self.clone()),
        }
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("{name} column family not found")))
    }

    fn write_doc<T: Serialize>(&self, cf_name: &str, key: &str, doc: &T) -> Result<()> {
        let value = serde_json::to_vec(doc)
            .map_err(|e| internal(format!("Serialization error: {e}")))?;
        self.db.put_cf(self.cf(cf_name)?, key, value)?;
        Ok(())
    }

    fn read_doc<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        match self.db.get_pinned_cf(self.cf(cf_name)?, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Documents whose key starts with `prefix`, in key order.
    fn scan<T: DeserializeOwned>(&self, cf_name: &str, prefix: &str) -> Result<Vec<T>> {
        let iter = self.db.iterator_cf(
            self.cf(cf_name)?,
            IteratorMode::From(prefix.as_bytes(), Direction::Forward),
        );

        let mut docs = Vec::new();
        for item in iter {
            let (key, value) =
                item.map_err(|e| internal(format!("RocksDB iteration error: {e}")))?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            docs.push(decode(&value)?);
        }
        Ok(docs)
    }

    fn delete_doc(&self, cf_name: &str, key: &str) -> Result<()> {
        self.db.delete_cf(self.cf(cf_name)?, key)?;
        Ok(())
    }

    fn delete_prefix(&self, cf_name: &str, prefix: &str) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let mut batch = WriteBatch::default();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix.as_bytes(), Direction::Forward))
        {
            let (key, _) = item.map_err(|e| internal(format!("RocksDB iteration error: {e}")))?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            batch.delete_cf(cf, key);
        }
        self.db.write(batch)?;
        Ok(())
    }
}

fn internal(message: String) -> ArisanError {
    ArisanError::InternalError(Box::new(std::io::Error::other(message)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        ArisanError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {e}"),
        )))
    })
}

fn group_prefix(group_id: &str) -> String {
    format!("{group_id}/")
}

fn child_key(group_id: &str, child: &str) -> String {
    format!("{group_id}/{child}")
}

fn round_key(group_id: &str, round_number: u32) -> String {
    format!("{group_id}/{round_number:010}")
}

#[async_trait]
impl GroupStore for RocksDbStore {
    async fn create(&self, group: Group) -> Result<()> {
        self.write_doc(CF_GROUPS, &group.id, &group)
    }

    async fn get(&self, group_id: &str) -> Result<Option<Group>> {
        self.read_doc(CF_GROUPS, group_id)
    }

    async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Group>> {
        let groups: Vec<Group> = self.scan(CF_GROUPS, "")?;
        Ok(groups
            .into_iter()
            .find(|g| g.invite_code.eq_ignore_ascii_case(invite_code)))
    }

    async fn list_by_creator(&self, user_id: &str) -> Result<Vec<Group>> {
        let groups: Vec<Group> = self.scan(CF_GROUPS, "")?;
        Ok(groups.into_iter().filter(|g| g.created_by == user_id).collect())
    }

    async fn update(&self, group: Group) -> Result<()> {
        self.write_doc(CF_GROUPS, &group.id, &group)
    }

    async fn delete(&self, group_id: &str) -> Result<()> {
        self.delete_doc(CF_GROUPS, group_id)
    }
}

#[async_trait]
impl MemberStore for RocksDbStore {
    async fn add(&self, member: Member) -> Result<()> {
        self.write_doc(CF_MEMBERS, &child_key(&member.group_id, &member.id), &member)
    }

    async fn get(&self, group_id: &str, member_id: &str) -> Result<Option<Member>> {
        self.read_doc(CF_MEMBERS, &child_key(group_id, member_id))
    }

    async fn list(&self, group_id: &str) -> Result<Vec<Member>> {
        self.scan(CF_MEMBERS, &group_prefix(group_id))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Member>> {
        let members: Vec<Member> = self.scan(CF_MEMBERS, "")?;
        Ok(members
            .into_iter()
            .filter(|m| m.user_id.as_deref() == Some(user_id))
            .collect())
    }

    async fn update(&self, member: Member) -> Result<()> {
        self.write_doc(CF_MEMBERS, &child_key(&member.group_id, &member.id), &member)
    }

    async fn remove(&self, group_id: &str, member_id: &str) -> Result<()> {
        self.delete_doc(CF_MEMBERS, &child_key(group_id, member_id))
    }

    async fn remove_all(&self, group_id: &str) -> Result<()> {
        self.delete_prefix(CF_MEMBERS, &group_prefix(group_id))
    }
}

#[async_trait]
impl PaymentStore for RocksDbStore {
    async fn create(&self, payment: Payment) -> Result<()> {
        self.write_doc(CF_PAYMENTS, &child_key(&payment.group_id, &payment.id), &payment)
    }

    async fn list_by_round(&self, group_id: &str, round: u32) -> Result<Vec<Payment>> {
        let payments: Vec<Payment> = self.scan(CF_PAYMENTS, &group_prefix(group_id))?;
        Ok(payments.into_iter().filter(|p| p.round == round).collect())
    }

    async fn update(&self, payment: Payment) -> Result<()> {
        self.write_doc(CF_PAYMENTS, &child_key(&payment.group_id, &payment.id), &payment)
    }

    async fn delete(&self, group_id: &str, payment_id: &str) -> Result<()> {
        self.delete_doc(CF_PAYMENTS, &child_key(group_id, payment_id))
    }

    async fn delete_by_group(&self, group_id: &str) -> Result<()> {
        self.delete_prefix(CF_PAYMENTS, &group_prefix(group_id))
    }
}

#[async_trait]
impl RoundStore for RocksDbStore {
    async fn create(&self, round: Round) -> Result<()> {
        self.write_doc(
            CF_ROUNDS,
            &round_key(&round.group_id, round.round_number),
            &round,
        )
    }

    async fn get(&self, group_id: &str, round_number: u32) -> Result<Option<Round>> {
        self.read_doc(CF_ROUNDS, &round_key(group_id, round_number))
    }

    async fn list(&self, group_id: &str) -> Result<Vec<Round>> {
        self.scan(CF_ROUNDS, &group_prefix(group_id))
    }

    async fn update(&self, round: Round) -> Result<()> {
        RoundStore::create(self, round).await
    }

    async fn delete_by_group(&self, group_id: &str) -> Result<()> {
        self.delete_prefix(CF_ROUNDS, &group_prefix(group_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::NewMember;
    use crate::domain::money::Money;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn round(group: &str, number: u32) -> Round {
        Round {
            id: format!("{group}-{number}"),
            group_id: group.to_string(),
            round_number: number,
            winner_id: "m1".to_string(),
            winner_name: "Siti".to_string(),
            due_date: Utc::now(),
            completed_at: None,
            total_collected: Money::ZERO,
        }
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).expect("Failed to open RocksDB");
        for name in COLUMN_FAMILIES {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_rocksdb_rounds_sort_numerically() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();
        for number in [10, 2, 1] {
            RoundStore::create(&store, round("g1", number)).await.unwrap();
        }
        RoundStore::create(&store, round("g10", 1)).await.unwrap();

        let numbers: Vec<u32> = RoundStore::list(&store, "g1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.round_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 10]);

        RoundStore::delete_by_group(&store, "g1").await.unwrap();
        assert!(RoundStore::list(&store, "g1").await.unwrap().is_empty());
        assert!(RoundStore::get(&store, "g10", 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_member_store() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        let mut new = NewMember::named("Siti");
        new.user_id = Some("u1".to_string());
        let member = Member::new(
            "m1".to_string(),
            "g1".to_string(),
            new,
            1,
            Money::new(dec!(100000)),
            Utc::now(),
        );
        MemberStore::add(&store, member.clone()).await.unwrap();

        assert_eq!(
            MemberStore::get(&store, "g1", "m1").await.unwrap(),
            Some(member.clone())
        );
        assert_eq!(MemberStore::list(&store, "g1").await.unwrap(), vec![member.clone()]);
        assert_eq!(store.find_by_user("u1").await.unwrap(), vec![member]);

        MemberStore::remove(&store, "g1", "m1").await.unwrap();
        assert!(MemberStore::list(&store, "g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rocksdb_reopen_keeps_payments() {
        let dir = tempdir().unwrap();
        let payment = Payment::new(
            "p1".to_string(),
            "g1".to_string(),
            "m1".to_string(),
            1,
            Money::new(dec!(100000)),
        );
        {
            let store = RocksDbStore::open(dir.path()).unwrap();
            PaymentStore::create(&store, payment.clone()).await.unwrap();
        }

        let store = RocksDbStore::open(dir.path()).unwrap();
        assert_eq!(store.list_by_round("g1", 1).await.unwrap(), vec![payment]);
        assert!(store.list_by_round("g1", 2).await.unwrap().is_empty());

        PaymentStore::delete_by_group(&store, "g1").await.unwrap();
        assert!(store.list_by_round("g1", 1).await.unwrap().is_empty());
    }
}
