#![cfg(feature = "storage-rocksdb")]

use arisan::application::engine::ArisanService;
use arisan::domain::group::{ContributionMode, GroupSettings, NewGroup, Period, TurnMethod};
use arisan::domain::member::NewMember;
use arisan::domain::money::Money;
use arisan::domain::payment::PaymentStatus;
use arisan::infrastructure::identity::{FixedClock, StaticIdentity};
use arisan::infrastructure::rocksdb::RocksDbStore;
use chrono::Utc;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn service(store: &RocksDbStore, clock: &FixedClock) -> ArisanService {
    ArisanService::new(
        store.stores(),
        Box::new(StaticIdentity::signed_in("admin", "admin@example.com")),
        Box::new(clock.clone()),
    )
    .with_seed(3)
}

#[tokio::test]
async fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let clock = FixedClock::at(Utc::now());

    // 1. First session: create the group and settle one payment.
    let (group_id, budi_id) = {
        let store = RocksDbStore::open(&db_path).unwrap();
        let service = service(&store, &clock);
        let group = service
            .create_group(NewGroup {
                name: "Arisan RT 05".to_string(),
                nominal: Money::new(dec!(100000)),
                period: Period::Weekly,
                total_members: 2,
                turn_method: TurnMethod::Manual,
                mode: ContributionMode::Fixed,
                disbursement_day: None,
                payment_deadline_day: None,
                settings: GroupSettings::default(),
                members: vec![NewMember::named("Siti"), NewMember::named("Budi")],
            })
            .await
            .unwrap();
        let budi = service.members(&group.id).await.unwrap()[1].clone();
        service.confirm_payment(&group.id, &budi.id, 1).await.unwrap();
        (group.id, budi.id)
    };

    // 2. Second session on the same path sees everything.
    let store = RocksDbStore::open(&db_path).unwrap();
    let service = service(&store, &clock);

    let group = service.group(&group_id).await.unwrap();
    assert_eq!(group.current_round, 1);
    assert_eq!(service.members(&group_id).await.unwrap().len(), 2);

    let round = service.current_round(&group_id).await.unwrap();
    assert_eq!(round.winner_name, "Siti");
    assert_eq!(round.total_collected, Money::new(dec!(100000)));

    let reports = service.payments_for_round(&group_id, 1).await.unwrap();
    let budi = reports
        .iter()
        .find(|r| r.payment.member_id == budi_id)
        .unwrap();
    assert_eq!(budi.payment.status, PaymentStatus::Paid);

    let found = service
        .find_by_invite_code(&group.invite_code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(found.map(|g| g.id), Some(group_id.clone()));

    service.delete_group(&group_id).await.unwrap();
    assert!(service.members(&group_id).await.unwrap().is_empty());
}
