use arisan::application::engine::ArisanService;
use arisan::domain::group::{ContributionMode, GroupSettings, NewGroup, Period, TurnMethod};
use arisan::domain::member::NewMember;
use arisan::domain::money::Money;
use arisan::domain::ports::{ClockBox, GroupStoreBox, IdentityProviderBox, MemberStoreBox};
use arisan::infrastructure::identity::{StaticIdentity, SystemClock};
use arisan::infrastructure::in_memory::{InMemoryGroupStore, InMemoryMemberStore, in_memory_stores};
use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn assert_send_sync<T: Send + Sync>() {}

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let groups: GroupStoreBox = Box::new(InMemoryGroupStore::new());
    let members: MemberStoreBox = Box::new(InMemoryMemberStore::new());

    let mut new = NewMember::named("Siti");
    new.user_id = Some("u1".to_string());
    let member = arisan::domain::member::Member::new(
        "m1".to_string(),
        "g1".to_string(),
        new,
        1,
        Money::new(dec!(100000)),
        Utc::now(),
    );

    // Verify Send + Sync by spawning tasks
    let group_handle = tokio::spawn(async move { groups.get("missing").await.unwrap() });
    let member_handle = tokio::spawn(async move {
        members.add(member).await.unwrap();
        members.find_by_user("u1").await.unwrap()
    });

    assert!(group_handle.await.unwrap().is_none());
    assert_eq!(member_handle.await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_service_shared_across_tasks() {
    assert_send_sync::<ArisanService>();

    let identity: IdentityProviderBox =
        Box::new(StaticIdentity::signed_in("u1", "siti@example.com"));
    let clock: ClockBox = Box::new(SystemClock);
    let service = Arc::new(ArisanService::new(in_memory_stores(), identity, clock));

    let creator = Arc::clone(&service);
    let group = tokio::spawn(async move {
        creator
            .create_group(NewGroup {
                name: "Arisan Kantor".to_string(),
                nominal: Money::new(dec!(50000)),
                period: Period::Weekly,
                total_members: 2,
                turn_method: TurnMethod::Manual,
                mode: ContributionMode::Fixed,
                disbursement_day: None,
                payment_deadline_day: None,
                settings: GroupSettings::default(),
                members: vec![],
            })
            .await
            .unwrap()
    })
    .await
    .unwrap();

    let members = service.members(&group.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "siti@example.com");
    assert_eq!(service.user_groups().await.unwrap(), vec![group]);
}
