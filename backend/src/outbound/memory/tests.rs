//! Behaviour of the in-memory repositories.

use chrono::{Duration, TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::mechanic::fixtures::mechanic_at;
use crate::domain::service_request::fixtures::pending_request;
use crate::domain::{
    AccountRole, EmailAddress, FeedbackComment, FeedbackId, PasswordHash, Rating, Username,
};

fn account(username: &str, email: &str, role: AccountRole) -> Account {
    Account {
        id: AccountId::random(),
        username: Username::parse(username).expect("username"),
        email: EmailAddress::parse(email).expect("email"),
        role,
        password_hash: PasswordHash::new("$argon2id$fixture"),
        created_at: Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp"),
    }
}

fn requester(username: &str) -> NewAccount {
    NewAccount {
        account: account(
            username,
            &format!("{username}@example.com"),
            AccountRole::Requester,
        ),
        mechanic: None,
    }
}

fn feedback(
    author: AccountId,
    request: &ServiceRequest,
    mechanic: MechanicId,
    rating: i64,
) -> Feedback {
    let now = request.created_at + Duration::hours(2);
    Feedback {
        id: FeedbackId::random(),
        author_id: author,
        mechanic_id: mechanic,
        service_request_id: request.id,
        rating: Rating::new(rating).expect("rating"),
        comment: FeedbackComment::parse(Some("Fast and friendly")).expect("comment"),
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
#[case("asha", "other@example.com", "username")]
#[case("ravi", "asha@example.com", "email")]
#[tokio::test]
async fn account_uniqueness_is_enforced(
    #[case] username: &str,
    #[case] email: &str,
    #[case] field: &str,
) {
    let store = InMemoryStore::new();
    AccountRepository::create(&store, &requester("asha"))
        .await
        .expect("first account");

    let clash = NewAccount {
        account: account(username, email, AccountRole::Requester),
        mechanic: None,
    };
    let err = AccountRepository::create(&store, &clash)
        .await
        .expect_err("duplicate");

    assert_eq!(err, AccountRepositoryError::duplicate(field));
}

#[tokio::test]
async fn mechanic_phone_clash_writes_nothing() {
    let store = InMemoryStore::new();
    let first = mechanic_at(12.9, 77.5);
    let mut second = mechanic_at(13.0, 77.6);
    second.phone = first.phone.clone();
    let first_account = account("ravi", "ravi@example.com", AccountRole::Mechanic);
    let second_account = account("kiran", "kiran@example.com", AccountRole::Mechanic);
    let second_id = second_account.id;

    AccountRepository::create(
        &store,
        &NewAccount {
            account: first_account,
            mechanic: Some(first),
        },
    )
    .await
    .expect("first mechanic");
    let err = AccountRepository::create(
        &store,
        &NewAccount {
            account: second_account,
            mechanic: Some(second),
        },
    )
    .await
    .expect_err("phone clash");

    assert_eq!(err, AccountRepositoryError::duplicate("phone"));
    assert!(
        AccountRepository::find_by_id(&store, &second_id)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
async fn searchable_listing_skips_hidden_profiles() {
    let store = InMemoryStore::new();
    let visible = mechanic_at(12.9, 77.5);
    let mut unavailable = mechanic_at(12.9, 77.5);
    unavailable.available = false;
    let mut unlocated = mechanic_at(12.9, 77.5);
    unlocated.coordinates = None;
    let visible_id = visible.id;
    for (index, mechanic) in [visible, unavailable, unlocated].into_iter().enumerate() {
        let mut phone_owner = mechanic;
        phone_owner.phone =
            crate::domain::PhoneNumber::parse(&format!("98765432{index:02}")).expect("phone");
        AccountRepository::create(
            &store,
            &NewAccount {
                account: account(
                    &format!("mech{index}"),
                    &format!("mech{index}@example.com"),
                    AccountRole::Mechanic,
                ),
                mechanic: Some(phone_owner),
            },
        )
        .await
        .expect("mechanic stored");
    }

    let listed = store.list_searchable().await.expect("listing");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, visible_id);
}

#[tokio::test]
async fn transition_only_applies_when_guard_matches() {
    let store = InMemoryStore::new();
    let request = pending_request(AccountId::random(), 12.97, 77.59);
    let mechanic = MechanicId::random();
    ServiceRequestRepository::insert(&store, &request)
        .await
        .expect("insert");
    let guard = UpdateGuard {
        status: ServiceRequestStatus::Pending,
        mechanic_id: None,
    };
    let change = RequestChange {
        status: ServiceRequestStatus::Accepted,
        mechanic_id: Some(mechanic),
    };

    let first = store
        .transition(&request.id, &guard, &change)
        .await
        .expect("first attempt");
    let second = store
        .transition(&request.id, &guard, &change)
        .await
        .expect("second attempt");

    assert_eq!(
        first.map(|r| (r.status, r.mechanic_id)),
        Some((ServiceRequestStatus::Accepted, Some(mechanic)))
    );
    assert!(second.is_none());
}

#[tokio::test]
async fn open_listing_excludes_selected_and_orders_newest_first() {
    let store = InMemoryStore::new();
    let owner = AccountId::random();
    let older = pending_request(owner, 12.97, 77.59);
    let mut newer = pending_request(owner, 12.98, 77.60);
    newer.created_at = older.created_at + Duration::minutes(5);
    let mut selected = pending_request(owner, 12.99, 77.61);
    selected.mechanic_id = Some(MechanicId::random());
    for request in [&older, &newer, &selected] {
        ServiceRequestRepository::insert(&store, request)
            .await
            .expect("insert");
    }

    let open = store.list_open().await.expect("open");

    let ids: Vec<_> = open.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn upsert_keeps_identity_and_replaces_rating() {
    let store = InMemoryStore::new();
    let author = AccountId::random();
    let mechanic = MechanicId::random();
    let request = pending_request(author, 12.97, 77.59);
    let first = feedback(author, &request, mechanic, 2);
    let mut second = feedback(author, &request, mechanic, 5);
    second.updated_at = first.updated_at + Duration::days(1);

    store.upsert(&first).await.expect("first upsert");
    let stored = store.upsert(&second).await.expect("second upsert");

    assert_eq!(stored.id, first.id);
    assert_eq!(stored.created_at, first.created_at);
    assert_eq!(stored.updated_at, second.updated_at);
    assert_eq!(stored.rating.value(), 5);
    assert_eq!(
        store.list_for_mechanic(&mechanic).await.expect("list").len(),
        1
    );
}

#[tokio::test]
async fn insert_rejects_second_rating_for_same_request() {
    let store = InMemoryStore::new();
    let author = AccountId::random();
    let request = pending_request(author, 12.97, 77.59);
    let mechanic = MechanicId::random();

    FeedbackRepository::insert(&store, &feedback(author, &request, mechanic, 4))
        .await
        .expect("first");
    let err = FeedbackRepository::insert(&store, &feedback(author, &request, mechanic, 1))
        .await
        .expect_err("second");

    assert!(matches!(err, FeedbackRepositoryError::Duplicate { .. }));
}

#[tokio::test]
async fn rating_totals_cover_only_requested_mechanics() {
    let store = InMemoryStore::new();
    let rated = MechanicId::random();
    let other = MechanicId::random();
    for (rating, mechanic) in [(4, rated), (5, rated), (1, other)] {
        let author = AccountId::random();
        let request = pending_request(author, 12.97, 77.59);
        FeedbackRepository::insert(&store, &feedback(author, &request, mechanic, rating))
            .await
            .expect("insert");
    }
    let unrated = MechanicId::random();

    let totals = store
        .rating_totals(&[rated, unrated])
        .await
        .expect("totals");

    assert_eq!(totals.len(), 1);
    assert_eq!(totals[&rated], RatingTotals { sum: 9, count: 2 });
}
