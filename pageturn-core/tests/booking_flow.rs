//! Service-level tests of the booking state machine:
//! `available -> booked -> taken | available`.

mod support;

use pageturn_common::{
    model::{booking::NewBooking, post::PostStatus, user::Email},
    util::now_seconds,
};
use pageturn_core::{
    ServiceError,
    store::{BookingStore, StoreError},
};
use support::{TestApp, email_of};

#[tokio::test]
async fn booking_an_available_post() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();

    assert_eq!(app.store.post_status(post), PostStatus::Booked);
    assert_eq!(app.store.booking_count(post), 1);
    let booking = app.bookings_by_post(post).await.unwrap();
    assert_eq!(booking.booker, bob);
}

#[tokio::test]
async fn booking_a_booked_post_fails() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let carol = app.seed_user("carol@x.com", "carol").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();

    assert!(matches!(
        app.bookings.book(&carol, post).await,
        Err(ServiceError::PostIsNotAvailable)
    ));
    assert_eq!(app.store.booking_count(post), 1);
}

#[tokio::test]
async fn owner_can_never_book_own_post() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    // Available post.
    assert!(matches!(
        app.bookings.book(&alice, post).await,
        Err(ServiceError::UserIsOwner)
    ));

    // Still owner-rejected once booked, not "not available".
    app.bookings.book(&bob, post).await.unwrap();
    assert!(matches!(
        app.bookings.book(&alice, post).await,
        Err(ServiceError::UserIsOwner)
    ));
}

#[tokio::test]
async fn cancel_restores_available_with_zero_bookings() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();
    app.bookings.cancel(&bob, post).await.unwrap();

    assert_eq!(app.store.post_status(post), PostStatus::Available);
    assert_eq!(app.store.booking_count(post), 0);

    // And the post is bookable again.
    app.bookings.book(&bob, post).await.unwrap();
    assert_eq!(app.store.post_status(post), PostStatus::Booked);
}

#[tokio::test]
async fn mark_taken_is_terminal_and_purges_bookings() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();
    app.bookings.mark_taken(&bob, post).await.unwrap();

    assert_eq!(app.store.post_status(post), PostStatus::Taken);
    assert_eq!(app.store.booking_count(post), 0);
    assert!(app.bookings_by_post(post).await.is_none());

    // No transition leads out of taken.
    assert!(matches!(
        app.bookings.book(&bob, post).await,
        Err(ServiceError::PostIsNotAvailable)
    ));
    assert!(matches!(
        app.bookings.cancel(&bob, post).await,
        Err(ServiceError::BookingNotFound)
    ));
}

#[tokio::test]
async fn owner_cannot_confirm_own_handover() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();

    assert!(matches!(
        app.bookings.mark_taken(&alice, post).await,
        Err(ServiceError::UserIsOwner)
    ));
    assert_eq!(app.store.post_status(post), PostStatus::Booked);
}

#[tokio::test]
async fn booking_preconditions_fail_fast() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let post = app.seed_post(&alice, "Dune").await;

    let nobody = email_of("nobody@x.com");
    assert!(matches!(
        app.bookings.book(&nobody, post).await,
        Err(ServiceError::UserNotFound)
    ));

    let bob = app.seed_user("bob@x.com", "bob").await;
    assert!(matches!(
        app.bookings.book(&bob, 999.into()).await,
        Err(ServiceError::PostNotFound)
    ));

    assert!(matches!(
        app.bookings.cancel(&bob, post).await,
        Err(ServiceError::BookingNotFound)
    ));
}

#[tokio::test]
async fn permissive_cancel_allows_any_user() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let carol = app.seed_user("carol@x.com", "carol").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();

    // Permissive default: carol may cancel bob's booking.
    app.bookings.cancel(&carol, post).await.unwrap();
    assert_eq!(app.store.post_status(post), PostStatus::Available);
}

#[tokio::test]
async fn strict_cancel_requires_the_booker() {
    let app = TestApp::strict();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let carol = app.seed_user("carol@x.com", "carol").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();

    assert!(matches!(
        app.bookings.cancel(&carol, post).await,
        Err(ServiceError::UserIsNotBooker)
    ));
    assert_eq!(app.store.post_status(post), PostStatus::Booked);

    app.bookings.cancel(&bob, post).await.unwrap();
    assert_eq!(app.store.post_status(post), PostStatus::Available);
}

#[tokio::test]
async fn concurrent_bookings_have_exactly_one_winner() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let carol = app.seed_user("carol@x.com", "carol").await;
    let post = app.seed_post(&alice, "Dune").await;

    let (first, second) = tokio::join!(
        app.bookings.book(&bob, post),
        app.bookings.book(&carol, post),
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for result in [first, second] {
        if let Err(err) = result {
            assert!(matches!(
                err,
                ServiceError::BookingAlreadyExists | ServiceError::PostIsNotAvailable
            ));
        }
    }

    assert_eq!(app.store.booking_count(post), 1);
    assert_eq!(app.store.post_status(post), PostStatus::Booked);
}

#[tokio::test]
async fn duplicate_insert_is_a_store_conflict() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let carol = app.seed_user("carol@x.com", "carol").await;
    let post = app.seed_post(&alice, "Dune").await;

    let booking = |booker: &Email| NewBooking {
        booker: booker.clone(),
        post_id: post,
        created_at: now_seconds(),
    };

    let store: &dyn BookingStore = &*app.store;
    store.book(&booking(&bob)).await.unwrap();

    assert!(matches!(
        store.book(&booking(&carol)).await,
        Err(StoreError::Conflict)
    ));
}

#[tokio::test]
async fn booking_notifies_the_owner() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.users
        .bind_push_token(&alice, "alice-device-token")
        .await
        .unwrap();
    app.bookings.book(&bob, post).await.unwrap();

    app.wait_for_notifications(1).await;
    let sent = app.notifier.sent.lock().unwrap();
    let (token, notification) = &sent[0];
    assert_eq!(token, "alice-device-token");
    assert!(notification.content.contains("Dune"));
}

#[tokio::test]
async fn missing_push_token_skips_notification() {
    let app = TestApp::new();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.bookings.book(&bob, post).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(app.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_booking() {
    let app = TestApp::with_failing_notifier();
    let alice = app.seed_user("alice@x.com", "alice").await;
    let bob = app.seed_user("bob@x.com", "bob").await;
    let post = app.seed_post(&alice, "Dune").await;

    app.users
        .bind_push_token(&alice, "alice-device-token")
        .await
        .unwrap();

    app.bookings.book(&bob, post).await.unwrap();
    assert_eq!(app.store.post_status(post), PostStatus::Booked);
}
