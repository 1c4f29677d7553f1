use claim::{assert_err, assert_none, assert_ok, assert_some};
use std::time::Duration;

use mailinglist::{
    config::get_configuration,
    domain::{BatchQuery, EmailUpdate},
    service::{EmailService, ServiceError},
    startup::get_connection_db_pool,
    store::EmailStore,
};

use crate::helpers::spawn_service;

#[tokio::test]
async fn create_email_rejects_an_empty_address() {
    let service = spawn_service().await;

    let result = service.create_email("").await;

    assert_err!(&result);
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn batch_validation_happens_before_the_store_is_touched() {
    // A store pointing at an unreachable database: any call that reaches it
    // would fail with a storage error, not a validation one.
    let mut config = get_configuration().expect("Missing configuration file.");

    config.database.path = std::path::PathBuf::from("/nonexistent/mailinglist.db");
    config.database.create_if_missing = false;

    let store = EmailStore::new(get_connection_db_pool(&config.database));
    let service = EmailService::new(store, Duration::from_secs(1));

    let result = service
        .get_email_batch(BatchQuery { page: 0, count: 5 })
        .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn get_email_batch_rejects_nonpositive_page_and_count() {
    let service = spawn_service().await;

    for (page, count) in [(0, 5), (5, 0), (-1, 5), (5, -1)] {
        let result = service.get_email_batch(BatchQuery { page, count }).await;

        assert!(
            matches!(result, Err(ServiceError::Validation(_))),
            "page={} count={} was not rejected",
            page,
            count
        );
    }
}

#[tokio::test]
async fn create_then_get_round_trips_through_the_store() {
    let service = spawn_service().await;

    let created = assert_ok!(service.create_email("frank@test.com").await);
    let created = assert_some!(created);

    assert_eq!(created.email, "frank@test.com");
    assert!(!created.is_confirmed());
    assert!(!created.opt_out);

    let fetched = assert_ok!(service.get_email("frank@test.com").await);

    assert_eq!(assert_some!(fetched), created);
}

#[tokio::test]
async fn duplicate_create_fails_without_touching_the_stored_record() {
    let service = spawn_service().await;

    let first = assert_some!(assert_ok!(service.create_email("frank@test.com").await));
    let result = service.create_email("frank@test.com").await;

    assert!(matches!(result, Err(ServiceError::DuplicateEmail(_))));

    let stored = assert_some!(assert_ok!(service.get_email("frank@test.com").await));

    assert_eq!(stored, first);
}

#[tokio::test]
async fn update_of_a_missing_email_is_a_noop_success() {
    let service = spawn_service().await;

    let result = assert_ok!(
        service
            .update_email(EmailUpdate {
                email: String::from("nobody@test.com"),
                confirmed_at: mailinglist::domain::EmailEntry::confirmed_at_from_seconds(
                    1_684_000_000
                ),
                opt_out: true,
            })
            .await
    );

    assert_none!(result);
}

#[tokio::test]
async fn delete_of_a_missing_email_is_a_noop_success() {
    let service = spawn_service().await;

    let result = assert_ok!(service.delete_email("nobody@test.com").await);

    assert_none!(result);
}

#[tokio::test]
async fn list_pages_are_ordered_and_bounded() {
    let service = spawn_service().await;

    for email in ["a@test.com", "b@test.com", "c@test.com", "d@test.com", "e@test.com"] {
        assert_ok!(service.create_email(email).await);
    }

    let first_page = assert_ok!(service.get_email_batch(BatchQuery { page: 1, count: 2 }).await);

    assert_eq!(first_page.len(), 2);
    assert!(first_page[0].id < first_page[1].id);

    let last_page = assert_ok!(service.get_email_batch(BatchQuery { page: 3, count: 2 }).await);

    assert_eq!(last_page.len(), 1);

    let past_the_end = assert_ok!(service.get_email_batch(BatchQuery { page: 4, count: 2 }).await);

    assert!(past_the_end.is_empty());
}
