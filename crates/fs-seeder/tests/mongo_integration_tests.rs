//! MongoDB Integration Tests
//!
//! These tests need a running MongoDB replica set and only run when
//! `INTEGRATION=1` is set:
//!
//!   docker run -d -p 27017:27017 mongo:7 --replSet rs0
//!   docker exec <id> mongosh --eval 'rs.initiate()'
//!   INTEGRATION=1 FIXTURE_SEEDER_TEST_MONGODB_URI=mongodb://localhost:27017/?directConnection=true \
//!     cargo test -p fs-seeder --test mongo_integration_tests -- --test-threads=1
//!
//! The URI must connect with a user allowed to create users (or through the
//! localhost exception on a server without users).

use std::time::Duration;

use fs_seeder::{
    credentialed_uri, Credential, FixtureSeeder, MongoPrincipalStore, PrincipalStore,
};

fn integration_enabled() -> bool {
    std::env::var("INTEGRATION").is_ok_and(|v| v == "1")
}

fn test_uri() -> String {
    std::env::var("FIXTURE_SEEDER_TEST_MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/?directConnection=true".to_string())
}

async fn store() -> MongoPrincipalStore {
    MongoPrincipalStore::connect(&test_uri(), "admin", Duration::from_secs(10))
        .await
        .expect("failed to build client")
}

#[tokio::test]
async fn test_seed_twice_against_mongodb() {
    if !integration_enabled() {
        return;
    }
    let store = store().await;
    let seeder = FixtureSeeder::flink_fixtures(Credential::new("superpw"), Credential::new("flinkpw")).unwrap();

    seeder.seed_all(&store).await.expect("first seed failed");
    let second = seeder.seed_all(&store).await.expect("second seed failed");

    assert!(second.created().is_empty());
    assert_eq!(store.count_principals("superuser").await.unwrap(), 1);
    assert_eq!(store.count_principals("flinkuser").await.unwrap(), 1);
}

#[tokio::test]
async fn test_seeded_superuser_can_authenticate() {
    if !integration_enabled() {
        return;
    }
    let seeder = FixtureSeeder::flink_fixtures(Credential::new("superpw"), Credential::new("flinkpw")).unwrap();
    seeder.seed_all(&store().await).await.expect("seed failed");

    let uri = credentialed_uri(&test_uri(), "superuser", &Credential::new("superpw")).unwrap();
    let as_superuser = MongoPrincipalStore::connect(&uri, "admin", Duration::from_secs(10))
        .await
        .unwrap();

    as_superuser.ping().await.expect("superuser could not authenticate");
    let status = as_superuser.get_replication_status().await.expect("replSetGetStatus failed");
    assert!(status.as_document().contains_key("members"));
}

#[tokio::test]
async fn test_wrong_password_is_permission_denied() {
    if !integration_enabled() {
        return;
    }
    let seeder = FixtureSeeder::flink_fixtures(Credential::new("superpw"), Credential::new("flinkpw")).unwrap();
    seeder.seed_all(&store().await).await.expect("seed failed");

    let uri = credentialed_uri(&test_uri(), "flinkuser", &Credential::new("not-flinkpw")).unwrap();
    let as_flinkuser = MongoPrincipalStore::connect(&uri, "admin", Duration::from_secs(5))
        .await
        .unwrap();

    let err = as_flinkuser.ping().await.unwrap_err();
    assert!(err.is_permission_denied(), "unexpected error: {err}");
}
