//! MongoDB collaborator
//!
//! Principals are MongoDB users managed with the `usersInfo` and `createUser`
//! commands; status comes from `replSetGetStatus` on `admin`.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::time::Duration;
use tracing::debug;

use crate::{PrincipalSpec, PrincipalStore, ReplicationStatus, Result, SeedError};

const ADMIN_DB: &str = "admin";

pub struct MongoPrincipalStore {
    client: Client,
    db: Database,
}

impl MongoPrincipalStore {
    /// Wrap an established client. `database` is where principals are defined.
    pub fn new(client: Client, database: &str) -> Self {
        let db = client.database(database);
        Self { client, db }
    }

    /// Parse `uri` and build a client bounded by `timeout` for connect and server selection.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the first command.
    pub async fn connect(uri: &str, database: &str, timeout: Duration) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some("fixture-seeder".to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        Ok(Self::new(client, database))
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    /// Round-trip `ping` to check reachability and credentials.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .database(ADMIN_DB)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PrincipalStore for MongoPrincipalStore {
    async fn count_principals(&self, name: &str) -> Result<u64> {
        let reply = self
            .db
            .run_command(doc! {
                "usersInfo": { "user": name, "db": self.db.name() }
            })
            .await?;

        let count = users_in_reply(&reply)?;
        debug!(principal = name, count, "Counted principals");
        Ok(count)
    }

    async fn create_principal(&self, spec: &PrincipalSpec) -> Result<()> {
        let roles: Vec<Document> = spec
            .roles()
            .iter()
            .map(|grant| doc! { "role": grant.role.as_str(), "db": grant.db.as_str() })
            .collect();

        self.db
            .run_command(doc! {
                "createUser": spec.name(),
                "pwd": spec.credential().expose(),
                "roles": roles,
            })
            .await?;
        Ok(())
    }

    async fn get_replication_status(&self) -> Result<ReplicationStatus> {
        let reply = self
            .client
            .database(ADMIN_DB)
            .run_command(doc! { "replSetGetStatus": 1 })
            .await?;
        Ok(ReplicationStatus::new(reply))
    }
}

fn users_in_reply(reply: &Document) -> Result<u64> {
    reply
        .get_array("users")
        .map(|users| users.len() as u64)
        .map_err(|e| SeedError::unavailable(format!("malformed usersInfo reply: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_users_in_reply() {
        let reply = doc! { "users": [ { "user": "superuser", "db": "admin" } ], "ok": 1.0 };
        assert_eq!(users_in_reply(&reply).unwrap(), 1);

        let empty = doc! { "users": [], "ok": 1.0 };
        assert_eq!(users_in_reply(&empty).unwrap(), 0);

        let malformed = doc! { "ok": 1.0 };
        assert!(users_in_reply(&malformed).unwrap_err().is_collaborator_unavailable());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_uri() {
        let result = MongoPrincipalStore::connect("postgres://nope", "admin", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SeedError::CollaboratorUnavailable(_))));
    }
}
