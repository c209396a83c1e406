//! Collaborator trait for the target database

use async_trait::async_trait;

use crate::{PrincipalSpec, ReplicationStatus, Result};

/// Command/query interface of the database the fixtures are seeded into.
///
/// Uniqueness of principal names is enforced by the implementation, not by
/// the seeder; `create_principal` on an existing name must fail with
/// [`SeedError::DuplicatePrincipal`](crate::SeedError::DuplicatePrincipal).
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Number of principals with exactly this name.
    async fn count_principals(&self, name: &str) -> Result<u64>;

    async fn create_principal(&self, spec: &PrincipalSpec) -> Result<()>;

    async fn get_replication_status(&self) -> Result<ReplicationStatus>;
}
