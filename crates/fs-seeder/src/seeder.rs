//! Idempotent principal seeding
//!
//! Each principal is created only when the database reports none with its
//! name. Existing principals are never updated. The first failure aborts the
//! run; principals created before it are left in place.

use std::collections::HashSet;
use tracing::{info, warn};

use crate::{Credential, PrincipalSpec, PrincipalStore, ReplicationStatus, Result, RoleGrant, SeedError};

/// Which branch `ensure_principal` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyPresent,
}

/// Per-principal outcomes of a `seed_all` run, in seeding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub outcomes: Vec<(String, EnsureOutcome)>,
}

impl SeedReport {
    pub fn created(&self) -> Vec<&str> {
        self.names_with(EnsureOutcome::Created)
    }

    pub fn already_present(&self) -> Vec<&str> {
        self.names_with(EnsureOutcome::AlreadyPresent)
    }

    fn names_with(&self, outcome: EnsureOutcome) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == outcome)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Create `spec` unless a principal with its name already exists.
///
/// A duplicate reported by the create itself means another process won the
/// check-then-create race; it counts as already present.
pub async fn ensure_principal<S>(store: &S, spec: &PrincipalSpec) -> Result<EnsureOutcome>
where
    S: PrincipalStore + ?Sized,
{
    if store.count_principals(spec.name()).await? > 0 {
        info!(principal = spec.name(), "Principal already present, leaving untouched");
        return Ok(EnsureOutcome::AlreadyPresent);
    }

    match store.create_principal(spec).await {
        Ok(()) => {
            info!(principal = spec.name(), roles = ?spec.role_labels(), "Created principal");
            Ok(EnsureOutcome::Created)
        }
        Err(SeedError::DuplicatePrincipal(message)) => {
            warn!(principal = spec.name(), %message, "Principal created concurrently, leaving untouched");
            Ok(EnsureOutcome::AlreadyPresent)
        }
        Err(e) => Err(e),
    }
}

/// Query the replication status and hand it back unparsed.
pub async fn report_status<S>(store: &S) -> Result<ReplicationStatus>
where
    S: PrincipalStore + ?Sized,
{
    let status = store.get_replication_status().await?;
    info!(status = %status.to_json(), "Replication status");
    Ok(status)
}

/// The ordered set of principals a fixture environment needs.
#[derive(Debug, Clone)]
pub struct FixtureSeeder {
    principals: Vec<PrincipalSpec>,
}

impl FixtureSeeder {
    /// Principals are ensured in the given order. Names must be unique.
    pub fn new(principals: Vec<PrincipalSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = principals.iter().find(|p| !seen.insert(p.name())) {
            return Err(SeedError::invalid_principal(format!(
                "{} is listed more than once",
                dup.name()
            )));
        }
        Ok(Self { principals })
    }

    /// `superuser` with root on admin, then `flinkuser` with read access to every database.
    pub fn flink_fixtures(superuser: Credential, flinkuser: Credential) -> Result<Self> {
        Self::new(vec![
            PrincipalSpec::new("superuser", superuser, [RoleGrant::new("root", "admin")])?,
            PrincipalSpec::new(
                "flinkuser",
                flinkuser,
                [
                    RoleGrant::new("read", "admin"),
                    RoleGrant::new("readAnyDatabase", "admin"),
                ],
            )?,
        ])
    }

    pub fn principals(&self) -> &[PrincipalSpec] {
        &self.principals
    }

    pub fn principal(&self, name: &str) -> Option<&PrincipalSpec> {
        self.principals.iter().find(|p| p.name() == name)
    }

    /// Ensure every principal in order, stopping at the first error.
    pub async fn seed_all<S>(&self, store: &S) -> Result<SeedReport>
    where
        S: PrincipalStore + ?Sized,
    {
        let mut report = SeedReport::default();

        for spec in &self.principals {
            let outcome = ensure_principal(store, spec).await.map_err(|e| {
                warn!(principal = spec.name(), error = %e, "Seeding aborted");
                e
            })?;
            report.outcomes.push((spec.name().to_string(), outcome));
        }

        info!(
            created = ?report.created(),
            already_present = ?report.already_present(),
            "Fixture principals seeded"
        );
        Ok(report)
    }

    /// Seed all principals, then report replication status.
    pub async fn run<S>(&self, store: &S) -> Result<(SeedReport, ReplicationStatus)>
    where
        S: PrincipalStore + ?Sized,
    {
        let report = self.seed_all(store).await?;
        let status = report_status(store).await?;
        Ok((report, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flink_fixtures_order_and_roles() {
        let seeder = FixtureSeeder::flink_fixtures(Credential::new("superpw"), Credential::new("flinkpw")).unwrap();

        let names: Vec<_> = seeder.principals().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["superuser", "flinkuser"]);
        assert_eq!(seeder.principal("superuser").unwrap().role_labels(), vec!["root@admin"]);
        assert_eq!(
            seeder.principal("flinkuser").unwrap().role_labels(),
            vec!["read@admin", "readAnyDatabase@admin"]
        );
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let spec = PrincipalSpec::new("a", Credential::new("pw"), [RoleGrant::new("read", "admin")]).unwrap();
        let err = FixtureSeeder::new(vec![spec.clone(), spec]).unwrap_err();
        assert!(matches!(err, SeedError::InvalidPrincipal(_)));
    }

    #[test]
    fn test_report_partitions() {
        let report = SeedReport {
            outcomes: vec![
                ("a".into(), EnsureOutcome::Created),
                ("b".into(), EnsureOutcome::AlreadyPresent),
            ],
        };
        assert_eq!(report.created(), vec!["a"]);
        assert_eq!(report.already_present(), vec!["b"]);
    }
}
