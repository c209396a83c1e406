//! Principal and Role Grant types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::{Result, SeedError};

/// A role granted on a database, e.g. `readAnyDatabase` on `admin`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

impl RoleGrant {
    pub fn new(role: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            db: db.into(),
        }
    }
}

impl fmt::Display for RoleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.role, self.db)
    }
}

/// Principal password. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw value, for handing to the database only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A principal to ensure: name, credential and the full set of role grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalSpec {
    name: String,
    credential: Credential,
    roles: BTreeSet<RoleGrant>,
}

impl PrincipalSpec {
    /// Build a validated spec. Duplicate grants collapse.
    pub fn new<I>(name: impl Into<String>, credential: Credential, roles: I) -> Result<Self>
    where
        I: IntoIterator<Item = RoleGrant>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SeedError::invalid_principal("name must not be empty"));
        }
        if credential.is_empty() {
            return Err(SeedError::invalid_principal(format!("{name}: credential must not be empty")));
        }

        let roles: BTreeSet<RoleGrant> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(SeedError::invalid_principal(format!("{name}: at least one role is required")));
        }
        if let Some(grant) = roles
            .iter()
            .find(|g| g.role.trim().is_empty() || g.db.trim().is_empty())
        {
            return Err(SeedError::invalid_principal(format!(
                "{name}: incomplete role grant '{grant}'"
            )));
        }

        Ok(Self { name, credential, roles })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn roles(&self) -> &BTreeSet<RoleGrant> {
        &self.roles
    }

    /// Grants rendered as `role@db`, for logging.
    pub fn role_labels(&self) -> Vec<String> {
        self.roles.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_grants_collapse() {
        let spec = PrincipalSpec::new(
            "flinkuser",
            Credential::new("flinkpw"),
            vec![
                RoleGrant::new("read", "admin"),
                RoleGrant::new("readAnyDatabase", "admin"),
                RoleGrant::new("read", "admin"),
            ],
        )
        .unwrap();

        assert_eq!(spec.roles().len(), 2);
        assert_eq!(spec.role_labels(), vec!["read@admin", "readAnyDatabase@admin"]);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let roles = || vec![RoleGrant::new("root", "admin")];

        assert!(PrincipalSpec::new("", Credential::new("pw"), roles()).is_err());
        assert!(PrincipalSpec::new("  ", Credential::new("pw"), roles()).is_err());
        assert!(PrincipalSpec::new("superuser", Credential::new(""), roles()).is_err());
        assert!(PrincipalSpec::new("superuser", Credential::new("pw"), Vec::new()).is_err());
        assert!(PrincipalSpec::new("superuser", Credential::new("pw"), vec![RoleGrant::new("root", "")]).is_err());
    }

    #[test]
    fn test_credential_is_redacted() {
        let spec = PrincipalSpec::new("superuser", Credential::new("superpw"), vec![RoleGrant::new("root", "admin")])
            .unwrap();

        let debug = format!("{:?}", spec);
        assert!(!debug.contains("superpw"));
        assert_eq!(spec.credential().to_string(), "***");
        assert_eq!(spec.credential().expose(), "superpw");
    }
}
