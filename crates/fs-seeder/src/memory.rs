//! In-memory principal store for tests and dry runs.
//!
//! Records every call in order and can be told to fail specific operations.

use async_trait::async_trait;
use bson::{doc, Document};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{Credential, PrincipalSpec, PrincipalStore, ReplicationStatus, Result, RoleGrant, SeedError};

/// A call observed by [`MemoryPrincipalStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CountPrincipals(String),
    CreatePrincipal(String),
    GetReplicationStatus,
}

/// Failure to inject into an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Unavailable,
    PermissionDenied,
}

impl InjectedFailure {
    fn into_error(self, operation: &str) -> SeedError {
        match self {
            Self::Unavailable => SeedError::unavailable(format!("{operation}: injected connection failure")),
            Self::PermissionDenied => SeedError::permission_denied(format!("{operation}: not authorized")),
        }
    }
}

/// A principal as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPrincipal {
    pub name: String,
    pub credential: Credential,
    pub roles: BTreeSet<RoleGrant>,
}

impl From<&PrincipalSpec> for StoredPrincipal {
    fn from(spec: &PrincipalSpec) -> Self {
        Self {
            name: spec.name().to_string(),
            credential: spec.credential().clone(),
            roles: spec.roles().clone(),
        }
    }
}

struct State {
    principals: BTreeMap<String, StoredPrincipal>,
    calls: Vec<StoreCall>,
    count_failures: HashMap<String, InjectedFailure>,
    create_failures: HashMap<String, InjectedFailure>,
    status_failure: Option<InjectedFailure>,
    status: Document,
    simulate_race: bool,
}

pub struct MemoryPrincipalStore {
    state: Mutex<State>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                principals: BTreeMap::new(),
                calls: Vec::new(),
                count_failures: HashMap::new(),
                create_failures: HashMap::new(),
                status_failure: None,
                status: default_status(),
                simulate_race: false,
            }),
        }
    }

    /// Preload a principal without recording a call.
    pub fn with_principal(self, spec: &PrincipalSpec) -> Self {
        self.state
            .lock()
            .principals
            .insert(spec.name().to_string(), StoredPrincipal::from(spec));
        self
    }

    pub fn with_status(self, status: Document) -> Self {
        self.state.lock().status = status;
        self
    }

    pub fn fail_count(self, name: &str, failure: InjectedFailure) -> Self {
        self.state.lock().count_failures.insert(name.to_string(), failure);
        self
    }

    pub fn fail_create(self, name: &str, failure: InjectedFailure) -> Self {
        self.state.lock().create_failures.insert(name.to_string(), failure);
        self
    }

    pub fn fail_status(self, failure: InjectedFailure) -> Self {
        self.state.lock().status_failure = Some(failure);
        self
    }

    /// Report a count of zero for every name, as if another process created
    /// the principal between the existence check and the create.
    pub fn simulate_race(self, enabled: bool) -> Self {
        self.state.lock().simulate_race = enabled;
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    /// Names passed to `create_principal`, in call order, including failed attempts.
    pub fn create_calls(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::CreatePrincipal(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn principal(&self, name: &str) -> Option<StoredPrincipal> {
        self.state.lock().principals.get(name).cloned()
    }

    pub fn principal_names(&self) -> Vec<String> {
        self.state.lock().principals.keys().cloned().collect()
    }
}

impl Default for MemoryPrincipalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn count_principals(&self, name: &str) -> Result<u64> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CountPrincipals(name.to_string()));

        if let Some(failure) = state.count_failures.get(name) {
            return Err(failure.into_error("usersInfo"));
        }
        if state.simulate_race {
            return Ok(0);
        }
        Ok(u64::from(state.principals.contains_key(name)))
    }

    async fn create_principal(&self, spec: &PrincipalSpec) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CreatePrincipal(spec.name().to_string()));

        if let Some(failure) = state.create_failures.get(spec.name()) {
            return Err(failure.into_error("createUser"));
        }
        if state.principals.contains_key(spec.name()) {
            return Err(SeedError::DuplicatePrincipal(format!(
                "User \"{}\" already exists",
                spec.name()
            )));
        }

        state
            .principals
            .insert(spec.name().to_string(), StoredPrincipal::from(spec));
        Ok(())
    }

    async fn get_replication_status(&self) -> Result<ReplicationStatus> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::GetReplicationStatus);

        if let Some(failure) = state.status_failure {
            return Err(failure.into_error("replSetGetStatus"));
        }
        Ok(ReplicationStatus::new(state.status.clone()))
    }
}

fn default_status() -> Document {
    doc! {
        "set": "rs0",
        "myState": 1,
        "members": [
            { "_id": 0, "name": "localhost:27017", "stateStr": "PRIMARY", "health": 1.0 }
        ],
        "ok": 1.0,
    }
}
