//! Fixture Seeder
//!
//! Ensures a fixed set of database principals exists before an integration
//! test environment is used, then reports the replica-set status.
//!
//! The target database is reached only through the [`PrincipalStore`] trait.
//! [`MongoPrincipalStore`] talks to a real server; [`MemoryPrincipalStore`]
//! is an in-process double with call recording and failure injection.
//!
//! ```rust,ignore
//! let store = MongoPrincipalStore::connect(&uri, "admin", Duration::from_secs(10)).await?;
//! let seeder = FixtureSeeder::flink_fixtures(Credential::new("superpw"), Credential::new("flinkpw"))?;
//! let (report, status) = seeder.run(&store).await?;
//! ```

pub mod error;
pub mod memory;
pub mod mongo;
pub mod principal;
pub mod seeder;
pub mod status;
pub mod store;
pub mod uri;

pub use error::SeedError;
pub use memory::{InjectedFailure, MemoryPrincipalStore, StoreCall, StoredPrincipal};
pub use mongo::MongoPrincipalStore;
pub use principal::{Credential, PrincipalSpec, RoleGrant};
pub use seeder::{ensure_principal, report_status, EnsureOutcome, FixtureSeeder, SeedReport};
pub use status::ReplicationStatus;
pub use store::PrincipalStore;
pub use uri::credentialed_uri;

pub type Result<T> = std::result::Result<T, SeedError>;
