//! Fixture Seeder CLI
//!
//! Ensures the configured principals exist in the target MongoDB deployment
//! and prints its replication status. Exits non-zero on any failure, which
//! the invoking harness treats as an unusable environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use fs_config::{ConfigLoader, PrincipalConfig, SeederConfig};
use fs_seeder::{
    credentialed_uri, report_status, Credential, FixtureSeeder, MongoPrincipalStore, PrincipalSpec,
    ReplicationStatus, RoleGrant,
};

/// Fixture Seeder
#[derive(Parser, Debug)]
#[command(name = "fs-seed")]
#[command(about = "Create MongoDB fixture principals if absent and report replica-set status")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Where configuration comes from, and overrides applied on top of it
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Configuration file (TOML)
    #[arg(long, short, env = "FIXTURE_SEEDER_CONFIG")]
    config: Option<PathBuf>,

    /// MongoDB connection string, overrides the configuration
    #[arg(long, env = "FIXTURE_SEEDER_MONGODB_URI")]
    mongo_uri: Option<String>,

    /// Database in which principals are defined, overrides the configuration
    #[arg(long, env = "FIXTURE_SEEDER_MONGODB_DATABASE")]
    database: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ensure all principals exist, then print replication status (default)
    Seed {
        /// Do not query replication status after seeding
        #[arg(long)]
        skip_status: bool,
    },
    /// Print replication status only
    Status,
    /// Print a connection string that authenticates as a configured principal
    Uri {
        #[arg(long)]
        principal: String,
    },
    /// Print an example configuration file
    ExampleConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    fs_common::init_logging("fs-seed");

    let args = Args::parse();

    match args.command.unwrap_or(Command::Seed { skip_status: false }) {
        Command::ExampleConfig => {
            print!("{}", SeederConfig::example_toml());
            Ok(())
        }
        Command::Seed { skip_status } => {
            let config = load_config(&args.config)?;
            seed(&config, !skip_status && config.report_status).await
        }
        Command::Status => {
            let config = load_config(&args.config)?;
            let store = connect(&config).await?;
            let status = report_status(&store).await.context("Failed to query replication status")?;
            print_status(&status)
        }
        Command::Uri { principal } => {
            let config = load_config(&args.config)?;
            let Some(entry) = config.principal(&principal) else {
                bail!("principal '{}' is not configured", principal);
            };
            let uri = credentialed_uri(&config.mongodb.uri, &entry.name, &Credential::new(entry.password.as_str()))?;
            println!("{uri}");
            Ok(())
        }
    }
}

fn load_config(args: &ConfigArgs) -> Result<SeederConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::with_path(path).load(),
        None => ConfigLoader::new().load(),
    }
    .context("Failed to load configuration")?;

    apply_overrides(&mut config, args)?;
    Ok(config)
}

/// Apply command-line overrides and re-check the result.
fn apply_overrides(config: &mut SeederConfig, args: &ConfigArgs) -> Result<()> {
    if let Some(uri) = &args.mongo_uri {
        config.mongodb.uri = uri.clone();
    }
    if let Some(database) = &args.database {
        config.mongodb.database = database.clone();
    }
    config
        .validate()
        .context("Invalid configuration after command-line overrides")?;
    Ok(())
}

async fn seed(config: &SeederConfig, with_status: bool) -> Result<()> {
    let seeder = build_seeder(&config.principals)?;
    let store = connect(config).await?;

    info!(
        database = store.database_name(),
        principals = seeder.principals().len(),
        "Seeding fixture principals"
    );
    seeder.seed_all(&store).await.context("Fixture seeding failed")?;

    if with_status {
        let status = report_status(&store).await.context("Failed to query replication status")?;
        print_status(&status)?;
    }
    Ok(())
}

fn build_seeder(principals: &[PrincipalConfig]) -> Result<FixtureSeeder> {
    let specs = principals
        .iter()
        .map(|p| {
            PrincipalSpec::new(
                p.name.as_str(),
                Credential::new(p.password.as_str()),
                p.roles.iter().map(|r| RoleGrant::new(r.role.as_str(), r.db.as_str())),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FixtureSeeder::new(specs)?)
}

async fn connect(config: &SeederConfig) -> Result<MongoPrincipalStore> {
    let timeout = Duration::from_millis(config.mongodb.connect_timeout_ms);
    MongoPrincipalStore::connect(&config.mongodb.uri, &config.mongodb.database, timeout)
        .await
        .context("Failed to create MongoDB client")
}

fn print_status(status: &ReplicationStatus) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&status.to_json())?);
    Ok(())
}
