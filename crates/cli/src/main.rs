//! `atelier-admin`: operator maintenance commands for an Atelier deployment.
//!
//! Every command connects to the same database as the API server and, where
//! files are involved, works on the same `UPLOAD_DIR`.

use std::path::PathBuf;

use anyhow::Context;
use atelier_cli::commands;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "atelier-admin")]
#[command(about = "Atelier maintenance CLI")]
#[command(
    after_help = "Environment:\n  DATABASE_URL   PostgreSQL connection string\n  UPLOAD_DIR     Root of stored uploads\n  RUST_LOG       Log filter override"
)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long, env = "UPLOAD_DIR", default_value = "./uploads")]
    upload_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,

    /// Insert the default category tree, and optionally a demo project.
    Seed {
        /// Also create a demo agency, client and project.
        #[arg(long, default_value_t = false)]
        demo: bool,
    },

    /// Create a platform administrator.
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "ATELIER_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Set a new password for any account and lift its lock.
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ATELIER_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Recompute every reviewed prescription's status from its approvals.
    RepairStatuses {
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Permanently remove projects soft-deleted more than N days ago.
    PurgeDeleted {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        older_than_days: u32,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Report stored files no photo or project file row points to.
    OrphanFiles {
        /// Remove the orphans instead of only listing them.
        #[arg(long, default_value_t = false)]
        delete: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_admin=info,atelier_cli=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let pool = atelier_db::create_pool(&cli.database_url)
        .await
        .context("Failed to connect to database")?;
    let storage = atelier_api::storage::LocalStorage::new(&cli.upload_dir);

    match cli.command {
        Command::Migrate => commands::migrate(&pool).await,
        Command::Seed { demo } => commands::seed(&pool, demo).await,
        Command::CreateAdmin {
            email,
            name,
            password,
        } => commands::create_admin(&pool, &email, &name, &password).await,
        Command::ResetPassword { email, password } => {
            commands::reset_password(&pool, &email, &password).await
        }
        Command::RepairStatuses { dry_run } => commands::repair_statuses(&pool, dry_run)
            .await
            .map(|_| ()),
        Command::PurgeDeleted {
            older_than_days,
            dry_run,
        } => commands::purge_deleted(&pool, &storage, older_than_days, dry_run)
            .await
            .map(|_| ()),
        Command::OrphanFiles { delete } => commands::orphan_files(&pool, &storage, delete)
            .await
            .map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DB: &str = "--database-url=postgres://localhost/atelier";

    #[test]
    fn parses_purge_with_flags() {
        let cli = Cli::try_parse_from([
            "atelier-admin",
            DB,
            "purge-deleted",
            "--older-than-days",
            "30",
            "--dry-run",
        ])
        .unwrap();
        assert_matches!(
            cli.command,
            Command::PurgeDeleted {
                older_than_days: 30,
                dry_run: true
            }
        );
    }

    #[test]
    fn purge_requires_positive_age() {
        let result = Cli::try_parse_from([
            "atelier-admin",
            DB,
            "purge-deleted",
            "--older-than-days",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn seed_demo_is_opt_in() {
        let cli = Cli::try_parse_from(["atelier-admin", DB, "seed"]).unwrap();
        assert_matches!(cli.command, Command::Seed { demo: false });

        let cli = Cli::try_parse_from(["atelier-admin", DB, "seed", "--demo"]).unwrap();
        assert_matches!(cli.command, Command::Seed { demo: true });
    }

    #[test]
    fn create_admin_takes_named_arguments() {
        let cli = Cli::try_parse_from([
            "atelier-admin",
            DB,
            "--upload-dir",
            "/srv/uploads",
            "create-admin",
            "--email",
            "ops@example.com",
            "--name",
            "Ops",
            "--password",
            "correct-horse",
        ])
        .unwrap();
        assert_eq!(cli.upload_dir, PathBuf::from("/srv/uploads"));
        assert_matches!(
            cli.command,
            Command::CreateAdmin { ref email, .. } if email == "ops@example.com"
        );
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["atelier-admin", DB, "vacuum"]).is_err());
    }
}
