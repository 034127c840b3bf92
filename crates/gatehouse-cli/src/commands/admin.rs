//! Administrator management commands.
//!
//! These act directly on the configured credential store, outside any HTTP
//! session, so no role check applies.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use gatehouse_api::AppState;
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_entity::user::{UserRole, UserSummary};

use crate::output::{self, OutputFormat};

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create the first super administrator if none exists
    Seed {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an administrator
    Create {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// `admin` (default) or `super_admin`
        #[arg(short, long)]
        role: Option<String>,
    },
    /// List administrators
    List,
    /// Delete an administrator
    Delete {
        /// Administrator id
        id: i64,
    },
    /// Set an administrator's password
    Password {
        /// Administrator id
        id: i64,
        #[arg(short, long)]
        password: String,
    },
}

/// Administrator display row for table output
#[derive(Debug, Serialize, Tabled)]
struct AdminRow {
    id: i64,
    username: String,
    role: String,
}

impl From<&UserSummary> for AdminRow {
    fn from(u: &UserSummary) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            role: u.role.to_string(),
        }
    }
}

/// Execute admin commands
pub async fn execute(
    args: &AdminArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if config.database.provider == "memory" {
        output::print_warning("The in-memory credential store does not persist changes");
    }
    debug!(provider = %config.database.provider, "Opening credential store");
    let state = gatehouse_api::build_state(config).await?;

    let result = run(args, &state, format).await;

    let worker = state.take_activity_worker().await;
    drop(state);
    gatehouse_api::drain_activity(worker).await;
    result
}

async fn run(args: &AdminArgs, state: &AppState, format: OutputFormat) -> Result<(), AppError> {
    let authority = &state.authority;
    match &args.command {
        AdminCommand::Seed { username, password } => {
            match authority.seed_super_admin(username, password).await? {
                Some(created) => {
                    output::print_success(&format!(
                        "Super administrator '{}' created (id {})",
                        created.username, created.id
                    ));
                }
                None => output::print_warning("A super administrator already exists; nothing to do"),
            }
        }
        AdminCommand::Create {
            username,
            password,
            role,
        } => {
            let role = role.as_deref().map(str::parse::<UserRole>).transpose()?;
            let created = authority
                .register_admin(None, username, password, role)
                .await?;
            output::print_item(&AdminRow::from(&created), format);
        }
        AdminCommand::List => {
            let admins = authority.list_admins().await?;
            let rows: Vec<AdminRow> = admins.iter().map(AdminRow::from).collect();
            output::print_list(&rows, format);
        }
        AdminCommand::Delete { id } => {
            authority.delete_admin(None, *id).await?;
            output::print_success(&format!("Administrator {id} deleted"));
        }
        AdminCommand::Password { id, password } => {
            authority.update_password(None, *id, password).await?;
            output::print_success(&format!("Password for administrator {id} updated"));
        }
    }

    Ok(())
}
