//! Smart Pro session command-line client.

#![forbid(unsafe_code)]

mod cli_config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use smartpro_application::{GateConfig, SessionContext, SystemClock};
use smartpro_core::{AppError, AppResult};
use smartpro_domain::{ProjectId, RoutePath, RouteTable};
use smartpro_infrastructure::FrappeSessionApi;
use tracing::info;

use crate::cli_config::{CliConfig, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "smartpro-cli", about = "Inspect a Smart Pro session")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the user behind the current session.
    Whoami,
    /// Print access-level flags and managed projects.
    Permissions,
    /// Print role names and role-derived flags.
    Roles,
    /// Print whether timesheets of a project can be approved.
    CanApprove {
        /// Project record name.
        project: String,
    },
    /// Navigate through the given paths and print where each one lands.
    Navigate {
        /// Client paths, visited in order.
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// End the session and reset cached state.
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load()?;
    let api = Arc::new(FrappeSessionApi::new(
        config.base_url.as_str(),
        config.http_timeout,
    )?);
    let session = SessionContext::new(
        api.clone(),
        api,
        Arc::new(SystemClock),
        GateConfig::default(),
    );

    info!(base_url = %config.base_url, "smartpro-cli started");

    if let Some(credentials) = &config.credentials {
        session
            .login(credentials.username.as_str(), credentials.password.as_str())
            .await?;
    }

    run(&session, cli.command).await
}

async fn run(session: &SessionContext, command: Command) -> AppResult<()> {
    match command {
        Command::Whoami => {
            let user = session.gate().resolve_user(true).await;
            println!("{user}");
        }
        Command::Permissions => {
            let permissions = session.permissions().fetch_permissions().await;
            let status = session.permissions().status().await;
            println!("has_full_access: {}", permissions.has_full_access);
            println!("is_project_manager: {}", permissions.is_project_manager);
            let managed: Vec<&str> = permissions
                .managed_projects
                .iter()
                .map(ProjectId::as_str)
                .collect();
            println!("managed_projects: [{}]", managed.join(", "));
            if let Some(error) = status.error {
                println!("error: {error}");
            }
        }
        Command::Roles => {
            let roles = session.roles();
            roles.fetch_roles().await;
            let names: Vec<String> = roles
                .roles()
                .await
                .as_slice()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("roles: [{}]", names.join(", "));
            println!("is_team_lead: {}", roles.is_team_lead().await);
            println!("is_employee: {}", roles.is_employee().await);
            if let Some(error) = roles.last_error().await {
                println!("error: {error}");
            }
        }
        Command::CanApprove { project } => {
            let permissions = session.permissions();
            permissions.fetch_permissions().await;
            let allowed = permissions
                .can_approve(&ProjectId::new(project.as_str()))
                .await;
            println!("{project}: {allowed}");
        }
        Command::Navigate { paths } => {
            let router = session.router(RouteTable::smart_pro());
            for path in paths {
                let outcome = router.push(&RoutePath::new(path.as_str())).await?;
                let name = outcome.route.name.unwrap_or("<unnamed>");
                if outcome.redirects.is_empty() {
                    println!("{path} -> {} ({name})", outcome.route.path);
                } else {
                    let hops: Vec<String> =
                        outcome.redirects.iter().map(ToString::to_string).collect();
                    println!(
                        "{path} -> {} ({name}) via {}",
                        outcome.route.path,
                        hops.join(" -> ")
                    );
                }
            }
        }
        Command::Logout => {
            session.logout().await?;
            println!("logged out");
        }
    }

    Ok(())
}
