//! Cirrus Client
//!
//! Terminal dashboard and CLI for the Cirrus file-storage service.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api::models::AssignRequest;
use api::token::decode_claims;
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::config::Config;
use client::storage::TokenStore;
use client::transport::{AuthTransport, Backend, FileTransport};
use client::ui::{DashboardApp, ListingParams};
use client::uploads::{UploadBatch, UploadBroadcaster, UploadOrchestrator};
use url::Url;

/// Cirrus - client for the Cirrus personal file-storage service.
#[derive(Parser, Debug)]
#[command(name = "cirrus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the client.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the terminal dashboard
    Dashboard,

    /// Log in and store the session token
    Login {
        /// Account email
        email: String,

        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Manage stored files
    #[command(subcommand)]
    Files(FilesCommands),

    /// Manage user accounts
    #[command(subcommand)]
    Users(UsersCommands),
}

/// Subcommands for stored files.
#[derive(Subcommand, Debug, Clone)]
pub enum FilesCommands {
    /// List stored files
    List {
        /// Zero-based page to fetch
        #[arg(long, default_value = "0")]
        page: u32,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Upload up to 6 files as one batch
    Upload {
        /// Local paths to upload
        paths: Vec<PathBuf>,

        /// Overwrite files the backend already stores under the same name
        #[arg(long)]
        update: bool,
    },

    /// Download a file into the download directory
    Download {
        /// File id to download
        id: i64,
    },

    /// Delete a stored file
    Delete {
        /// File id to delete
        id: i64,
    },

    /// Check whether a file name is already stored
    Check {
        /// File name to check
        name: String,
    },
}

/// Subcommands for user management.
#[derive(Subcommand, Debug, Clone)]
pub enum UsersCommands {
    /// List all accounts
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show one account by email
    Info {
        /// Email to look up
        email: String,
    },

    /// Register a new account
    Register {
        /// Email for the new account
        email: String,

        /// Password for the new account (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete an account
    Delete {
        /// User id to delete
        user_id: i64,
    },

    /// Assign storage credits to an account
    Assign {
        /// User id to assign to
        user_id: i64,

        /// Credit amount
        amount: i64,

        /// Reason shown in the account history
        #[arg(default_value = "manual assignment")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default()?
    };

    // Apply environment variable overrides
    config.apply_env_overrides();

    // Validate configuration
    config.validate()?;

    // Initialize tracing. The dashboard owns the terminal, so its logs go
    // to a rolling file instead of stdout.
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.client.log_level.clone()
    };
    let _appender_guard = if matches!(cli.command, Commands::Dashboard) {
        let appender = tracing_appender::rolling::daily(config.log_dir(), "cirrus.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    };

    // Wire up the session store and transports
    let store = Arc::new(TokenStore::new(config.session_path()));
    store.load()?;

    let base = Url::parse(&config.server.base_url)
        .with_context(|| format!("Invalid base_url: {}", config.server.base_url))?;
    let backend = Arc::new(Backend::new(base, Arc::clone(&store)));
    let files = Arc::new(FileTransport::new(
        Arc::clone(&backend),
        config.transfer.download_dir.clone(),
    ));
    let auth = AuthTransport::new(backend);

    match cli.command {
        Commands::Dashboard => {
            let orchestrator =
                UploadOrchestrator::new(Arc::clone(&files), UploadBroadcaster::new());
            let listing = ListingParams {
                sort_by: config.listing.sort_by.clone(),
                page_size: config.listing.page_size,
                ascending: config.listing.ascending,
            };

            let mut app = DashboardApp::new(files, auth, orchestrator, store, listing)
                .context("Failed to initialize the terminal")?;
            let result = app.run().await;
            app.restore().ok();
            result?;
        }

        Commands::Login { email, password } => {
            let password = resolve_password(password)?;
            let data = auth.login(&email, &password).await?;
            store.set_token(data.token.clone())?;

            match decode_claims(&data.token) {
                Ok(claims) => println!("Logged in as {}", claims.sub),
                Err(_) => println!("Logged in as {email}"),
            }
        }

        Commands::Logout => {
            store.clear()?;
            println!("Logged out");
        }

        Commands::Whoami => {
            let token = store
                .token()
                .context("Not logged in; run `cirrus login <email>` first")?;
            let claims = decode_claims(&token)?;
            if claims.is_expired(Utc::now()) {
                println!("{} (session expired)", claims.sub);
            } else {
                println!("{}", claims.sub);
            }
        }

        Commands::Files(command) => run_files_command(command, &files, &config).await?,

        Commands::Users(command) => run_users_command(command, &auth).await?,
    }

    Ok(())
}

/// Handles `cirrus files ...`.
async fn run_files_command(
    command: FilesCommands,
    files: &FileTransport,
    config: &Config,
) -> anyhow::Result<()> {
    match command {
        FilesCommands::List { page, json } => {
            let result = files
                .list(
                    &config.listing.sort_by,
                    page,
                    config.listing.page_size,
                    config.listing.ascending,
                )
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{:<8} {:<36} {:<10} {:>12}  {}",
                    "ID", "NAME", "TYPE", "SIZE", "CREATED"
                );
                for info in &result.content {
                    println!(
                        "{:<8} {:<36} {:<10} {:>12}  {}",
                        info.id,
                        info.name,
                        format!("{:?}", info.file_type).to_lowercase(),
                        info.size,
                        info.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
                println!(
                    "page {}/{} ({} files total)",
                    result.number + 1,
                    result.total_pages.max(1),
                    result.total_elements
                );
            }
        }

        FilesCommands::Upload { paths, update } => {
            // Same batch policy as the dashboard: oversized selections are
            // rejected before any request.
            let batch = UploadBatch::new(paths)?.with_overwrite(update);
            for path in batch.paths() {
                let stored = files.upload(path, batch.overwrite()).await?;
                println!("Stored {} (id {})", stored.name, stored.id);
            }
        }

        FilesCommands::Download { id } => {
            let dest = files.download(id).await?;
            println!("Saved {}", dest.display());
        }

        FilesCommands::Delete { id } => {
            files.delete(id).await?;
            println!("Deleted file {id}");
        }

        FilesCommands::Check { name } => {
            if files.exists(&name).await? {
                println!("{name}: stored");
            } else {
                println!("{name}: not stored");
            }
        }
    }

    Ok(())
}

/// Handles `cirrus users ...`.
async fn run_users_command(command: UsersCommands, auth: &AuthTransport) -> anyhow::Result<()> {
    match command {
        UsersCommands::List { json } => {
            let users = auth.all_users().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                println!("{:<8} {:<36} {:<10} {:>10}", "ID", "EMAIL", "ROLE", "CREDITS");
                for user in &users {
                    println!(
                        "{:<8} {:<36} {:<10} {:>10}",
                        user.id, user.email, user.role, user.credits
                    );
                }
            }
        }

        UsersCommands::Info { email } => {
            let user = auth.user_info(&email).await?;
            println!(
                "{} (id {}) role {} credits {}",
                user.email, user.id, user.role, user.credits
            );
        }

        UsersCommands::Register { email, password } => {
            let password = resolve_password(password)?;
            auth.register(&email, &password).await?;
            println!("Registered {email}");
        }

        UsersCommands::Delete { user_id } => {
            let removed = auth.delete_user(user_id).await?;
            println!("Deleted {} (id {})", removed.email, removed.id);
        }

        UsersCommands::Assign {
            user_id,
            amount,
            description,
        } => {
            let request = AssignRequest {
                amount,
                description,
            };
            auth.assign(user_id, &request).await?;
            println!("Assigned {amount} credits to user {user_id}");
        }
    }

    Ok(())
}

/// Uses the given password or prompts for one on stdin.
fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
