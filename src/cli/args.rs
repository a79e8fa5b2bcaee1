//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Clean API Core - CRUD and authentication over a generic repository
#[derive(Parser, Debug)]
#[command(name = "clean-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path of an env file to load instead of `.env`
    #[arg(short, long, global = true, env = "CONFIG_PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage users
    Users(UsersArgs),

    /// Sign up or check credentials
    Auth(AuthArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the users command
#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

/// User actions. Payloads are JSON objects.
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// Create a user from a JSON payload
    Create {
        /// e.g. '{"name":"John","email":"john@example.com","password":"12345678"}'
        data: String,
    },
    /// Show one user
    Get { id: String },
    /// Merge a JSON payload into a stored user
    Update { id: String, data: String },
    /// Delete a user
    Delete { id: String },
    /// Search users
    Search(SearchArgs),
}

/// Search options, mirroring the search input contract
#[derive(Parser, Debug, Default)]
pub struct SearchArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<String>,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<String>,

    /// Sort as JSON, e.g. '{"createdAt":"desc"}'
    #[arg(long)]
    pub sort: Option<String>,

    /// Filter as JSON, e.g. '[{"name":{"$cont":"jo"}}]'
    #[arg(long)]
    pub filter: Option<String>,

    /// Columns to project
    #[arg(long, value_delimiter = ',')]
    pub attributes: Vec<String>,

    /// Return every match in one page
    #[arg(long)]
    pub ignore_paging: bool,

    /// Print items as flat objects with dotted keys
    #[arg(long)]
    pub flat: bool,
}

/// Arguments for the auth command
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Authentication actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Register a user from a JSON payload
    SignUp { data: String },
    /// Check credentials
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}
