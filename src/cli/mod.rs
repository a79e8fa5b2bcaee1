//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `migrate` - Database migrations
//! - `users` - User CRUD and search
//! - `auth` - Sign-up and sign-in

pub mod args;

pub use args::{Cli, Commands};
