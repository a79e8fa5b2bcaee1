//! Clean API Core - generic CRUD and authentication foundation
//!
//! Validated domain entities, a declarative filter language with a
//! pluggable translator, normalized search/pagination parameters and a
//! storage-agnostic repository contract with a SeaORM adapter.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, notification, validation rules, repository contract
//! - **services**: Application use cases and presenters
//! - **infra**: Database, migrations and SeaORM repositories
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create and search users
//! cargo run -- users create '{"name":"John","email":"john@example.com","password":"12345678"}'
//! cargo run -- users search --filter '[{"name":{"$cont":"jo"}}]' --sort '{"createdAt":"desc"}'
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Entity, Notification, NotificationError, Repository, SearchParams, SearchResult};
pub use errors::{AppError, AppResult};
