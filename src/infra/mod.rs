//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - SeaORM repositories and filter translation

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{Persistable, SeaOrmConditionParser, SeaOrmRepository, UserStore, UserTable};
