//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod user;

pub use user::{ActiveModel as UserActiveModel, Entity as UserTable, Model as UserModel};
