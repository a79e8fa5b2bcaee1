//! Repository layer - Data access abstraction
//!
//! A single SeaORM-backed [`SeaOrmRepository`] implements the domain
//! `Repository` contract for every [`Persistable`] entity. Filters are
//! translated to SeaORM conditions by [`SeaOrmConditionParser`].

mod base;
mod condition;
pub(crate) mod entities;
mod user_repository;

pub use base::{Persistable, SeaOrmRepository};
pub use condition::{resolve_column, SeaOrmConditionParser};
pub use entities::{UserActiveModel, UserModel, UserTable};
pub use user_repository::UserStore;
