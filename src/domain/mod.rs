//! Domain layer - Core business entities and logic
//!
//! Entities, their validation rules, the notification error model and the
//! repository contract with its search/filter types. Nothing here knows
//! which storage engine is in use.

pub mod auth;
pub mod entity;
pub mod notification;
pub mod password;
pub mod repository;
pub mod rules;
pub mod user;

pub use auth::{SignInEntity, SignInInput};
pub use entity::{Entity, EntityBase, FieldReport, ValidationOutput};
pub use notification::{FieldError, FieldErrors, Notification, NotificationError};
pub use password::Password;
pub use repository::{
    ConditionParser, Filter, FilterError, PassthroughParser, Repository, SearchParams,
    SearchProps, SearchResult,
};
pub use rules::{Constraint, FieldRules};
pub use user::{UserEntity, UserInput};
