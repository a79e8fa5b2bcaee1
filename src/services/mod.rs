//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and persistence to fulfill
//! application use cases. They depend on the `Repository` and
//! `ConditionParser` abstractions for dependency inversion.

mod auth_service;
pub mod presenter;
mod user_service;

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator};
pub use presenter::{data_to_entity, entity_to_data, flat_object, PlainValue};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
