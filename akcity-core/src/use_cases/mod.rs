/// Business operations composed from entities, repositories, and services
///
/// Each use-case is one struct with one `execute` method. Collaborators come
/// in as trait objects, so the HTTP layer and the tests wire the same flow
/// against different backends.
///
/// # Modules
///
/// - [`authenticate_user`]: Credential verification and session issuance
/// - [`create_user`]: Registration with validation and welcome email

pub mod authenticate_user;
pub mod create_user;

pub use authenticate_user::{AuthOutput, AuthenticateUser, AuthenticateUserInput};
pub use create_user::{CreateUser, CreateUserInput};
