//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod manage_users;
pub mod obtain_token;
pub mod profile;
pub mod request_code;
pub mod token;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::AuthConfig;
pub use manage_users::{
    ManageUsersUseCase, NewUserInput, UserDeletedHook, UserPatch, user_deleted_hook,
};
pub use obtain_token::{ObtainTokenInput, ObtainTokenUseCase, TokenGrant};
pub use profile::ProfileUseCase;
pub use request_code::{RequestCodeInput, RequestCodeOutput, RequestCodeUseCase};
pub use token::{Claims, IssuedToken, TokenService};
