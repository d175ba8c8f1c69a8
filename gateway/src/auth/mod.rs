//! Authentication: credential checks and bearer tokens.

pub mod credentials;
pub mod token;

pub use credentials::{CredentialStore, StaticCredentialStore};
pub use token::{subject_claims, Claims, TokenError, TokenService};
