//! Bearer-token authentication.
//!
//! Protected routes take the [`Auth`] extractor, which reads the
//! `Authorization: Bearer <jwt>` header and validates the access token.
//! Handlers receive the decoded claims; there is no server-side session.

mod errors;
mod extractors;
pub mod password;
mod state;

pub use errors::AuthError;
pub use extractors::{Auth, OptionalAuth};
pub use state::HasAuthState;
