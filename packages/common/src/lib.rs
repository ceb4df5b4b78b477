//! Wire types shared by the sign-in backend and anything that talks to it.

pub mod types;

pub use types::{ErrorBody, ProvidersResponse, SessionUser};
