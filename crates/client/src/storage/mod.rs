//! Local persistent state.
//!
//! The only durable state the client keeps is the login session: the bearer
//! token, persisted under a fixed key in a JSON session file.

mod session;

pub use session::TokenStore;
