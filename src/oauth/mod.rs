//! OAuth2 authorization-code flow with PKCE.
//!
//! - `pkce`: verifier, challenge, state and the authorization URL
//! - `session`: per-visitor session state and its store
//! - `callback`: ordered validation of the redirect back
//! - `token`: the code-for-token exchange

pub mod callback;
pub mod pkce;
pub mod session;
pub mod token;

pub use callback::{validate, CallbackError, CallbackParams};
pub use pkce::{authorize_url, generate_state, CodeVerifier};
pub use session::{MemorySessionStore, Session, SessionId, SessionStore};
pub use token::{AccessToken, TokenClient};
