//! Auth-domain identifiers, redacted secrets, credentials, and issued tokens.

pub mod credentials;
pub mod id;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use secret::*;
pub use token::*;
