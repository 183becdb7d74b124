//! Auth-domain identifiers, credentials, tokens, and keypair models.

pub mod credentials;
pub mod id;
pub mod keypair;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use keypair::*;
pub use secret::*;
pub use token::*;
