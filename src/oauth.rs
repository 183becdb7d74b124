//! OAuth 1.0a protocol core: request signing and the three-legged handshake.
//!
//! The module owns the wire-level pieces of the protocol (RFC 5849 signature
//! base strings, HMAC-SHA1 signing, parameter placement) plus the handshake
//! state machine that spans the authorize redirect. Network dispatch lives in
//! [`flows`](crate::flows); everything here is pure so it can be tested
//! without a transport.

pub mod handshake;
pub mod signer;

pub use handshake::*;
pub use signer::*;

pub(crate) use handshake::{build_authorize_url, parse_token_response};
