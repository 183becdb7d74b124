//! OAuth consumer credentials issued by the authority.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Client identifier + secret issued once by the payment authority.
///
/// The pair is immutable for the registrar's lifetime; reconfiguring it means
/// constructing a new [`Registrar`](crate::flows::Registrar).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
	/// OAuth consumer key.
	pub client_id: String,
	/// OAuth consumer secret; callers must avoid logging it.
	pub client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Bundles a client identifier with its secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: TokenSecret::new(client_secret) }
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
