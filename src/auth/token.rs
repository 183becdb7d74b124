//! Token records exchanged during and after the OAuth 1.0a handshake.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Temporary request-token credentials obtained from the request endpoint.
///
/// The secret must survive the authorize redirect, so the pair is persisted in
/// the credential store until the handshake completes or is abandoned.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryCredentials {
	/// Request token identifier.
	pub token: String,
	/// Request token secret; callers must avoid logging it.
	pub secret: TokenSecret,
}
impl TemporaryCredentials {
	/// Bundles a request token with its secret.
	pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { token: token.into(), secret: TokenSecret::new(secret) }
	}
}
impl Debug for TemporaryCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TemporaryCredentials")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Access token issued at the end of the handshake.
///
/// Tokens carry no expiry; the authority signals invalidation by rejecting a
/// signed request, at which point the record is deleted and the handshake is
/// re-run once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
	/// Access token identifier.
	pub token: String,
	/// Access token secret; callers must avoid logging it.
	pub secret: TokenSecret,
	/// Scope the token was issued for.
	pub scope: String,
}
impl TokenRecord {
	/// Bundles an access token with its secret and scope.
	pub fn new(token: impl Into<String>, secret: impl Into<String>, scope: impl Into<String>) -> Self {
		Self { token: token.into(), secret: TokenSecret::new(secret), scope: scope.into() }
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("scope", &self.scope)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn records_redact_secrets() {
		let temporary = TemporaryCredentials::new("req-1", "req-secret");
		let record = TokenRecord::new("acc-1", "acc-secret", "registration");

		assert!(!format!("{temporary:?}").contains("req-secret"));
		assert!(!format!("{record:?}").contains("acc-secret"));
		assert_eq!(record.scope, "registration");
	}

	#[test]
	fn records_serialize_round_trip() {
		let record = TokenRecord::new("acc-2", "acc-secret-2", "registration");
		let payload =
			serde_json::to_string(&record).expect("Token record should serialize to JSON.");
		let parsed: TokenRecord =
			serde_json::from_str(&payload).expect("Token record should deserialize from JSON.");

		assert_eq!(parsed, record);
	}
}
