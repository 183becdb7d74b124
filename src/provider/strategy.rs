//! Classification of authority error payloads.
//!
//! The authority reports failures as JSON objects with a dotted `type` field
//! and an optional nested `cause`. Flows only need to recognize two shapes:
//! the duplicate-key signature that makes key registration idempotent, and
//! everything else.

// self
use crate::_prelude::*;

const ADD_PUBLIC_KEY_FAILED: &str = "payswarm.website.AddPublicKeyFailed";
const ID_ALREADY_EXISTS: &str = "payswarm.database.IdAlreadyExists";

/// Structured error payload returned by the authority.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorityErrorBody {
	/// Dotted error type identifier.
	#[serde(rename = "type", default)]
	pub error_type: Option<String>,
	/// Nested cause, when the authority reports one.
	#[serde(default)]
	pub cause: Option<AuthorityErrorCause>,
	/// Human-readable message, when present.
	#[serde(default)]
	pub message: Option<String>,
}
impl AuthorityErrorBody {
	/// Attempts to parse an authority error payload; `None` for non-JSON bodies.
	pub fn parse(body: &str) -> Option<Self> {
		serde_json::from_str(body).ok()
	}

	/// Returns `true` for the duplicate-key signature that key submission
	/// treats as success.
	pub fn is_duplicate_key(&self) -> bool {
		self.error_type.as_deref() == Some(ADD_PUBLIC_KEY_FAILED)
			&& self.cause.as_ref().and_then(|cause| cause.error_type.as_deref())
				== Some(ID_ALREADY_EXISTS)
	}
}

/// Nested cause inside an authority error payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorityErrorCause {
	/// Dotted error type identifier of the cause.
	#[serde(rename = "type", default)]
	pub error_type: Option<String>,
}

/// Checks a raw response body for the duplicate-key signature.
pub fn is_duplicate_key_body(body: &str) -> bool {
	AuthorityErrorBody::parse(body).is_some_and(|parsed| parsed.is_duplicate_key())
}
