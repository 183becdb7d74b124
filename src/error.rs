//! Registrar-level error types shared across flows, the authority client, and stores.

// self
use crate::_prelude::*;

/// Registrar-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical registrar error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The authority rejected the OAuth exchange or a signed request.
	#[error("Authority rejected the signed request: {reason}.")]
	Auth {
		/// Authority- or registrar-supplied reason string.
		reason: String,
		/// Raw response body, kept verbatim for operator diagnosis.
		body: Option<String>,
	},
	/// The resource owner denied authorization during the handshake.
	#[error("Resource owner denied the registration authorization.")]
	Denied,
	/// An authority document could not be parsed into the expected shape.
	#[error("Authority returned an unparsable {what} document.")]
	ConfigParse {
		/// Which document failed to parse (endpoints, preferences, key registration).
		what: &'static str,
		/// Raw response body, kept verbatim for operator diagnosis.
		body: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Key submission failed for a reason other than an already-registered key.
	#[error("Authority rejected the public key submission.")]
	KeySubmission {
		/// Raw response body, kept verbatim for operator diagnosis.
		body: String,
	},
}
impl Error {
	/// Returns the raw authority response body attached to the error, if any.
	pub fn authority_body(&self) -> Option<&str> {
		match self {
			Error::Auth { body, .. } => body.as_deref(),
			Error::ConfigParse { body, .. } | Error::KeySubmission { body } => Some(body),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the registrar.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Authority descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::AuthorityDescriptorError),
	/// Generated key material could not be PEM-encoded.
	#[error("Keypair could not be encoded as PEM.")]
	KeyEncoding {
		/// Underlying encoding failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a key encoding failure inside [`ConfigError`].
	pub fn key_encoding(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::KeyEncoding { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the authority.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the authority.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;
	use std::error::Error as StdError;

	#[test]
	fn authority_body_surfaces_raw_payloads() {
		let err = Error::KeySubmission { body: "{\"type\":\"oops\"}".into() };

		assert_eq!(err.authority_body(), Some("{\"type\":\"oops\"}"));

		let err = Error::Auth { reason: "signature mismatch".into(), body: None };

		assert_eq!(err.authority_body(), None);
		assert!(err.to_string().contains("signature mismatch"));
	}

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "snapshot unreadable".into() };
		let err: Error = store_error.clone().into();

		assert!(matches!(err, Error::Storage(_)));

		let source = StdError::source(&err)
			.expect("Registrar error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
