//! Transport primitives for signed authority requests.
//!
//! The [`AuthorityHttpClient`] trait is the registrar's only dependency on an
//! HTTP stack: flows hand it a fully signed request and get back the status
//! and verbatim body, which is all the error taxonomy needs. The default
//! reqwest implementation applies a request timeout and never follows
//! redirects, since the authority's endpoints answer directly.

// self
use crate::{_prelude::*, error::TransportError, oauth::SignedRequest};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, oauth::RequestMethod};

#[cfg(feature = "reqwest")] const DEFAULT_TIMEOUT: std::time::Duration =
	std::time::Duration::from_secs(30);

/// Response surfaced to flows: HTTP status plus the verbatim body.
#[derive(Clone, Debug)]
pub struct AuthorityResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body, byte-for-byte as received.
	pub body: String,
}
impl AuthorityResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Future returned by transport implementations.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AuthorityResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing signed requests.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// across registrar instances behind an `Arc` without additional wrappers.
/// Timeouts are the transport's responsibility and surface as
/// [`TransportError`] like any other network failure.
pub trait AuthorityHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Dispatches a signed request and captures the response status + body.
	fn execute(&self, request: SignedRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with the default timeout and redirect following disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(DEFAULT_TIMEOUT)
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// Configure custom clients with a timeout and with redirect following
	/// disabled; the registrar does not re-apply either.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AuthorityHttpClient for ReqwestHttpClient {
	fn execute(&self, request: SignedRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let builder = match request.method {
				RequestMethod::Get => client.get(request.url),
				RequestMethod::Post => client.post(request.url).form(&request.form),
			};
			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.text().await.map_err(TransportError::from)?;

			Ok(AuthorityResponse { status, body })
		})
	}
}
