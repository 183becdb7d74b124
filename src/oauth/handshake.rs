//! Three-legged handshake state machine spanning the authorize redirect.

// self
use crate::{_prelude::*, auth::TemporaryCredentials};

/// Handshake progression for a registration attempt.
///
/// The flow suspends at [`RequestTokenObtained`](HandshakeState::RequestTokenObtained)
/// while the resource owner is away at the authorize endpoint, which is why
/// pending state is persisted rather than held in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandshakeState {
	/// No request token has been issued yet.
	Unauthenticated,
	/// A request token was issued; awaiting the resource owner's decision.
	RequestTokenObtained,
	/// The resource owner approved; a verifier is in hand.
	Authorized,
	/// The access token exchange completed.
	AccessTokenObtained,
	/// The resource owner denied authorization.
	Denied,
}

/// Persisted handshake state awaiting the authorize callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingHandshake {
	/// Request token credentials issued by the authority.
	pub temporary: TemporaryCredentials,
	/// Scope the handshake was started for.
	pub scope: String,
	state: HandshakeState,
}
impl PendingHandshake {
	/// Records a freshly issued request token.
	pub fn new(temporary: TemporaryCredentials, scope: impl Into<String>) -> Self {
		Self { temporary, scope: scope.into(), state: HandshakeState::RequestTokenObtained }
	}

	/// Current handshake state.
	pub fn state(&self) -> HandshakeState {
		self.state
	}

	/// Validates the authorize callback and advances to the authorized state.
	///
	/// The callback token must match the pending request token; a denial or a
	/// missing verifier resolves to [`Error::Denied`].
	pub fn authorize(self, callback: &CallbackQuery) -> Result<AuthorizedHandshake> {
		if self.state != HandshakeState::RequestTokenObtained {
			return Err(Error::Auth {
				reason: format!("Handshake is not awaiting authorization (state: {:?}).", self.state),
				body: None,
			});
		}
		if callback.denied {
			return Err(Error::Denied);
		}
		if callback.token != self.temporary.token {
			return Err(Error::Auth {
				reason: "Authorize callback token does not match the pending request token.".into(),
				body: None,
			});
		}

		let Some(verifier) = callback.verifier.clone() else {
			return Err(Error::Denied);
		};

		Ok(AuthorizedHandshake { temporary: self.temporary, verifier, scope: self.scope })
	}
}

/// Started handshake handed back to the caller for the redirect leg.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeSession {
	/// Fully-formed authorize URL the resource owner should be sent to.
	pub authorize_url: Url,
	/// Pending state persisted in the credential store.
	pub pending: PendingHandshake,
}

/// Handshake that has been approved and is ready for the access token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizedHandshake {
	/// Request token credentials to exchange.
	pub temporary: TemporaryCredentials,
	/// Verifier returned by the authorize callback.
	pub verifier: String,
	/// Scope the handshake was started for.
	pub scope: String,
}

/// Query parameters delivered to the callback URL after the authorize step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
	/// `oauth_token` echoed back by the authority.
	pub token: String,
	/// `oauth_verifier` proving the resource owner approved.
	pub verifier: Option<String>,
	/// Set when the authority flagged the request as denied.
	pub denied: bool,
}
impl CallbackQuery {
	/// Parses the callback parameters out of a redirect URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_pairs(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
	}

	/// Builds the query from raw key/value pairs.
	pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
		let mut query = Self::default();

		for (key, value) in pairs {
			match key.as_str() {
				"oauth_token" => query.token = value,
				"oauth_verifier" => query.verifier = Some(value),
				"denied" => query.denied = true,
				_ => {},
			}
		}

		query
	}
}

/// Parses a form-encoded token response (`oauth_token=…&oauth_token_secret=…`).
pub(crate) fn parse_token_response(body: &str) -> Result<TemporaryCredentials> {
	let mut token = None;
	let mut secret = None;

	for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
		match key.as_ref() {
			"oauth_token" => token = Some(value.into_owned()),
			"oauth_token_secret" => secret = Some(value.into_owned()),
			_ => {},
		}
	}

	match (token, secret) {
		(Some(token), Some(secret)) if !token.is_empty() =>
			Ok(TemporaryCredentials::new(token, secret)),
		_ => Err(Error::Auth {
			reason: "Token response is missing oauth_token or oauth_token_secret.".into(),
			body: Some(body.to_owned()),
		}),
	}
}

/// Builds the URL the resource owner must visit to approve the request token.
pub(crate) fn build_authorize_url(authorize: &Url, request_token: &str) -> Url {
	let mut url = authorize.clone();

	url.query_pairs_mut().append_pair("oauth_token", request_token);

	url
}
