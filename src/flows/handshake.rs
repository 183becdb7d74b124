//! Three-legged handshake orchestration spanning the authorize redirect.
//!
//! [`Registrar::start_handshake`] and [`Registrar::complete_handshake`] are
//! the two halves web deployments wire to their redirect handlers: the first
//! persists the pending request token and hands back the authorize URL, the
//! second consumes the callback. [`Registrar::acquire_token`] composes both
//! through an [`AuthorizationDriver`], which is also how the registration
//! flow re-runs the handshake for its single token-refresh retry.

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	flows::Registrar,
	http::{AuthorityHttpClient, AuthorityResponse},
	oauth::{
		self, CallbackQuery, HandshakeSession, PendingHandshake, RequestMethod, RequestSigner,
		SignaturePlacement,
	},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Future returned by [`AuthorizationDriver::authorize`].
pub type DriverFuture<'a> = Pin<Box<dyn Future<Output = Result<CallbackQuery>> + 'a + Send>>;

/// Carries the authorize URL to the resource owner and returns their decision.
///
/// Web deployments implement this by redirecting the browser and resuming on
/// the callback; tests approve or deny programmatically. Implementations
/// resolve to the callback query on approval and may either resolve with a
/// denied query or reject with [`Error::Denied`] on refusal.
pub trait AuthorizationDriver
where
	Self: Send + Sync,
{
	/// Presents `authorize_url` to the resource owner.
	fn authorize(&self, authorize_url: Url) -> DriverFuture<'_>;
}

impl<C> Registrar<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	/// Requests a temporary token and persists the pending handshake.
	///
	/// Returns the session whose `authorize_url` the resource owner must
	/// visit; the handshake then suspends until
	/// [`complete_handshake`](Self::complete_handshake) consumes the callback.
	pub async fn start_handshake(
		&self,
		scope: &str,
		callback_url: Option<&Url>,
	) -> Result<HandshakeSession> {
		let signer = RequestSigner::for_client(&self.credentials);
		let callback = callback_url.map(|url| url.to_string()).unwrap_or_else(|| "oob".into());
		let mut protocol_extra = vec![("oauth_callback".to_string(), callback)];
		let params = vec![("scope".to_string(), scope.to_owned())];
		let signed = signer.sign_with_protocol_params(
			RequestMethod::Post,
			&self.descriptor.endpoints.request,
			&params,
			SignaturePlacement::FormBody,
			&mut protocol_extra,
		);
		let response = self.http_client.execute(signed).await?;

		let response = require_success(response, "request token")?;
		let temporary = oauth::parse_token_response(&response.body)?;
		let authorize_url =
			oauth::build_authorize_url(&self.descriptor.endpoints.authorize, &temporary.token);
		let pending = PendingHandshake::new(temporary, scope);

		self.store.save_pending_handshake(pending.clone()).await?;

		Ok(HandshakeSession { authorize_url, pending })
	}

	/// Completes the handshake from the authorize callback parameters.
	///
	/// A denial (or missing verifier) clears the pending state and resolves to
	/// [`Error::Denied`]; on success the access token is exchanged, persisted,
	/// and returned.
	pub async fn complete_handshake(&self, callback: &CallbackQuery) -> Result<TokenRecord> {
		let pending = self.store.fetch_pending_handshake().await?.ok_or_else(|| Error::Auth {
			reason: "No handshake is awaiting authorization.".into(),
			body: None,
		})?;
		let authorized = match pending.authorize(callback) {
			Ok(authorized) => authorized,
			Err(err) => {
				// The pending token is single-use; a denial or mismatch burns it.
				self.store.delete_pending_handshake().await?;

				return Err(err);
			},
		};
		let signer = RequestSigner::for_client(&self.credentials)
			.with_token(&authorized.temporary.token, &authorized.temporary.secret);
		let mut protocol_extra =
			vec![("oauth_verifier".to_string(), authorized.verifier.clone())];
		let signed = signer.sign_with_protocol_params(
			RequestMethod::Post,
			&self.descriptor.endpoints.access,
			&[],
			SignaturePlacement::FormBody,
			&mut protocol_extra,
		);
		let response = self.http_client.execute(signed).await?;

		let response = require_success(response, "access token")?;
		let issued = oauth::parse_token_response(&response.body)?;
		let record = TokenRecord::new(issued.token, issued.secret.expose(), authorized.scope);

		self.store.save_token(record.clone()).await?;
		self.store.delete_pending_handshake().await?;

		Ok(record)
	}

	/// Runs the full handshake through the provided driver.
	pub async fn acquire_token(
		&self,
		driver: &dyn AuthorizationDriver,
		scope: &str,
		callback_url: Option<&Url>,
	) -> Result<TokenRecord> {
		const KIND: FlowKind = FlowKind::Handshake;

		let span = FlowSpan::new(KIND, "acquire_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.start_handshake(scope, callback_url).await?;
				let callback = driver.authorize(session.authorize_url).await?;

				self.complete_handshake(&callback).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(Error::Denied) => obs::record_flow_outcome(KIND, FlowOutcome::Denied),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Issues an authenticated request signed with the stored access token.
	///
	/// Protocol parameters are placed per `placement`; any non-2xx response
	/// maps to [`Error::Auth`] carrying the verbatim authority body.
	pub async fn fetch(
		&self,
		url: &Url,
		method: RequestMethod,
		params: &[(String, String)],
		placement: SignaturePlacement,
	) -> Result<AuthorityResponse> {
		let token = self.store.fetch_token().await?.ok_or_else(|| Error::Auth {
			reason: "No access token is available; run the handshake first.".into(),
			body: None,
		})?;
		let response = self.fetch_signed(&token, url, method, params, placement).await?;

		require_success(response, "signed request")
	}

	pub(crate) async fn fetch_signed(
		&self,
		token: &TokenRecord,
		url: &Url,
		method: RequestMethod,
		params: &[(String, String)],
		placement: SignaturePlacement,
	) -> Result<AuthorityResponse> {
		let signer =
			RequestSigner::for_client(&self.credentials).with_token(&token.token, &token.secret);
		let signed = signer.sign(method, url, params, placement);

		Ok(self.http_client.execute(signed).await?)
	}
}

fn require_success(response: AuthorityResponse, what: &str) -> Result<AuthorityResponse> {
	if response.is_success() {
		Ok(response)
	} else {
		Err(Error::Auth {
			reason: format!("Authority answered the {what} call with HTTP {}.", response.status),
			body: Some(response.body),
		})
	}
}
