//! Registration orchestration: endpoint discovery, key submission, and
//! preference sync behind a single token-refresh retry.
//!
//! [`Registrar::register`] drives the whole sequence. Every step gates the
//! next; auth rejections delete the stored token and re-run the handshake
//! exactly once before becoming fatal, which bounds the redirect loop the
//! flow is otherwise prone to. Fatal errors carry the verbatim authority
//! body so the operator can see what the authority actually said.

// self
use crate::{
	_prelude::*,
	auth::{Keypair, TokenRecord, keypair},
	flows::{AuthorizationDriver, Registrar},
	http::AuthorityHttpClient,
	merchant::{MerchantDefaults, Preferences},
	oauth::{RequestMethod, SignaturePlacement},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{self, DiscoveredEndpoints, KeyRegistration},
};

const REGISTRATION_SCOPE: &str = "registration";
// One automatic re-handshake after a rejected token; the second rejection is fatal.
const MAX_TOKEN_RETRIES: usize = 1;

/// Parameters for a registration run.
#[derive(Clone, Debug)]
pub struct RegistrationRequest {
	/// Scope requested for the access token.
	pub scope: String,
	/// Forces keypair regeneration even when a complete pair is stored.
	pub force_key_regen: bool,
	/// Callback URL the authorize redirect should return to; `oob` when absent.
	pub callback_url: Option<Url>,
}
impl RegistrationRequest {
	/// Creates a request with the registration scope and no forced regeneration.
	pub fn new() -> Self {
		Self { scope: REGISTRATION_SCOPE.into(), force_key_regen: false, callback_url: None }
	}

	/// Overrides the force-regeneration flag.
	pub fn with_force_key_regen(mut self, force: bool) -> Self {
		self.force_key_regen = force;

		self
	}

	/// Sets the callback URL for the authorize redirect.
	pub fn with_callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}
}
impl Default for RegistrationRequest {
	fn default() -> Self {
		Self::new()
	}
}

/// Outcome of a successful registration run.
#[derive(Clone, Debug)]
pub struct RegistrationSummary {
	/// Keypair in effect after the run, including any assigned public-key URL.
	pub keypair: Keypair,
	/// `true` when the authority reported the key as already registered.
	pub key_already_registered: bool,
	/// Endpoints discovered from the configuration document.
	pub endpoints: DiscoveredEndpoints,
	/// Preferences fetched from the authority.
	pub preferences: Preferences,
	/// Merchant defaults after applying the fallback policy.
	pub defaults: MerchantDefaults,
}

impl<C> Registrar<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	/// Runs the full registration sequence.
	///
	/// Reuses the stored access token when one exists, otherwise performs the
	/// handshake through `driver`. A rejected token is deleted and the
	/// handshake re-run once; any further rejection, unparsable document, or
	/// non-duplicate key-submission failure halts the run.
	pub async fn register(
		&self,
		driver: &dyn AuthorizationDriver,
		request: RegistrationRequest,
	) -> Result<RegistrationSummary> {
		const KIND: FlowKind = FlowKind::Registration;

		let span = FlowSpan::new(KIND, "register");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _serialized = self.registration_guard.lock().await;
				let mut token = match self.store.fetch_token().await? {
					Some(token) => token,
					None =>
						self.acquire_token(driver, &request.scope, request.callback_url.as_ref())
							.await?,
				};
				let mut attempt = 0;

				loop {
					match self.run_registration_steps(&token, &request).await {
						Err(Error::Auth { .. }) if attempt < MAX_TOKEN_RETRIES => {
							attempt += 1;

							self.store.delete_token().await?;

							token = self
								.acquire_token(
									driver,
									&request.scope,
									request.callback_url.as_ref(),
								)
								.await?;
						},
						result => break result,
					}
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(Error::Denied) => obs::record_flow_outcome(KIND, FlowOutcome::Denied),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn run_registration_steps(
		&self,
		token: &TokenRecord,
		request: &RegistrationRequest,
	) -> Result<RegistrationSummary> {
		let endpoints = self.discover_endpoints(token).await?;
		let keypair = self.obtain_and_store_keypair(request.force_key_regen).await?;
		let (keypair, key_already_registered) =
			self.submit_public_key(token, &endpoints, keypair).await?;
		let preferences = self.fetch_preferences(token, &endpoints).await?;
		let defaults = self.apply_default_policy(&preferences).await?;

		self.notifier.config_updated();

		Ok(RegistrationSummary { keypair, key_already_registered, endpoints, preferences, defaults })
	}

	async fn discover_endpoints(&self, token: &TokenRecord) -> Result<DiscoveredEndpoints> {
		let response = self
			.fetch_signed(
				token,
				&self.descriptor.endpoints.config,
				RequestMethod::Get,
				&[],
				SignaturePlacement::Query,
			)
			.await?;

		if !response.is_success() {
			return Err(Error::Auth {
				reason: format!(
					"Authority answered the configuration call with HTTP {}.",
					response.status,
				),
				body: Some(response.body),
			});
		}

		let endpoints: DiscoveredEndpoints =
			provider::parse_document("endpoint configuration", &response.body)?;

		self.store.save_endpoints(endpoints.clone()).await?;

		Ok(endpoints)
	}

	async fn obtain_and_store_keypair(&self, force_regen: bool) -> Result<Keypair> {
		let stored = self.store.fetch_keypair().await?;
		let pair = keypair::obtain_keypair(stored, !force_regen, self.keypair_provider.as_ref())?;

		// Persisted before submission so a failure later in the run never
		// regenerates key material on retry.
		self.store.save_keypair(pair.clone()).await?;

		Ok(pair)
	}

	async fn submit_public_key(
		&self,
		token: &TokenRecord,
		endpoints: &DiscoveredEndpoints,
		pair: Keypair,
	) -> Result<(Keypair, bool)> {
		let mut params = vec![("public_key".to_string(), pair.public_key_pem.clone())];

		if !pair.public_key_url.is_empty() {
			params.push(("public_key_url".to_string(), pair.public_key_url.clone()));
		}

		let response = self
			.fetch_signed(
				token,
				&endpoints.keys,
				RequestMethod::Post,
				&params,
				SignaturePlacement::FormBody,
			)
			.await?;

		if response.is_success() {
			let registration: KeyRegistration =
				provider::parse_document("key registration", &response.body)?;
			let pair = pair.with_public_key_url(registration.public_key_url);

			self.store.save_keypair(pair.clone()).await?;

			return Ok((pair, false));
		}
		if provider::is_duplicate_key_body(&response.body) {
			// Already registered upstream; the run continues as a success.
			return Ok((pair, true));
		}
		if matches!(response.status, 401 | 403) {
			return Err(Error::Auth {
				reason: format!(
					"Authority answered the key submission with HTTP {}.",
					response.status,
				),
				body: Some(response.body),
			});
		}

		Err(Error::KeySubmission { body: response.body })
	}

	async fn fetch_preferences(
		&self,
		token: &TokenRecord,
		endpoints: &DiscoveredEndpoints,
	) -> Result<Preferences> {
		let response = self
			.fetch_signed(
				token,
				&endpoints.preferences,
				RequestMethod::Get,
				&[],
				SignaturePlacement::Query,
			)
			.await?;

		if !response.is_success() {
			return Err(Error::Auth {
				reason: format!(
					"Authority answered the preferences call with HTTP {}.",
					response.status,
				),
				body: Some(response.body),
			});
		}

		let preferences: Preferences = provider::parse_document("preferences", &response.body)?;

		self.store.save_preferences(preferences.clone()).await?;

		Ok(preferences)
	}

	async fn apply_default_policy(&self, preferences: &Preferences) -> Result<MerchantDefaults> {
		let defaults = self
			.store
			.fetch_defaults()
			.await?
			.unwrap_or_default()
			.apply_policy(preferences);

		self.store.save_defaults(defaults.clone()).await?;

		Ok(defaults)
	}
}
