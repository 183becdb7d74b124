//! High-level flow orchestrators built around the [`Registrar`].

pub mod handshake;
pub mod registration;

pub use handshake::*;
pub use registration::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, Ed25519KeypairProvider, KeypairProvider},
	http::AuthorityHttpClient,
	provider::AuthorityDescriptor,
	store::RegistrarStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Registrar specialized for the crate's default reqwest transport.
pub type ReqwestRegistrar = Registrar<ReqwestHttpClient>;

/// Invoked after a successful registration run updates the stored configuration.
///
/// Implementations typically invalidate downstream caches or re-render
/// merchant pages; the registrar only guarantees the call happens after every
/// store write of the run has completed.
pub trait UpdateNotifier
where
	Self: Send + Sync,
{
	/// Signals that the stored configuration has been updated.
	fn config_updated(&self);
}

/// Default notifier that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;
impl UpdateNotifier for NoopNotifier {
	fn config_updated(&self) {}
}

/// Coordinates registration flows against a single authority descriptor.
///
/// The registrar owns the HTTP client, credential store, descriptor, keypair
/// provider, and notifier so the flow implementations can focus on protocol
/// logic. One registration runs at a time; concurrent calls queue on an
/// internal guard instead of interleaving store writes.
#[derive(Clone)]
pub struct Registrar<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	/// HTTP client wrapper used for every outbound authority request.
	pub http_client: Arc<C>,
	/// Credential store that persists tokens, keys, and configuration.
	pub store: Arc<dyn RegistrarStore>,
	/// Authority descriptor that defines the bootstrap endpoints.
	pub descriptor: AuthorityDescriptor,
	/// OAuth consumer credentials issued by the authority.
	pub credentials: ClientCredentials,
	/// Key generation backend consulted when no stored pair is reusable.
	pub keypair_provider: Arc<dyn KeypairProvider>,
	/// Observer notified after successful configuration updates.
	pub notifier: Arc<dyn UpdateNotifier>,
	pub(crate) registration_guard: Arc<AsyncMutex<()>>,
}
impl<C> Registrar<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	/// Creates a registrar that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn RegistrarStore>,
		descriptor: AuthorityDescriptor,
		credentials: ClientCredentials,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			descriptor,
			credentials,
			keypair_provider: Arc::new(Ed25519KeypairProvider),
			notifier: Arc::new(NoopNotifier),
			registration_guard: Default::default(),
		}
	}

	/// Replaces the key generation backend.
	pub fn with_keypair_provider(mut self, provider: Arc<dyn KeypairProvider>) -> Self {
		self.keypair_provider = provider;

		self
	}

	/// Replaces the configuration-update notifier.
	pub fn with_notifier(mut self, notifier: Arc<dyn UpdateNotifier>) -> Self {
		self.notifier = notifier;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Registrar<ReqwestHttpClient> {
	/// Creates a new registrar for the provided descriptor and credentials.
	///
	/// The registrar provisions its own reqwest-backed transport (request
	/// timeout applied, redirects disabled) so callers do not need to pass
	/// HTTP handles explicitly.
	pub fn new(
		store: Arc<dyn RegistrarStore>,
		descriptor: AuthorityDescriptor,
		credentials: ClientCredentials,
	) -> Result<Self> {
		Ok(Self::with_http_client(store, descriptor, credentials, ReqwestHttpClient::new()?))
	}
}
impl<C> Debug for Registrar<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Registrar")
			.field("descriptor", &self.descriptor)
			.field("credentials", &self.credentials)
			.finish()
	}
}
