//! Thread-safe in-memory [`RegistrarStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Keypair, TokenRecord},
	merchant::{MerchantDefaults, Preferences},
	oauth::PendingHandshake,
	provider::DiscoveredEndpoints,
	store::{RegistrarStore, StoreFuture, StoreSnapshot},
};

type Shared = Arc<RwLock<StoreSnapshot>>;

/// Thread-safe storage backend that keeps records in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Shared);
impl MemoryStore {
	/// Seeds the store with existing contents.
	pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
		Self(Arc::new(RwLock::new(snapshot)))
	}

	/// Returns a copy of the full store contents.
	pub fn snapshot(&self) -> StoreSnapshot {
		self.0.read().clone()
	}

	fn update<T>(&self, apply: impl FnOnce(&mut StoreSnapshot) -> T) -> T {
		apply(&mut self.0.write())
	}
}
impl RegistrarStore for MemoryStore {
	fn save_token(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move { Ok(self.update(|snapshot| snapshot.token = Some(record))) })
	}

	fn fetch_token(&self) -> StoreFuture<'_, Option<TokenRecord>> {
		Box::pin(async move { Ok(self.0.read().token.clone()) })
	}

	fn delete_token(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { Ok(self.update(|snapshot| snapshot.token = None)) })
	}

	fn save_pending_handshake(&self, pending: PendingHandshake) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			Ok(self.update(|snapshot| snapshot.pending_handshake = Some(pending)))
		})
	}

	fn fetch_pending_handshake(&self) -> StoreFuture<'_, Option<PendingHandshake>> {
		Box::pin(async move { Ok(self.0.read().pending_handshake.clone()) })
	}

	fn delete_pending_handshake(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { Ok(self.update(|snapshot| snapshot.pending_handshake = None)) })
	}

	fn save_keypair(&self, keypair: Keypair) -> StoreFuture<'_, ()> {
		Box::pin(async move { Ok(self.update(|snapshot| snapshot.keypair = Some(keypair))) })
	}

	fn fetch_keypair(&self) -> StoreFuture<'_, Option<Keypair>> {
		Box::pin(async move { Ok(self.0.read().keypair.clone()) })
	}

	fn save_endpoints(&self, endpoints: DiscoveredEndpoints) -> StoreFuture<'_, ()> {
		Box::pin(async move { Ok(self.update(|snapshot| snapshot.endpoints = Some(endpoints))) })
	}

	fn fetch_endpoints(&self) -> StoreFuture<'_, Option<DiscoveredEndpoints>> {
		Box::pin(async move { Ok(self.0.read().endpoints.clone()) })
	}

	fn save_preferences(&self, preferences: Preferences) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			Ok(self.update(|snapshot| snapshot.preferences = Some(preferences)))
		})
	}

	fn fetch_preferences(&self) -> StoreFuture<'_, Option<Preferences>> {
		Box::pin(async move { Ok(self.0.read().preferences.clone()) })
	}

	fn save_defaults(&self, defaults: MerchantDefaults) -> StoreFuture<'_, ()> {
		Box::pin(async move { Ok(self.update(|snapshot| snapshot.defaults = Some(defaults))) })
	}

	fn fetch_defaults(&self) -> StoreFuture<'_, Option<MerchantDefaults>> {
		Box::pin(async move { Ok(self.0.read().defaults.clone()) })
	}
}
