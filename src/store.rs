//! Storage contracts and built-in credential store implementations.
//!
//! The store plays the role the option table plays for a hosted merchant
//! site: every value the registration flow needs to survive a request
//! boundary (tokens, the pending handshake, keypair, discovered endpoints,
//! preferences, defaults) goes through this contract. Writes must be durable
//! before the surrounding flow responds to the caller.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Keypair, TokenRecord},
	merchant::{MerchantDefaults, Preferences},
	oauth::PendingHandshake,
	provider::DiscoveredEndpoints,
};

/// Persistence contract future for registrar stores.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by credential stores.
///
/// Absent values are `None`; deletes on absent values are no-ops.
pub trait RegistrarStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the access token record.
	fn save_token(&self, record: TokenRecord) -> StoreFuture<'_, ()>;

	/// Fetches the stored access token record, if present.
	fn fetch_token(&self) -> StoreFuture<'_, Option<TokenRecord>>;

	/// Removes the stored access token record.
	fn delete_token(&self) -> StoreFuture<'_, ()>;

	/// Persists the handshake state awaiting the authorize callback.
	fn save_pending_handshake(&self, pending: PendingHandshake) -> StoreFuture<'_, ()>;

	/// Fetches the pending handshake, if one is awaiting authorization.
	fn fetch_pending_handshake(&self) -> StoreFuture<'_, Option<PendingHandshake>>;

	/// Removes the pending handshake.
	fn delete_pending_handshake(&self) -> StoreFuture<'_, ()>;

	/// Persists or replaces the merchant keypair.
	fn save_keypair(&self, keypair: Keypair) -> StoreFuture<'_, ()>;

	/// Fetches the stored merchant keypair, if present.
	fn fetch_keypair(&self) -> StoreFuture<'_, Option<Keypair>>;

	/// Persists the endpoints discovered from the configuration document.
	fn save_endpoints(&self, endpoints: DiscoveredEndpoints) -> StoreFuture<'_, ()>;

	/// Fetches the discovered endpoints, if present.
	fn fetch_endpoints(&self) -> StoreFuture<'_, Option<DiscoveredEndpoints>>;

	/// Persists the merchant preferences document.
	fn save_preferences(&self, preferences: Preferences) -> StoreFuture<'_, ()>;

	/// Fetches the stored preferences document, if present.
	fn fetch_preferences(&self) -> StoreFuture<'_, Option<Preferences>>;

	/// Persists the merchant defaults.
	fn save_defaults(&self, defaults: MerchantDefaults) -> StoreFuture<'_, ()>;

	/// Fetches the stored merchant defaults, if present.
	fn fetch_defaults(&self) -> StoreFuture<'_, Option<MerchantDefaults>>;
}

/// Error type produced by [`RegistrarStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Full store contents; the unit both built-in backends persist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
	/// Stored access token record.
	pub token: Option<TokenRecord>,
	/// Handshake awaiting its authorize callback.
	pub pending_handshake: Option<PendingHandshake>,
	/// Merchant keypair.
	pub keypair: Option<Keypair>,
	/// Discovered authority endpoints.
	pub endpoints: Option<DiscoveredEndpoints>,
	/// Merchant preferences document.
	pub preferences: Option<Preferences>,
	/// Merchant defaults.
	pub defaults: Option<MerchantDefaults>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn snapshot_serializes_with_absent_fields() {
		let payload = serde_json::to_string(&StoreSnapshot::default())
			.expect("Empty snapshot should serialize to JSON.");
		let parsed: StoreSnapshot =
			serde_json::from_str(&payload).expect("Snapshot should deserialize from JSON.");

		assert_eq!(parsed, StoreSnapshot::default());
	}

	#[test]
	fn store_error_messages_carry_payloads() {
		let err = StoreError::Backend { message: "disk full".into() };

		assert!(err.to_string().contains("disk full"));
	}
}
