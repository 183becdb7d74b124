//! Simple file-backed [`RegistrarStore`] for lightweight deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Keypair, TokenRecord},
	merchant::{MerchantDefaults, Preferences},
	oauth::PendingHandshake,
	provider::DiscoveredEndpoints,
	store::{RegistrarStore, StoreError, StoreFuture, StoreSnapshot},
};

/// Persists the store snapshot to a JSON file after each mutation.
///
/// Writes go through a temporary file, are fsynced, and then renamed over the
/// snapshot so a crash never leaves a half-written store behind.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<StoreSnapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot =
			if path.exists() { Self::load_snapshot(&path)? } else { StoreSnapshot::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<StoreSnapshot, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(StoreSnapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &StoreSnapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate(&self, apply: impl FnOnce(&mut StoreSnapshot)) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		apply(&mut guard);
		self.persist_locked(&guard)
	}
}
impl RegistrarStore for FileStore {
	fn save_token(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.token = Some(record)) })
	}

	fn fetch_token(&self) -> StoreFuture<'_, Option<TokenRecord>> {
		Box::pin(async move { Ok(self.inner.read().token.clone()) })
	}

	fn delete_token(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.token = None) })
	}

	fn save_pending_handshake(&self, pending: PendingHandshake) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.pending_handshake = Some(pending)) })
	}

	fn fetch_pending_handshake(&self) -> StoreFuture<'_, Option<PendingHandshake>> {
		Box::pin(async move { Ok(self.inner.read().pending_handshake.clone()) })
	}

	fn delete_pending_handshake(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.pending_handshake = None) })
	}

	fn save_keypair(&self, keypair: Keypair) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.keypair = Some(keypair)) })
	}

	fn fetch_keypair(&self) -> StoreFuture<'_, Option<Keypair>> {
		Box::pin(async move { Ok(self.inner.read().keypair.clone()) })
	}

	fn save_endpoints(&self, endpoints: DiscoveredEndpoints) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.endpoints = Some(endpoints)) })
	}

	fn fetch_endpoints(&self) -> StoreFuture<'_, Option<DiscoveredEndpoints>> {
		Box::pin(async move { Ok(self.inner.read().endpoints.clone()) })
	}

	fn save_preferences(&self, preferences: Preferences) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.preferences = Some(preferences)) })
	}

	fn fetch_preferences(&self) -> StoreFuture<'_, Option<Preferences>> {
		Box::pin(async move { Ok(self.inner.read().preferences.clone()) })
	}

	fn save_defaults(&self, defaults: MerchantDefaults) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|snapshot| snapshot.defaults = Some(defaults)) })
	}

	fn fetch_defaults(&self) -> StoreFuture<'_, Option<MerchantDefaults>> {
		Box::pin(async move { Ok(self.inner.read().defaults.clone()) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::TokenRecord;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"payswarm_registrar_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let record = TokenRecord::new("access-token", "access-secret", "registration");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save_token(record.clone()))
			.expect("Failed to save fixture record to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch_token())
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched, record);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn delete_persists_across_reopen() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save_token(TokenRecord::new("t", "s", "registration")))
			.expect("Failed to save fixture record to file store.");
		rt.block_on(store.delete_token()).expect("Failed to delete fixture record.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched =
			rt.block_on(reopened.fetch_token()).expect("Failed to fetch after reopen.");

		assert!(fetched.is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
