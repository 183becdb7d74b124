//! Registers merchant websites with a PaySwarm authority—three-legged OAuth 1.0a,
//! keypair registration, and preference sync in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod merchant;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod store;
#[cfg(feature = "reqwest")]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; available whenever the default
	//! `reqwest` transport is enabled so `cargo test` needs no extra feature flags.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		auth::ClientCredentials,
		flows::{AuthorizationDriver, DriverFuture, Registrar, ReqwestRegistrar},
		http::ReqwestHttpClient,
		oauth::CallbackQuery,
		provider::AuthorityDescriptor,
		store::MemoryStore,
	};

	/// Registrar type alias used by reqwest-backed integration tests.
	pub type ReqwestTestRegistrar = ReqwestRegistrar;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Registrar`] backed by an in-memory store and the reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_registrar(
		descriptor: AuthorityDescriptor,
		client_id: &str,
		client_secret: &str,
	) -> (ReqwestTestRegistrar, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn crate::store::RegistrarStore> = store_backend.clone();
		let credentials = ClientCredentials::new(client_id, client_secret);
		let registrar = Registrar::with_http_client(
			store,
			descriptor,
			credentials,
			test_reqwest_http_client(),
		);

		(registrar, store_backend)
	}

	/// Driver that approves every authorize request with a fixed verifier.
	#[derive(Debug, Default)]
	pub struct AutoApproveDriver {
		authorizations: AtomicUsize,
	}
	impl AutoApproveDriver {
		/// Verifier value the driver returns on approval.
		pub const VERIFIER: &str = "test-verifier";

		/// Number of authorize requests the driver has approved.
		pub fn authorizations(&self) -> usize {
			self.authorizations.load(Ordering::SeqCst)
		}
	}
	impl AuthorizationDriver for AutoApproveDriver {
		fn authorize(&self, authorize_url: Url) -> DriverFuture<'_> {
			self.authorizations.fetch_add(1, Ordering::SeqCst);

			Box::pin(async move {
				let mut callback = CallbackQuery::from_url(&authorize_url);

				callback.verifier = Some(Self::VERIFIER.into());

				Ok(callback)
			})
		}
	}

	/// Driver that denies every authorize request.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct DenyDriver;
	impl AuthorizationDriver for DenyDriver {
		fn authorize(&self, authorize_url: Url) -> DriverFuture<'_> {
			Box::pin(async move {
				let mut callback = CallbackQuery::from_url(&authorize_url);

				callback.denied = true;

				Ok(callback)
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
