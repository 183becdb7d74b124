//! Validated authority descriptors consumed by the registration flows.

// self
use crate::{_prelude::*, auth::AuthorityId};

/// Bootstrap endpoint set supplied by site configuration.
///
/// The keys and preferences endpoints are not part of the descriptor; they
/// are discovered from the configuration document at registration time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityEndpoints {
	/// OAuth request-token endpoint.
	pub request: Url,
	/// OAuth authorize endpoint the resource owner is sent to.
	pub authorize: Url,
	/// OAuth access-token endpoint.
	pub access: Url,
	/// Authority configuration document endpoint.
	pub config: Url,
}

/// Immutable authority descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityDescriptor {
	/// Descriptor identifier.
	pub id: AuthorityId,
	/// Bootstrap endpoint definitions exposed by the authority.
	pub endpoints: AuthorityEndpoints,
}
impl AuthorityDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: AuthorityId) -> AuthorityDescriptorBuilder {
		AuthorityDescriptorBuilder::new(id)
	}

	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), AuthorityDescriptorError> {
		validate_endpoint("request", &self.endpoints.request)?;
		validate_endpoint("authorize", &self.endpoints.authorize)?;
		validate_endpoint("access", &self.endpoints.access)?;
		validate_endpoint("config", &self.endpoints.config)?;

		Ok(())
	}
}

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum AuthorityDescriptorError {
	/// Request-token endpoint is required.
	#[error("Missing request endpoint.")]
	MissingRequestEndpoint,
	/// Authorize endpoint is required.
	#[error("Missing authorize endpoint.")]
	MissingAuthorizeEndpoint,
	/// Access-token endpoint is required.
	#[error("Missing access endpoint.")]
	MissingAccessEndpoint,
	/// Configuration endpoint is required.
	#[error("Missing config endpoint.")]
	MissingConfigEndpoint,
	/// Registration runs over SSL only, so every endpoint must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`AuthorityDescriptor`] values.
#[derive(Debug)]
pub struct AuthorityDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: AuthorityId,
	/// OAuth request-token endpoint.
	pub request_endpoint: Option<Url>,
	/// OAuth authorize endpoint.
	pub authorize_endpoint: Option<Url>,
	/// OAuth access-token endpoint.
	pub access_endpoint: Option<Url>,
	/// Configuration document endpoint.
	pub config_endpoint: Option<Url>,
}
impl AuthorityDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: AuthorityId) -> Self {
		Self {
			id,
			request_endpoint: None,
			authorize_endpoint: None,
			access_endpoint: None,
			config_endpoint: None,
		}
	}

	/// Sets the request-token endpoint.
	pub fn request_endpoint(mut self, url: Url) -> Self {
		self.request_endpoint = Some(url);

		self
	}

	/// Sets the authorize endpoint.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_endpoint(mut self, url: Url) -> Self {
		self.access_endpoint = Some(url);

		self
	}

	/// Sets the configuration document endpoint.
	pub fn config_endpoint(mut self, url: Url) -> Self {
		self.config_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<AuthorityDescriptor, AuthorityDescriptorError> {
		let request =
			self.request_endpoint.ok_or(AuthorityDescriptorError::MissingRequestEndpoint)?;
		let authorize =
			self.authorize_endpoint.ok_or(AuthorityDescriptorError::MissingAuthorizeEndpoint)?;
		let access = self.access_endpoint.ok_or(AuthorityDescriptorError::MissingAccessEndpoint)?;
		let config = self.config_endpoint.ok_or(AuthorityDescriptorError::MissingConfigEndpoint)?;
		let descriptor = AuthorityDescriptor {
			id: self.id,
			endpoints: AuthorityEndpoints { request, authorize, access, config },
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), AuthorityDescriptorError> {
	if url.scheme() != "https" {
		Err(AuthorityDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
