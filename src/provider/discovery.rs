//! Authority-issued JSON documents: endpoint discovery and key registration.

// self
use crate::_prelude::*;

/// Service endpoints discovered from the authority's configuration document.
///
/// Unknown fields are carried opaquely so re-serializing the document for the
/// store loses nothing the authority sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredEndpoints {
	/// Public-key registration endpoint.
	#[serde(rename = "keys_url")]
	pub keys: Url,
	/// Merchant preferences endpoint.
	#[serde(rename = "preferences_url")]
	pub preferences: Url,
	/// Remaining authority-provided fields, passed through untouched.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Successful key-registration response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRegistration {
	/// URL the authority assigned to the registered public key.
	#[serde(rename = "public_key_url", alias = "id")]
	pub public_key_url: String,
	/// Remaining authority-provided fields, passed through untouched.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Parses an authority JSON document, keeping the raw body for diagnostics.
pub(crate) fn parse_document<T>(what: &'static str, body: &str) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| Error::ConfigParse {
		what,
		body: body.to_owned(),
		source,
	})
}
