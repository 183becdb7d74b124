//! RFC 5849 request signing: base strings, HMAC-SHA1, and parameter placement.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use ring::hmac;
// self
use crate::{_prelude::*, auth::{ClientCredentials, TokenSecret}};

const NONCE_LEN: usize = 32;
const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
// RFC 3986 unreserved characters stay literal; everything else is escaped.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// HTTP methods used against the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestMethod {
	/// GET request.
	Get,
	/// POST request with a form body.
	Post,
}
impl RequestMethod {
	/// Returns the uppercase method name used in signature base strings.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestMethod::Get => "GET",
			RequestMethod::Post => "POST",
		}
	}
}
impl Display for RequestMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Where the OAuth protocol parameters (including the signature) are carried.
///
/// The authority expects query placement for configuration/preference reads
/// and form placement for key submission, so both are selectable per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignaturePlacement {
	/// Protocol parameters appended to the request URI query.
	Query,
	/// Protocol parameters carried in the urlencoded form body.
	FormBody,
}

/// Fully signed request ready for the transport layer.
#[derive(Clone, Debug)]
pub struct SignedRequest {
	/// HTTP method to dispatch with.
	pub method: RequestMethod,
	/// Request URL, including any query-placed parameters.
	pub url: Url,
	/// Urlencoded form body pairs; empty for query-placed requests.
	pub form: Vec<(String, String)>,
}

/// Signs outbound authority requests with consumer (and optionally token) secrets.
#[derive(Clone, Debug)]
pub struct RequestSigner<'a> {
	credentials: &'a ClientCredentials,
	token: Option<(&'a str, &'a TokenSecret)>,
}
impl<'a> RequestSigner<'a> {
	/// Creates a signer that authenticates with consumer credentials only,
	/// as used for the request-token leg of the handshake.
	pub fn for_client(credentials: &'a ClientCredentials) -> Self {
		Self { credentials, token: None }
	}

	/// Attaches a token + secret so subsequent requests are token-authenticated.
	pub fn with_token(mut self, token: &'a str, secret: &'a TokenSecret) -> Self {
		self.token = Some((token, secret));

		self
	}

	/// Signs a request, carrying `params` and the protocol parameters in the
	/// chosen placement.
	pub fn sign(
		&self,
		method: RequestMethod,
		url: &Url,
		params: &[(String, String)],
		placement: SignaturePlacement,
	) -> SignedRequest {
		self.sign_with_protocol_params(method, url, params, placement, &mut Vec::new())
	}

	/// Signs a request with additional protocol parameters (e.g.
	/// `oauth_callback`, `oauth_verifier`) merged into the OAuth set.
	pub fn sign_with_protocol_params(
		&self,
		method: RequestMethod,
		url: &Url,
		params: &[(String, String)],
		placement: SignaturePlacement,
		protocol_extra: &mut Vec<(String, String)>,
	) -> SignedRequest {
		let mut oauth_params = self.protocol_params();

		oauth_params.append(protocol_extra);

		let mut all = oauth_params.clone();

		all.extend(params.iter().cloned());
		all.extend(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())));

		let base = signature_base_string(method, url, &all);
		let signature = sign_base_string(
			&base,
			self.credentials.client_secret.expose(),
			self.token.map(|(_, secret)| secret.expose()).unwrap_or(""),
		);

		oauth_params.push(("oauth_signature".into(), signature));

		match placement {
			SignaturePlacement::Query => {
				let mut url = url.clone();

				{
					let mut pairs = url.query_pairs_mut();

					for (key, value) in oauth_params.iter().chain(params) {
						pairs.append_pair(key, value);
					}
				}

				SignedRequest { method, url, form: Vec::new() }
			},
			SignaturePlacement::FormBody => {
				oauth_params.extend(params.iter().cloned());

				SignedRequest { method, url: url.clone(), form: oauth_params }
			},
		}
	}

	fn protocol_params(&self) -> Vec<(String, String)> {
		let mut params = vec![
			("oauth_consumer_key".into(), self.credentials.client_id.clone()),
			("oauth_nonce".into(), random_string(NONCE_LEN)),
			("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
			("oauth_timestamp".into(), OffsetDateTime::now_utc().unix_timestamp().to_string()),
			("oauth_version".into(), OAUTH_VERSION.into()),
		];

		if let Some((token, _)) = self.token {
			params.push(("oauth_token".into(), token.to_owned()));
		}

		params
	}
}

/// Percent-encodes a string with the strict RFC 3986 set OAuth signatures require.
pub fn oauth_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Builds the RFC 5849 signature base string from the full parameter set
/// (protocol + query + body, signature excluded).
pub(crate) fn signature_base_string(
	method: RequestMethod,
	url: &Url,
	params: &[(String, String)],
) -> String {
	let mut encoded: Vec<(String, String)> =
		params.iter().map(|(k, v)| (oauth_encode(k), oauth_encode(v))).collect();

	encoded.sort();

	let normalized =
		encoded.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.as_str(),
		oauth_encode(&base_string_url(url)),
		oauth_encode(&normalized),
	)
}

/// HMAC-SHA1 signs a base string with the `consumer&token` key, base64-encoded.
pub(crate) fn sign_base_string(base: &str, consumer_secret: &str, token_secret: &str) -> String {
	let key_material = format!("{}&{}", oauth_encode(consumer_secret), oauth_encode(token_secret));
	// SHA-1 is mandated by the HMAC-SHA1 signature method of RFC 5849.
	let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key_material.as_bytes());
	let tag = hmac::sign(&key, base.as_bytes());

	STANDARD.encode(tag.as_ref())
}

// Scheme://host[:port]/path with default ports elided, query and fragment dropped.
fn base_string_url(url: &Url) -> String {
	let scheme = url.scheme();
	let host = url.host_str().unwrap_or_default();
	let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();

	format!("{scheme}://{host}{port}{}", url.path())
}

pub(crate) fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> ClientCredentials {
		ClientCredentials::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
	}

	#[test]
	fn encoding_matches_rfc3986_strict_set() {
		assert_eq!(oauth_encode("abcXYZ019-._~"), "abcXYZ019-._~");
		assert_eq!(oauth_encode("a b+c"), "a%20b%2Bc");
		assert_eq!(oauth_encode("ü"), "%C3%BC");
		assert_eq!(oauth_encode("r b/="), "r%20b%2F%3D");
	}

	#[test]
	fn base_string_sorts_and_double_encodes() {
		let url = Url::parse("https://authority.example/oauth/request?b=2&a=1")
			.expect("Base string URL fixture should parse successfully.");
		let params = vec![
			("oauth_consumer_key".to_string(), "key".to_string()),
			("b".to_string(), "2".to_string()),
			("a".to_string(), "1".to_string()),
		];
		let base = signature_base_string(RequestMethod::Post, &url, &params);

		assert_eq!(
			base,
			"POST&https%3A%2F%2Fauthority.example%2Foauth%2Frequest\
			&a%3D1%26b%3D2%26oauth_consumer_key%3Dkey",
		);
	}

	#[test]
	fn base_string_url_drops_default_port_and_query() {
		let url = Url::parse("https://Authority.Example:443/oauth/request?x=1")
			.expect("Port URL fixture should parse successfully.");
		let params = Vec::new();
		let base = signature_base_string(RequestMethod::Get, &url, &params);

		assert_eq!(base, "GET&https%3A%2F%2Fauthority.example%2Foauth%2Frequest&");

		let url = Url::parse("https://authority.example:8443/oauth/request")
			.expect("Non-default port URL fixture should parse successfully.");
		let base = signature_base_string(RequestMethod::Get, &url, &params);

		assert!(base.contains("%3A8443"));
	}

	#[test]
	fn signing_is_deterministic_and_secret_sensitive() {
		let base = "POST&https%3A%2F%2Fauthority.example%2Frequest&a%3D1";
		let first = sign_base_string(base, "consumer", "token");
		let second = sign_base_string(base, "consumer", "token");
		let different_token = sign_base_string(base, "consumer", "other");
		let no_token = sign_base_string(base, "consumer", "");

		assert_eq!(first, second);
		assert_ne!(first, different_token);
		assert_ne!(first, no_token);
		// HMAC-SHA1 tags are 20 bytes, so base64 yields 28 characters.
		assert_eq!(first.len(), 28);
	}

	#[test]
	fn query_placement_carries_protocol_params_in_url() {
		let credentials = credentials();
		let url = Url::parse("https://authority.example/clients/config")
			.expect("Signer URL fixture should parse successfully.");
		let secret = TokenSecret::new("pfkkdhi9sl3r4s00");
		let signer = RequestSigner::for_client(&credentials).with_token("nnch734d00sl2jdk", &secret);
		let signed = signer.sign(RequestMethod::Get, &url, &[], SignaturePlacement::Query);
		let query: Vec<(String, String)> =
			signed.url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();

		assert!(signed.form.is_empty());
		assert!(query.iter().any(|(k, _)| k == "oauth_signature"));
		assert!(query.iter().any(|(k, v)| k == "oauth_token" && v == "nnch734d00sl2jdk"));
		assert!(
			query
				.iter()
				.any(|(k, v)| k == "oauth_nonce" && v.len() == NONCE_LEN),
		);
	}

	#[test]
	fn form_placement_keeps_url_clean_and_merges_params() {
		let credentials = credentials();
		let url = Url::parse("https://authority.example/clients/keys")
			.expect("Signer URL fixture should parse successfully.");
		let secret = TokenSecret::new("token-secret");
		let signer = RequestSigner::for_client(&credentials).with_token("token", &secret);
		let params = vec![("public_key".to_string(), "PEM".to_string())];
		let signed =
			signer.sign(RequestMethod::Post, &url, &params, SignaturePlacement::FormBody);

		assert_eq!(signed.url.query(), None);
		assert!(signed.form.iter().any(|(k, _)| k == "oauth_signature"));
		assert!(signed.form.iter().any(|(k, v)| k == "public_key" && v == "PEM"));
	}

	#[test]
	fn protocol_extras_participate_in_the_signature() {
		let credentials = credentials();
		let url = Url::parse("https://authority.example/oauth/request")
			.expect("Signer URL fixture should parse successfully.");
		let signer = RequestSigner::for_client(&credentials);
		let mut extras = vec![("oauth_callback".to_string(), "oob".to_string())];
		let signed = signer.sign_with_protocol_params(
			RequestMethod::Post,
			&url,
			&[],
			SignaturePlacement::FormBody,
			&mut extras,
		);

		assert!(signed.form.iter().any(|(k, v)| k == "oauth_callback" && v == "oob"));
	}
}
