// crates.io
use httpmock::prelude::*;
// self
use payswarm_registrar::{
	_preludet::*,
	auth::AuthorityId,
	oauth::CallbackQuery,
	provider::AuthorityDescriptor,
	store::RegistrarStore,
};

const CLIENT_ID: &str = "merchant-site";
const CLIENT_SECRET: &str = "merchant-secret";

fn build_descriptor(server: &MockServer) -> AuthorityDescriptor {
	let authority_id = AuthorityId::new("mock-authority")
		.expect("Authority identifier should be valid for handshake tests.");

	AuthorityDescriptor::builder(authority_id)
		.request_endpoint(
			Url::parse(&server.url("/oauth/request"))
				.expect("Mock request endpoint should parse successfully."),
		)
		.authorize_endpoint(
			Url::parse(&server.url("/oauth/authorize"))
				.expect("Mock authorize endpoint should parse successfully."),
		)
		.access_endpoint(
			Url::parse(&server.url("/oauth/access"))
				.expect("Mock access endpoint should parse successfully."),
		)
		.config_endpoint(
			Url::parse(&server.url("/clients/config"))
				.expect("Mock config endpoint should parse successfully."),
		)
		.build()
		.expect("Authority descriptor should build successfully.")
}

#[tokio::test]
async fn start_handshake_persists_pending_state() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (registrar, store) = build_reqwest_test_registrar(descriptor, CLIENT_ID, CLIENT_SECRET);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token&oauth_token_secret=req-secret");
		})
		.await;
	let session = registrar
		.start_handshake("registration", None)
		.await
		.expect("Starting the handshake should succeed.");

	assert_eq!(session.pending.temporary.token, "req-token");
	assert!(session.authorize_url.as_str().contains("oauth_token=req-token"));

	let pending = store
		.fetch_pending_handshake()
		.await
		.expect("Fetching the pending handshake should succeed.")
		.expect("Pending handshake should be persisted across the redirect.");

	assert_eq!(pending, session.pending);

	mock.assert_async().await;
}

#[tokio::test]
async fn complete_handshake_exchanges_and_persists_the_token() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (registrar, store) = build_reqwest_test_registrar(descriptor, CLIENT_ID, CLIENT_SECRET);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token&oauth_token_secret=req-secret");
		})
		.await;

	let access_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=acc-token&oauth_token_secret=acc-secret");
		})
		.await;

	registrar
		.start_handshake("registration", None)
		.await
		.expect("Starting the handshake should succeed.");

	let callback = CallbackQuery {
		token: "req-token".into(),
		verifier: Some("verifier-1".into()),
		denied: false,
	};
	let record = registrar
		.complete_handshake(&callback)
		.await
		.expect("Completing the handshake should succeed.");

	assert_eq!(record.token, "acc-token");
	assert_eq!(record.scope, "registration");

	let stored = store
		.fetch_token()
		.await
		.expect("Fetching the stored token should succeed.")
		.expect("Access token should be persisted.");

	assert_eq!(stored, record);
	assert!(
		store
			.fetch_pending_handshake()
			.await
			.expect("Fetching the pending handshake should succeed.")
			.is_none(),
		"Pending state should be cleared once the handshake completes.",
	);

	access_mock.assert_async().await;
}

#[tokio::test]
async fn denied_callback_resolves_to_denied_and_burns_the_request_token() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (registrar, store) = build_reqwest_test_registrar(descriptor, CLIENT_ID, CLIENT_SECRET);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token&oauth_token_secret=req-secret");
		})
		.await;

	registrar
		.start_handshake("registration", None)
		.await
		.expect("Starting the handshake should succeed.");

	let callback = CallbackQuery { token: "req-token".into(), verifier: None, denied: true };
	let err = registrar
		.complete_handshake(&callback)
		.await
		.expect_err("Denied callbacks should not produce a token.");

	assert!(matches!(err, Error::Denied));
	assert!(
		store
			.fetch_pending_handshake()
			.await
			.expect("Fetching the pending handshake should succeed.")
			.is_none(),
		"A denied handshake should not stay pending.",
	);
}

#[tokio::test]
async fn acquire_token_runs_the_full_handshake() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (registrar, _store) = build_reqwest_test_registrar(descriptor, CLIENT_ID, CLIENT_SECRET);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=req-token&oauth_token_secret=req-secret");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access");
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("oauth_token=acc-token&oauth_token_secret=acc-secret");
		})
		.await;

	let driver = AutoApproveDriver::default();
	let record = registrar
		.acquire_token(&driver, "registration", None)
		.await
		.expect("Driver-backed handshake should succeed.");

	assert_eq!(record.token, "acc-token");
	assert_eq!(driver.authorizations(), 1);
}

#[tokio::test]
async fn rejected_request_token_surfaces_the_authority_body() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server);
	let (registrar, _store) = build_reqwest_test_registrar(descriptor, CLIENT_ID, CLIENT_SECRET);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"type\":\"payswarm.website.InvalidClient\"}");
		})
		.await;

	let err = registrar
		.start_handshake("registration", None)
		.await
		.expect_err("Rejected request tokens should fail the handshake.");

	assert!(matches!(err, Error::Auth { .. }));
	assert_eq!(err.authority_body(), Some("{\"type\":\"payswarm.website.InvalidClient\"}"));
}
