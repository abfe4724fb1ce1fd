#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use jsonapi_auth_client::{
	_preludet::*,
	http::StatusCode,
	request::ApiRequest,
	session::{MemorySessionStore, SessionStore, SessionToken, TerminationReason},
};

const PROFILE_PATH: &str = "/api/v1/profile";
const REFRESH_PATH: &str = "/api/v1/auth/refresh";

#[derive(Debug, Deserialize)]
struct Profile {
	id: u64,
}

async fn seed(store: &MemorySessionStore, token: &str) {
	store.set(SessionToken::new(token)).await.expect("Seeding the session store should succeed.");
}

#[tokio::test]
async fn expired_session_is_refreshed_and_replayed() {
	let server = MockServer::start_async().await;
	let (client, store, listener) = build_reqwest_test_client(&server.base_url());

	seed(&store, "A").await;

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer A");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH).header("authorization", "Bearer A");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"B\",\"token_type\":\"bearer\"}");
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer B");
			then.status(200).header("content-type", "application/json").body("{\"id\":1}");
		})
		.await;
	let profile = client
		.fetch_json::<Profile>(PROFILE_PATH)
		.await
		.expect("Request should succeed after a transparent refresh.");

	rejected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;

	assert_eq!(profile.id, 1);
	assert_eq!(store.current().map(|token| token.expose().to_owned()), Some("B".into()));
	assert!(listener.events().is_empty());
	assert_eq!(client.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn failed_refresh_clears_session_and_reports_refresh_error() {
	let server = MockServer::start_async().await;
	let (client, store, listener) = build_reqwest_test_client(&server.base_url());

	seed(&store, "A").await;

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH);
			then.status(401)
				.header("content-type", "application/vnd.api+json")
				.body("{\"errors\":[{\"status\":\"401\",\"title\":\"Session expired\"}]}");
		})
		.await;
	let err = client
		.send(ApiRequest::get(PROFILE_PATH))
		.await
		.expect_err("A rejected refresh must fail the original request.");

	rejected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	let Error::RefreshFailed { source, cleanup } = &err else {
		panic!("Expected a refresh failure, got {err:?}.");
	};
	let refresh_error = source.as_api().expect("Refresh failure should wrap the backend error.");

	assert_eq!(refresh_error.status, StatusCode::UNAUTHORIZED);
	assert_eq!(refresh_error.url.path(), REFRESH_PATH);
	assert!(cleanup.is_none());
	assert!(err.is_session_terminal());
	assert!(store.current().is_none());

	let events = listener.events();

	assert_eq!(events.len(), 1);
	assert_eq!(events[0].reason, TerminationReason::RefreshFailed { status: Some(401) });
	assert_eq!(events[0].login_redirect.path(), "/login");
	assert_eq!(client.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn refresh_endpoint_rejection_is_not_refreshed() {
	let server = MockServer::start_async().await;
	let (client, store, listener) = build_reqwest_test_client(&server.base_url());

	seed(&store, "A").await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH);
			then.status(401);
		})
		.await;
	let err = client
		.send(ApiRequest::post(REFRESH_PATH))
		.await
		.expect_err("A 401 from the refresh endpoint must be returned as-is.");

	refresh.assert_calls_async(1).await;

	assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
	assert!(err.as_api().is_some());
	assert_eq!(store.current().map(|token| token.expose().to_owned()), Some("A".into()));
	assert!(listener.events().is_empty());
	assert_eq!(client.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn replayed_attempt_is_not_refreshed_again() {
	let server = MockServer::start_async().await;
	let (client, store, listener) = build_reqwest_test_client(&server.base_url());

	seed(&store, "A").await;

	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH);
			then.status(200).header("content-type", "application/json").body("{\"access_token\":\"B\"}");
		})
		.await;
	let err = client
		.send(ApiRequest::get(PROFILE_PATH))
		.await
		.expect_err("A replay rejected with 401 must be returned to the caller.");

	profile.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;

	assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
	assert!(!err.is_session_terminal());
	assert_eq!(store.current().map(|token| token.expose().to_owned()), Some("B".into()));
	assert!(listener.events().is_empty());

	let err = client
		.send(ApiRequest::get(PROFILE_PATH).into_retry())
		.await
		.expect_err("Attempts already marked as replays must not refresh.");

	profile.assert_calls_async(3).await;
	refresh.assert_calls_async(1).await;

	assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn concurrent_rejections_share_one_refresh() {
	let server = MockServer::start_async().await;
	let (client, store, _listener) = build_reqwest_test_client(&server.base_url());

	seed(&store, "A").await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer A");
			then.status(401);
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"B\"}")
				.delay(std::time::Duration::from_millis(50));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "Bearer B");
			then.status(200).header("content-type", "application/json").body("{\"id\":7}");
		})
		.await;

	let (first, second, third) = tokio::join!(
		client.fetch_json::<Profile>(PROFILE_PATH),
		client.fetch_json::<Profile>(PROFILE_PATH),
		client.fetch_json::<Profile>(PROFILE_PATH),
	);

	for result in [first, second, third] {
		assert_eq!(result.expect("Every concurrent request should recover.").id, 7);
	}

	refresh.assert_calls_async(1).await;

	assert_eq!(client.refresh_metrics.successes(), 1);
	assert_eq!(store.current().map(|token| token.expose().to_owned()), Some("B".into()));
}

#[tokio::test]
async fn on_demand_refresh_rotates_stored_token() {
	let server = MockServer::start_async().await;
	let (client, store, _listener) = build_reqwest_test_client(&server.base_url());

	seed(&store, "A").await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path(REFRESH_PATH).header("authorization", "Bearer A");
			then.status(200)
				.header("content-type", "application/vnd.api+json")
				.body("{\"data\":{\"type\":\"tokens\",\"attributes\":{\"access_token\":\"C\"}}}");
		})
		.await;
	let token = client.refresh_session().await.expect("On-demand refresh should succeed.");

	refresh.assert_calls_async(1).await;

	assert_eq!(token.expose(), "C");
	assert_eq!(
		client
			.session_token()
			.await
			.expect("Reading the session token should succeed.")
			.map(|token| token.expose().to_owned()),
		Some("C".into())
	);
}
