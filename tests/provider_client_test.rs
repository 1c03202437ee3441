// Provider client tests against a local mock of the Kakao endpoints
use base64::{engine::general_purpose, Engine as _};
use kakao_bridge::bridge::{BridgeService, OutcomeCode};
use kakao_bridge::models::BridgeRequest;
use kakao_bridge::oauth::{
    ExchangeError, IdentityError, IdentityFetcher, KakaoClient, TokenExchanger,
    FIXTURE_ACCESS_TOKEN,
};
use kakao_bridge::testing::constants::{TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_REDIRECT_URI};
use kakao_bridge::testing::TestFixtures;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client_for(server: &MockServer) -> KakaoClient {
    let settings = TestFixtures::settings_for_provider(&server.uri());
    KakaoClient::from_settings(&settings.provider).unwrap()
}

fn user_document(id: u64) -> Value {
    json!({
        "id": id,
        "connected_at": "2024-03-01T09:00:00Z",
        "kakao_account": {
            "has_email": true,
            "is_email_verified": true,
            "email": "kakao.user@kakao.com",
            "profile": {
                "nickname": "카카오",
                "profile_image_url": "https://k.kakaocdn.net/dn/profile.jpg"
            }
        }
    })
}

fn decode_segment(segment: &str) -> Value {
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(segment).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_exchange_posts_form_and_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-123"))
        .and(body_string_contains("redirect_uri="))
        .and(body_string_contains(&format!("client_id={TEST_CLIENT_ID}")))
        .and(body_string_contains(&format!("client_secret={TEST_CLIENT_SECRET}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "kakao-access-token",
            "token_type": "bearer",
            "refresh_token": "kakao-refresh-token",
            "expires_in": 21599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server)
        .exchange_code("auth-code-123", TEST_REDIRECT_URI)
        .await
        .unwrap();
    assert_eq!(token, "kakao-access-token");
}

#[tokio::test]
async fn test_exchange_status_classification() {
    let cases = [
        (400_u16, json!({"error": "invalid_grant", "error_description": "authorization code not found"})),
        (401, json!({"error": "invalid_client", "error_description": "Bad client credentials"})),
        (500, json!({"error": "server_error"})),
    ];

    for (status, body) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .exchange_code("code", TEST_REDIRECT_URI)
            .await
            .unwrap_err();

        match status {
            400 => assert!(
                matches!(&err, ExchangeError::InvalidAuthorizationCode(msg) if msg.contains("not found"))
            ),
            401 => assert_eq!(err, ExchangeError::InvalidClientCredentials),
            _ => assert_eq!(
                err,
                ExchangeError::Failed("Request failed with status code 500".to_string())
            ),
        }
    }
}

#[tokio::test]
async fn test_exchange_without_access_token_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .exchange_code("code", TEST_REDIRECT_URI)
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Failed(msg) if msg.contains("No access token")));
}

#[tokio::test]
async fn test_exchange_timeout_is_code_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut settings = TestFixtures::settings_for_provider(&server.uri());
    settings.provider.request_timeout_secs = 1;
    let client = KakaoClient::from_settings(&settings.provider).unwrap();

    let err = client
        .exchange_code("code", TEST_REDIRECT_URI)
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Failed(_)));
}

#[tokio::test]
async fn test_identity_fetch_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .and(header("authorization", "Bearer user-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_document(3_141_592_653)))
        .expect(1)
        .mount(&server)
        .await;

    let identity = client_for(&server)
        .fetch_identity("user-access-token")
        .await
        .unwrap();

    assert_eq!(identity.subject_id, "3141592653");
    assert_eq!(identity.email.as_deref(), Some("kakao.user@kakao.com"));
    assert_eq!(identity.display_name.as_deref(), Some("카카오"));
    assert!(identity.email_verified);
    assert!(identity.has_email);
}

#[tokio::test]
async fn test_identity_status_classification() {
    let cases = [
        (401_u16, json!({"msg": "this access token does not exist", "code": -401})),
        (403, json!({"msg": "insufficient scopes", "code": -402})),
        (500, json!({"msg": "internal error", "code": -1})),
    ];

    for (status, body) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/user/me"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_identity("token").await.unwrap_err();
        match status {
            401 => assert_eq!(err, IdentityError::InvalidToken),
            403 => assert_eq!(err, IdentityError::Forbidden),
            _ => assert_eq!(
                err,
                IdentityError::Failed(
                    "Request failed with status code 500: internal error".to_string()
                )
            ),
        }
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let settings = TestFixtures::settings_for_provider(&format!("http://{address}"));
    let client = KakaoClient::from_settings(&settings.provider).unwrap();

    let err = client.fetch_identity("token").await.unwrap_err();
    assert!(matches!(err, IdentityError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn test_bridge_end_to_end_with_service_account_signer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_document(4_242)))
        .mount(&server)
        .await;

    let settings = TestFixtures::settings_for_provider(&server.uri());
    let service = BridgeService::from_settings(&settings, Arc::new(TestFixtures::signer())).unwrap();

    let request = BridgeRequest {
        provider_access_token: Some(json!("live-token")),
        ..Default::default()
    };
    let credential = service.bridge(&request).await.result.unwrap();

    let parts: Vec<&str> = credential.token.split('.').collect();
    assert_eq!(parts.len(), 3, "custom token should have 3 parts");

    let header = decode_segment(parts[0]);
    assert_eq!(header["alg"], "RS256");

    let payload = decode_segment(parts[1]);
    assert_eq!(payload["uid"], "4242");
    assert_eq!(payload["claims"]["provider"], "kakao");
    assert_eq!(payload["claims"]["provider_subject_id"], "4242");
    assert_eq!(payload["claims"]["email"], "kakao.user@kakao.com");
    assert_eq!(
        payload["iss"],
        "firebase-adminsdk-test@bridge-test.iam.gserviceaccount.com"
    );
}

#[tokio::test]
async fn test_fixture_token_needs_explicit_opt_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": -401})))
        .mount(&server)
        .await;

    let request = BridgeRequest {
        provider_access_token: Some(json!(FIXTURE_ACCESS_TOKEN)),
        ..Default::default()
    };

    // Disabled: the sentinel is just another token and the provider rejects it
    let settings = TestFixtures::settings_for_provider(&server.uri());
    let service = BridgeService::from_settings(&settings, Arc::new(TestFixtures::signer())).unwrap();
    let failure = service.bridge(&request).await.result.unwrap_err();
    assert_eq!(failure.code, OutcomeCode::InvalidKakaoToken);

    // Enabled: resolved locally without reaching the provider
    let mut settings = TestFixtures::settings_for_provider(&server.uri());
    settings.provider.fixture_token_enabled = true;
    let service = BridgeService::from_settings(&settings, Arc::new(TestFixtures::signer())).unwrap();
    let credential = service.bridge(&request).await.result.unwrap();
    assert_eq!(credential.subject_id, "99999999");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the disabled run should reach the provider");
}
