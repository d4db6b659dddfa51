mod common;

use std::time::Duration;

use common::{file_backed_client, setup_test_logging, test_client};
use serde_json::{json, Value};
use tablefetch::domain::models::Credentials;
use tablefetch::domain::ports::SessionStore;
use tablefetch::infrastructure::api::{ApiError, ApiRequest};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFRESH: &str = "/api/auth/refresh-token";

#[tokio::test]
async fn test_bearer_token_attached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/roles"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"roles": ["admin"]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("tok-1"));
    let body: Value = t.client.get_json("/api/roles", None).await.unwrap();

    assert_eq!(body["roles"][0], "admin");
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), None);
    let _: Value = t.client.get_json("/api/public", None).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries() {
    setup_test_logging();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/paginate"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users/paginate"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"records": [], "info": {"total": 0, "pages": 0}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("stale"));
    let body: Value = t.client.get_json("/api/users/paginate", None).await.unwrap();

    assert_eq!(body["info"]["total"], 0);
    let session = t.store.snapshot().await;
    assert_eq!(session.access_token.as_deref(), Some("fresh"));
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_refresh_request_carries_no_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("stale"));
    let _: Value = t.client.get_json("/api/me", None).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == REFRESH)
        .expect("refresh was called");
    assert!(!refresh.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_second_401_after_refresh_is_final() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/locked"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Nope"})))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("stale"));
    let err = t
        .client
        .get_json::<Value>("/api/locked", None)
        .await
        .unwrap_err();

    match err {
        ApiError::Unauthorized(message) => assert_eq!(message, "Nope"),
        other => panic!("Expected Unauthorized, got {other:?}"),
    }
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_notifies_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Refresh token expired"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("stale"));
    let results = futures::future::join_all(
        ["/api/users", "/api/roles", "/api/stats"]
            .into_iter()
            .map(|p| t.client.get_json::<Value>(p, None)),
    )
    .await;

    for result in results {
        assert!(matches!(result, Err(ApiError::SessionExpired)));
    }
    assert!(!t.store.snapshot().await.is_authenticated());
    assert_eq!(t.notifier.count(), 1);
}

#[tokio::test]
async fn test_unauthenticated_401_propagates_without_notification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), None);
    let err = t
        .client
        .get_json::<Value>("/api/users", None)
        .await
        .unwrap_err();

    match err {
        ApiError::Unauthorized(message) => assert_eq!(message, "Unauthenticated."),
        other => panic!("Expected Unauthorized, got {other:?}"),
    }
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(5)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("stale"));
    let results = futures::future::join_all(
        (0..5).map(|i| {
            let client = t.client.clone();
            async move { client.get_json::<Value>(&format!("/api/items/{i}"), None).await }
        }),
    )
    .await;

    for result in results {
        assert_eq!(result.unwrap()["ok"], true);
    }
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_validation_message_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "The email has already been taken."})),
        )
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("tok"));
    let request = ApiRequest::post("/api/users")
        .json(&json!({"email": "ada@example.com"}))
        .unwrap();
    let err = t.client.send(request).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation { .. }));
    assert_eq!(err.to_string(), "The email has already been taken.");
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/flaky"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("tok"));
    let err = t
        .client
        .get_json::<Value>("/api/flaky", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ServerError(status, _) if status.as_u16() == 500));
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("tok"));
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = t
        .client
        .get_json::<Value>("/api/slow", Some(token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_login_stores_token_and_logout_clears_it() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), None);
    let session = t
        .client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert!(session.is_authenticated());

    let me: Value = t.client.get_json("/api/me", None).await.unwrap();
    assert_eq!(me["id"], 1);

    let session = t.client.logout().await;
    assert!(!session.is_authenticated());
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_login_with_bad_credentials_does_not_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), None);
    let err = t
        .client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials"));
    assert!(!t.store.snapshot().await.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_session_even_when_backend_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let t = test_client(&mock_server.uri(), Some("tok"));
    let session = t.client.logout().await;

    assert!(!session.is_authenticated());
    assert!(!t.store.snapshot().await.is_authenticated());
    assert_eq!(t.notifier.count(), 0);
}

#[tokio::test]
async fn test_refresh_cookie_survives_into_next_process() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let session_path = dir.path().join("session.json");

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=r1; Path=/; HttpOnly")
                .set_body_json(json!({"access_token": "expired"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(header("cookie", "refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    {
        let (client, _store) = file_backed_client(&mock_server.uri(), &session_path).await;
        client
            .login(&Credentials {
                email: "ada@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
    }

    // A new client shares nothing in memory with the first one.
    let (client, store) = file_backed_client(&mock_server.uri(), &session_path).await;
    let body: Value = client.get_json("/api/users", None).await.unwrap();

    assert_eq!(body["ok"], true);
    assert_eq!(store.snapshot().await.access_token.as_deref(), Some("fresh"));
}
