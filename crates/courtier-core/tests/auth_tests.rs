use courtier_core::auth::{AuthError, AuthService, LOGIN_ROUTE};
use courtier_core::ApiError;

mod common;

use common::*;

#[tokio::test]
async fn test_login_stores_token() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, LOGIN_ROUTE, None);
    let auth = AuthService::new(t.api.clone());
    assert!(!auth.is_authenticated());

    let token = auth.login("admin", VALID_PASSWORD).await.unwrap();
    assert_eq!(token, VALID_TOKEN);
    assert!(auth.is_authenticated());
    assert_eq!(auth.token().as_deref(), Some(VALID_TOKEN));
    assert_eq!(t.session.token().as_deref(), Some(VALID_TOKEN));

    // The stored token is used by later calls
    t.api.agencies().get_all().await.unwrap();
    assert_eq!(
        backend.recorder.auth_headers(),
        vec![Some(format!("Bearer {}", VALID_TOKEN))]
    );
}

#[tokio::test]
async fn test_logout_clears_token() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, LOGIN_ROUTE, None);
    let auth = AuthService::new(t.api.clone());

    auth.login("admin", VALID_PASSWORD).await.unwrap();
    auth.logout().unwrap();
    assert!(!auth.is_authenticated());
    assert_eq!(auth.token(), None);

    // Idempotent
    auth.logout().unwrap();
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_login_with_bad_password() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, LOGIN_ROUTE, None);
    let auth = AuthService::new(t.api.clone());

    let err = auth.login("admin", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!auth.is_authenticated());
    assert_eq!(t.navigator.history(), vec![LOGIN_ROUTE]);
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, LOGIN_ROUTE, None);
    let auth = AuthService::new(t.api.clone());

    assert!(matches!(
        auth.login("  ", VALID_PASSWORD).await,
        Err(AuthError::MissingCredentials)
    ));
    assert!(matches!(
        auth.login("admin", "").await,
        Err(AuthError::MissingCredentials)
    ));
}

#[tokio::test]
async fn test_login_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let t = test_client(&format!("http://{}/api", addr), LOGIN_ROUTE, None);
    let auth = AuthService::new(t.api.clone());

    let err = auth.login("admin", VALID_PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::Api(ApiError::Network(_))));
    assert!(err.to_string().contains("connexion"));
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, "/clients", Some("expired-token"));

    let err = t.api.clients().get_all().await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(err.to_string().contains("Session expirée"));

    assert!(!t.session.is_authenticated());
    assert_eq!(t.navigator.history(), vec!["/clients", LOGIN_ROUTE]);
}

#[tokio::test]
async fn test_unauthorized_on_login_route_does_not_navigate() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, LOGIN_ROUTE, Some("expired-token"));

    let err = t.api.agencies().get_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!t.session.is_authenticated());
    assert_eq!(t.navigator.history(), vec![LOGIN_ROUTE]);
}

#[tokio::test]
async fn test_unauthorized_delete_clears_session_and_redirects() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, "/clients/1", Some("expired-token"));

    let err = t.api.clients().delete(1).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!t.session.is_authenticated());
    assert_eq!(t.navigator.history(), vec!["/clients/1", LOGIN_ROUTE]);
}

#[tokio::test]
async fn test_rejected_login_keeps_existing_token() {
    let backend = FakeBackend::start().await;
    let t = test_client(&backend.base_url, "/agencies", Some(VALID_TOKEN));
    let auth = AuthService::new(t.api.clone());

    let err = auth.login("admin", "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(t.session.token().as_deref(), Some(VALID_TOKEN));
    assert_eq!(t.navigator.history(), vec!["/agencies"]);
}
