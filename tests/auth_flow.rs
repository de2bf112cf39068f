//! Token exchange against a local stand-in for the accounts service.

mod common;

use aurasync::auth::{challenge_for, AuthState, CredentialBroker, VERIFIER_LEN};
use aurasync::config::Config;
use aurasync::Error;
use common::{Canned, StubServer};

fn broker_for(server: &StubServer) -> CredentialBroker {
    let cfg = Config {
        client_id: "client-123".into(),
        redirect_uri: "http://127.0.0.1:8888/callback".into(),
        accounts_base_url: server.base_url.clone(),
        ..Config::default()
    };
    CredentialBroker::new(cfg, reqwest::Client::new())
}

#[tokio::test]
async fn exchange_binds_code_to_verifier() {
    let server = StubServer::start(vec![Canned::json(
        200,
        r#"{"access_token":"tok-1","token_type":"Bearer","expires_in":3600,"scope":"user-top-read","refresh_token":"r"}"#,
    )]);
    let mut broker = broker_for(&server);

    let url = broker.begin_authorization().expect("authorize url");
    let challenge = url
        .query_pairs()
        .find(|(k, _)| k == "code_challenge")
        .map(|(_, v)| v.into_owned())
        .expect("challenge param");

    let session = broker
        .complete_authorization(Some("code-1"), None)
        .await
        .expect("exchange succeeds");
    assert_eq!(session.access_token(), "tok-1");
    assert!(session.expires_at.is_some());
    assert!(!session.is_expired());
    assert_eq!(broker.state(), AuthState::Authenticated);
    assert!(!broker.has_pending_verifier());

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/api/token");
    assert!(req
        .header("content-type")
        .unwrap_or_default()
        .starts_with("application/x-www-form-urlencoded"));
    assert_eq!(req.form_value("grant_type").as_deref(), Some("authorization_code"));
    assert_eq!(req.form_value("code").as_deref(), Some("code-1"));
    assert_eq!(req.form_value("client_id").as_deref(), Some("client-123"));
    assert!(req.form_value("redirect_uri").is_some());

    let verifier = req.form_value("code_verifier").expect("verifier sent");
    assert_eq!(verifier.len(), VERIFIER_LEN);
    assert_eq!(challenge_for(&verifier), challenge);
}

#[tokio::test]
async fn rejected_exchange_carries_status_and_description() {
    let server = StubServer::start(vec![Canned::json(
        400,
        r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
    )]);
    let mut broker = broker_for(&server);
    broker.begin_authorization().expect("authorize url");

    let err = broker
        .complete_authorization(Some("stale"), None)
        .await
        .expect_err("must fail");
    match &err {
        Error::Auth { status, message } => {
            assert_eq!(*status, Some(400));
            assert!(message.contains("Invalid authorization code"), "{}", message);
        }
        other => panic!("expected auth error, got {:?}", other),
    }
    assert_eq!(broker.state(), AuthState::Unauthenticated);
    assert!(!broker.has_pending_verifier());
    assert!(broker.session().is_none());
}

#[tokio::test]
async fn opaque_error_body_is_reported_as_text() {
    let server = StubServer::start(vec![Canned::text(502, "Bad Gateway")]);
    let mut broker = broker_for(&server);
    broker.begin_authorization().expect("authorize url");

    let err = broker
        .complete_authorization(Some("code"), None)
        .await
        .expect_err("must fail");
    let msg = err.to_string();
    assert!(msg.contains("non-JSON response: Bad Gateway"), "{}", msg);
}

#[tokio::test]
async fn malformed_token_payload_is_an_auth_error() {
    let server = StubServer::start(vec![Canned::json(200, r#"{"token_type":"Bearer"}"#)]);
    let mut broker = broker_for(&server);
    broker.begin_authorization().expect("authorize url");

    let err = broker
        .complete_authorization(Some("code"), None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, Error::Auth { status: Some(200), .. }));
    assert!(err.to_string().contains("malformed token response"));
    assert_eq!(broker.state(), AuthState::Unauthenticated);
}

#[tokio::test]
async fn denied_callback_never_reaches_the_token_endpoint() {
    let server = StubServer::start(Vec::new());
    let mut broker = broker_for(&server);
    broker.begin_authorization().expect("authorize url");

    let err = broker
        .complete_from_url("http://127.0.0.1:8888/callback?error=access_denied")
        .await
        .expect_err("must fail");
    assert!(err.is_auth());
    assert_eq!(broker.state(), AuthState::Unauthenticated);
    assert!(!broker.has_pending_verifier());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn out_of_range_lifetime_fails_without_panicking() {
    let server = StubServer::start(vec![
        Canned::json(200, r#"{"access_token":"tok","expires_in":9223372036854775807}"#),
        Canned::json(200, r#"{"access_token":"tok","expires_in":-5}"#),
    ]);
    let mut broker = broker_for(&server);

    for _ in 0..2 {
        broker.begin_authorization().expect("authorize url");
        let err = broker
            .complete_authorization(Some("code"), None)
            .await
            .expect_err("must fail");
        assert!(matches!(err, Error::Auth { status: Some(200), .. }));
        assert!(err.to_string().contains("expires_in"), "{}", err);
        assert_eq!(broker.state(), AuthState::Unauthenticated);
        assert!(broker.session().is_none());
    }
}
