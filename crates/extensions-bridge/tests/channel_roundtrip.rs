use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use extensions_bridge::{
    channel, BridgeConfig, BridgeError, BridgeEvent, CredentialPayload, GeneratePasswordRequest,
    HandlerError, Router, VaultClient, VaultHandler, VaultRequest,
};
use serde_json::json;
use tokio::time::Instant;

#[derive(Default)]
struct FakeVault {
    saved: Mutex<Vec<String>>,
}

#[async_trait]
impl VaultHandler for FakeVault {
    async fn get_credentials(&self, url: &str) -> Result<Vec<CredentialPayload>, HandlerError> {
        if url.contains("broken") {
            return Err(HandlerError::new("store offline"));
        }
        Ok(vec![CredentialPayload {
            username: "alice".into(),
            password: "pw".into(),
            url: url.into(),
        }])
    }

    async fn save_credentials(&self, credentials: CredentialPayload) -> Result<(), HandlerError> {
        self.saved.lock().unwrap().push(credentials.username);
        Ok(())
    }

    async fn generate_password(
        &self,
        request: GeneratePasswordRequest,
    ) -> Result<String, HandlerError> {
        Ok("x".repeat(request.length.unwrap_or(16)))
    }

    async fn check_login_form(&self, url: &str) -> Result<bool, HandlerError> {
        Ok(url.starts_with("https://known"))
    }
}

fn config() -> BridgeConfig {
    BridgeConfig {
        request_timeout_ms: 200,
        queue_capacity: 8,
    }
}

#[tokio::test]
async fn requests_receive_their_own_replies() {
    let (client, endpoint) = channel(&config());
    let _server = endpoint.serve(Router::new(Arc::new(FakeVault::default())));

    let reply = client
        .request(VaultRequest::CheckLoginForm {
            url: "https://known.test/login".into(),
        })
        .await
        .unwrap();
    assert!(reply.success);
    assert_eq!(reply.has_credentials, Some(true));

    let reply = client
        .request(VaultRequest::GeneratePassword(GeneratePasswordRequest {
            length: Some(24),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(reply.password.unwrap().len(), 24);
    assert_eq!(client.pending_requests(), 0);
}

#[tokio::test]
async fn concurrent_requests_are_correlated() {
    let (client, endpoint) = channel(&config());
    let _server = endpoint.serve(Router::new(Arc::new(FakeVault::default())));

    let (a, b) = tokio::join!(
        client.request(VaultRequest::GetCredentials {
            url: "https://a.test".into()
        }),
        client.request(VaultRequest::GetCredentials {
            url: "https://b.test".into()
        }),
    );
    assert_eq!(a.unwrap().credentials.unwrap()[0].url, "https://a.test");
    assert_eq!(b.unwrap().credentials.unwrap()[0].url, "https://b.test");
}

#[tokio::test]
async fn handler_failures_become_failure_replies() {
    let (client, endpoint) = channel(&config());
    let _server = endpoint.serve(Router::new(Arc::new(FakeVault::default())));

    let reply = client
        .request(VaultRequest::GetCredentials {
            url: "https://broken.test".into(),
        })
        .await
        .unwrap();
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("store offline"));
}

#[tokio::test]
async fn malformed_payload_is_answered_with_failure() {
    let (client, endpoint) = channel(&config());
    let _server = endpoint.serve(Router::new(Arc::new(FakeVault::default())));

    let reply = client
        .call_raw(json!({"action": "getCredentials", "url": 42}))
        .await
        .unwrap();
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("malformed getCredentials request"));
}

#[tokio::test(start_paused = true)]
async fn unknown_actions_get_no_reply_and_time_out() {
    let (client, endpoint) = channel(&config());
    let _server = endpoint.serve(Router::new(Arc::new(FakeVault::default())));
    let mut events = client.subscribe();

    let err = client
        .call_raw(json!({"action": "exportEverything"}))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unanswered { ref action, .. } if action == "exportEverything"));
    assert_eq!(client.pending_requests(), 0);

    let mut saw_unanswered = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, BridgeEvent::Unanswered { .. }) {
            saw_unanswered = true;
        }
    }
    assert!(saw_unanswered);
}

#[tokio::test]
async fn dropped_endpoint_closes_the_channel() {
    let (client, endpoint) = channel(&config());
    drop(endpoint);

    let err = client
        .request(VaultRequest::CheckLoginForm {
            url: "https://known.test".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ChannelClosed));
}

#[tokio::test]
async fn notifications_are_handled_without_pending_slots() {
    let vault = Arc::new(FakeVault::default());
    let (client, endpoint) = channel(&config());
    let _server = endpoint.serve(Router::new(vault.clone()));

    client
        .notify(VaultRequest::SaveCredentials {
            credentials: CredentialPayload {
                username: "bob".into(),
                password: "pw".into(),
                url: "https://a.test".into(),
            },
        })
        .await
        .unwrap();
    assert_eq!(client.pending_requests(), 0);

    for _ in 0..50 {
        if !vault.saved.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(*vault.saved.lock().unwrap(), vec!["bob".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn full_outbound_queue_is_bounded_by_the_timeout() {
    let (client, endpoint) = channel(&BridgeConfig {
        request_timeout_ms: 1_000,
        queue_capacity: 1,
    });
    // Nobody reads requests, but both halves stay open.
    let (_requests, _replies) = endpoint.into_parts();
    let limit = Duration::from_millis(1_000);

    for url in ["https://a.test", "https://b.test"] {
        let started = Instant::now();
        let err = client
            .request(VaultRequest::GetCredentials { url: url.into() })
            .await
            .unwrap_err();
        assert!(
            matches!(err, BridgeError::Unanswered { ref action, timeout_ms, .. }
                if action == "getCredentials" && timeout_ms == 1_000)
        );
        assert!(started.elapsed() <= limit + Duration::from_millis(10));
    }
    assert_eq!(client.pending_requests(), 0);

    let started = Instant::now();
    let err = client
        .notify(VaultRequest::CheckLoginForm {
            url: "https://a.test".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unanswered { ref action, .. } if action == "checkLoginForm"));
    assert!(started.elapsed() <= limit + Duration::from_millis(10));
}

#[tokio::test]
async fn huge_timeouts_still_round_trip() {
    let (client, endpoint) = channel(&BridgeConfig {
        request_timeout_ms: u64::MAX,
        queue_capacity: 1,
    });
    let _server = endpoint.serve(Router::new(Arc::new(FakeVault::default())));

    let reply = client
        .request(VaultRequest::CheckLoginForm {
            url: "https://known.test".into(),
        })
        .await
        .unwrap();
    assert_eq!(reply.has_credentials, Some(true));
}
