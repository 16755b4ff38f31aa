use std::sync::Arc;

use extensions_bridge::{
    push_channel, CredentialPayload, GeneratePasswordRequest, PageCommand, Reply, Router,
    VaultHandler, VaultRequest,
};
use keyfill_core_types::TabId;
use keyfill_credential_matcher::{CredentialRecord, InMemoryCredentialStore, StoreError};
use keyfill_vault_agent::{context_menu, MenuItem, Settings, StaticSettings, VaultAgent};

fn agent_with(
    records: Vec<CredentialRecord>,
    settings: Settings,
) -> (Arc<VaultAgent>, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::with_records(records));
    let agent = VaultAgent::builder(store.clone(), Arc::new(StaticSettings::new(settings))).build();
    (agent, store)
}

fn example_record() -> CredentialRecord {
    CredentialRecord::new("https://example.com", "u", "s")
}

#[tokio::test]
async fn get_credentials_returns_only_same_origin() {
    let (agent, _) = agent_with(
        vec![
            example_record(),
            CredentialRecord::new("https://evil.example.com", "x", "y"),
        ],
        Settings::default(),
    );

    let found = agent
        .get_credentials("https://example.com/login?x=1")
        .await
        .unwrap();
    assert_eq!(
        found,
        vec![CredentialPayload {
            username: "u".into(),
            password: "s".into(),
            url: "https://example.com".into(),
        }]
    );

    assert!(agent
        .get_credentials("https://evil.example.com")
        .await
        .unwrap()
        .iter()
        .all(|c| c.username == "x"));
    assert!(agent.get_credentials("not a url").await.unwrap().is_empty());
}

#[tokio::test]
async fn check_login_form_reports_presence() {
    let (agent, _) = agent_with(vec![example_record()], Settings::default());
    let router = Router::new(agent);

    let reply = router
        .handle(VaultRequest::CheckLoginForm {
            url: "https://example.com/signin".into(),
        })
        .await;
    assert_eq!(reply, Reply::with_has_credentials(true));

    let reply = router
        .handle(VaultRequest::CheckLoginForm {
            url: "https://other.test".into(),
        })
        .await;
    assert_eq!(reply, Reply::with_has_credentials(false));
}

#[tokio::test]
async fn store_errors_are_surfaced_verbatim() {
    let (agent, store) = agent_with(vec![example_record()], Settings::default());
    store.set_failure(Some(StoreError::Unavailable("vault locked".into())));
    let router = Router::new(agent);

    let reply = router
        .handle(VaultRequest::GetCredentials {
            url: "https://example.com".into(),
        })
        .await;
    assert_eq!(reply, Reply::failure("vault locked"));
}

#[tokio::test]
async fn save_normalises_origin_and_replaces_existing() {
    let (agent, store) = agent_with(vec![example_record()], Settings::default());

    agent
        .save_credentials(CredentialPayload {
            username: "u".into(),
            password: "rotated".into(),
            url: "https://EXAMPLE.com/account/login".into(),
        })
        .await
        .unwrap();

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].origin, "https://example.com");
    assert_eq!(records[0].secret, "rotated");
}

#[tokio::test]
async fn save_replaces_record_seeded_with_a_path() {
    let (agent, store) = agent_with(
        vec![CredentialRecord::new("https://example.com/login", "u", "old")],
        Settings::default(),
    );

    agent
        .save_credentials(CredentialPayload {
            username: "u".into(),
            password: "new".into(),
            url: "https://example.com/account".into(),
        })
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let found = agent.get_credentials("https://example.com").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].password, "new");
}

#[tokio::test]
async fn save_respects_auto_save_and_rejects_bad_urls() {
    let (agent, store) = agent_with(
        vec![],
        Settings {
            auto_save: false,
            ..Settings::default()
        },
    );
    let payload = CredentialPayload {
        username: "u".into(),
        password: "p".into(),
        url: "https://example.com".into(),
    };
    let err = agent.save_credentials(payload.clone()).await.unwrap_err();
    assert_eq!(err.to_string(), "auto-save disabled");
    assert!(store.is_empty());

    let (agent, store) = agent_with(vec![], Settings::default());
    let err = agent
        .save_credentials(CredentialPayload {
            url: "about:blank".into(),
            ..payload
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("malformed origin"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn generate_password_applies_defaults_and_overrides() {
    let (agent, _) = agent_with(vec![], Settings::default());

    let password = agent
        .generate_password(GeneratePasswordRequest::default())
        .await
        .unwrap();
    assert_eq!(password.len(), 16);

    let password = agent
        .generate_password(GeneratePasswordRequest {
            length: Some(32),
            include_numbers: Some(false),
            include_symbols: Some(false),
        })
        .await
        .unwrap();
    assert_eq!(password.len(), 32);
    assert!(password.chars().all(|c| c.is_ascii_alphabetic()));

    let reply = Router::new(agent)
        .handle(VaultRequest::GeneratePassword(GeneratePasswordRequest {
            length: Some(0),
            ..Default::default()
        }))
        .await;
    assert!(!reply.success);
    assert!(reply.error.unwrap().contains("invalid generator policy"));
}

#[tokio::test]
async fn navigation_pushes_detection_only_when_autofill_enabled() {
    let settings = Arc::new(StaticSettings::new(Settings::default()));
    let store = Arc::new(InMemoryCredentialStore::new());
    let agent = VaultAgent::builder(store, settings.clone()).build();
    let (tx, mut rx) = push_channel(4);
    agent.attach_tab(TabId(1), tx);

    assert!(agent.navigation_complete(TabId(1)).await);
    assert_eq!(rx.recv().await, Some(PageCommand::CheckForLoginForm));

    settings.replace(Settings {
        auto_fill: false,
        ..Settings::default()
    });
    assert!(!agent.navigation_complete(TabId(1)).await);
    assert!(rx.try_recv().is_err());

    assert!(!agent.navigation_complete(TabId(2)).await);
}

#[tokio::test]
async fn context_menu_forwards_target_element() {
    let (agent, _) = agent_with(vec![], Settings::default());
    let (tx, mut rx) = push_channel(4);
    agent.attach_tab(TabId(3), tx);

    assert!(
        agent
            .context_menu_clicked(TabId(3), MenuItem::GeneratePassword, Some("pwd".into()))
            .await
    );
    assert_eq!(
        rx.recv().await,
        Some(PageCommand::GeneratePassword {
            target_element_id: Some("pwd".into())
        })
    );

    drop(rx);
    assert!(
        !agent
            .context_menu_clicked(TabId(3), MenuItem::FillCredentials, None)
            .await
    );
}

#[test]
fn context_menu_nests_items_under_root() {
    let menu = context_menu();
    assert_eq!(menu.len(), 3);
    assert!(menu[1..].iter().all(|entry| entry.parent == Some("keyfill")));
}
