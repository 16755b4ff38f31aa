use std::io::Write;

use keyfill_cli::fixtures::{read_page, read_records};
use keyfill_cli::{run_simulation, AppConfig, PromptChoice, Scenario};
use keyfill_core_types::{ElementId, FormId};
use keyfill_credential_matcher::CredentialRecord;
use keyfill_form_detector::{DocumentFixture, FieldFixture, FormFixture};
use keyfill_page_agent::PageState;

fn login_page() -> DocumentFixture {
    DocumentFixture {
        url: "https://example.com/login".to_string(),
        forms: vec![FormFixture::new(
            "login",
            vec![
                FieldFixture::input("email", "user_email").with_handle("email"),
                FieldFixture::input("password", "pwd").with_handle("pwd"),
            ],
        )],
        focused: None,
    }
}

fn scenario(prompt: PromptChoice) -> Scenario {
    Scenario {
        page: login_page(),
        records: vec![CredentialRecord::new(
            "https://example.com",
            "a@b.com",
            "hunter2",
        )],
        prompt,
        ..Scenario::default()
    }
}

#[tokio::test]
async fn accepted_prompt_fills_the_login_form() {
    let report = run_simulation(&AppConfig::default(), scenario(PromptChoice::Accept))
        .await
        .unwrap();

    assert_eq!(report.final_state, PageState::Filled);
    assert!(report.prompt_shown);
    let fill = report.fill.expect("fill summary");
    assert_eq!(fill.form, FormId::new("login"));
    assert!(fill.outcome.username_filled && fill.outcome.password_filled);
    assert_eq!(report.states.first(), Some(&PageState::Detecting));
}

#[tokio::test]
async fn dismissed_prompt_leaves_the_form_alone() {
    let report = run_simulation(&AppConfig::default(), scenario(PromptChoice::Dismiss))
        .await
        .unwrap();
    assert_eq!(report.final_state, PageState::Dismissed);
    assert!(report.fill.is_none());
}

#[tokio::test(start_paused = true)]
async fn ignored_prompt_times_out() {
    let report = run_simulation(&AppConfig::default(), scenario(PromptChoice::Ignore))
        .await
        .unwrap();
    assert_eq!(report.final_state, PageState::TimedOut);
    assert!(report.fill.is_none());
}

#[tokio::test]
async fn disabled_autofill_skips_detection() {
    let mut config = AppConfig::default();
    config.settings.auto_fill = false;
    let report = run_simulation(&config, scenario(PromptChoice::Accept))
        .await
        .unwrap();
    assert_eq!(report.final_state, PageState::Idle);
    assert!(report.states.is_empty());
    assert!(!report.prompt_shown);
}

#[tokio::test]
async fn submitted_login_is_saved_when_auto_save_is_on() {
    let mut page = login_page();
    page.forms[0].fields[0].value = "new@b.com".to_string();
    page.forms[0].fields[1].value = "s3cret".to_string();
    let base = Scenario {
        page,
        records: vec![CredentialRecord::new(
            "https://example.com",
            "a@b.com",
            "hunter2",
        )],
        prompt: PromptChoice::Dismiss,
        generate: false,
        submit: Some("login".to_string()),
    };

    let report = run_simulation(&AppConfig::default(), base.clone())
        .await
        .unwrap();
    assert!(report.captured);
    assert_eq!(report.stored_records, 2);

    let mut config = AppConfig::default();
    config.settings.auto_save = false;
    let report = run_simulation(&config, base).await.unwrap();
    assert!(report.captured);
    assert_eq!(report.stored_records, 1);
}

#[tokio::test]
async fn generated_password_goes_to_focused_field() {
    let mut page = login_page();
    page.focused = Some("pwd".to_string());
    let report = run_simulation(
        &AppConfig::default(),
        Scenario {
            page,
            generate: true,
            ..Scenario::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(report.final_state, PageState::NoCredentials);
    assert_eq!(report.generated, Some(ElementId::new("pwd")));
}

#[tokio::test]
async fn unknown_submit_form_is_an_error() {
    let mut scenario = scenario(PromptChoice::Dismiss);
    scenario.submit = Some("missing".to_string());
    let err = run_simulation(&AppConfig::default(), scenario)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn fixtures_load_from_json_and_yaml() {
    let dir = tempfile::tempdir().unwrap();

    let page_path = dir.path().join("page.json");
    let mut page = std::fs::File::create(&page_path).unwrap();
    write!(
        page,
        r#"{{"url": "https://example.com/", "forms": [{{"id": "login", "fields": [
            {{"type": "text", "name": "username"}},
            {{"type": "password", "name": "password"}}
        ]}}]}}"#
    )
    .unwrap();

    let store_path = dir.path().join("store.yaml");
    std::fs::write(
        &store_path,
        "- origin: https://example.com\n  username: u\n  secret: s\n",
    )
    .unwrap();

    let page = read_page(&page_path).await.unwrap();
    assert_eq!(page.forms.len(), 1);
    assert_eq!(page.forms[0].fields[1].input_type, "password");

    let records = read_records(&store_path).await.unwrap();
    assert_eq!(
        records,
        vec![CredentialRecord::new("https://example.com", "u", "s")]
    );
}
