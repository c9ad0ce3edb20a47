//! End-to-end chat flows against a mock reference API.
//!
//! Runs the real HTTP client and a file-backed history store; only the
//! remote API is simulated.

use std::sync::Arc;

use lorekeeper_chat::{
    ability_query, ChatOrchestrator, HttpReferenceClient, PresenterEvent, QueryDispatcher,
    RecordingPresenter,
};
use lorekeeper_core::config::{ApiSourceConfig, ChatConfig, HttpConfig};
use lorekeeper_core::types::Sender;
use lorekeeper_storage::{Database, HistoryStore, KvStore};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    orch: ChatOrchestrator<HttpReferenceClient>,
    presenter: Arc<RecordingPresenter>,
}

fn harness(server: &MockServer, db_path: &std::path::Path) -> Harness {
    let mut source = ApiSourceConfig::dnd5e();
    source.base_url = format!("{}/api", server.uri());

    let kv = KvStore::new(Arc::new(Database::new(db_path).unwrap()));
    let presenter = Arc::new(RecordingPresenter::new());
    let orch = ChatOrchestrator::new(
        &ChatConfig::default(),
        QueryDispatcher::from_configs([source]).unwrap(),
        HttpReferenceClient::new(&HttpConfig::default()).unwrap(),
        HistoryStore::new(kv, "dnd_chat_history"),
        presenter.clone(),
    );
    Harness { orch, presenter }
}

async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ability-scores": "/api/ability-scores",
            "spells": "/api/spells"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ability_detail_flow() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/ability-scores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [
                {"index": "cha", "name": "CHA", "url": "/api/ability-scores/cha"},
                {"index": "str", "name": "STR", "url": "/api/ability-scores/str"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ability-scores/str"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "index": "str",
            "name": "STR",
            "full_name": "Strength",
            "desc": ["Strength measures bodily power, athletic training, and raw physical force."],
            "skills": [{"index": "athletics", "name": "Athletics"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let h = harness(&server, &dir.path().join("history.db"));
    assert!(h.orch.start().await.unwrap());

    let replies = h.orch.handle_message(&ability_query("str")).await.unwrap();
    assert_eq!(
        replies,
        vec![
            "📋 STR",
            "Full Name: Strength",
            "Description: Strength measures bodily power, athletic training, and raw physical force.",
            "Skills: Athletics",
            "💡 Tip: You can ask about other items too!",
        ]
    );
}

#[tokio::test]
async fn test_spell_search_truncates_and_persists() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    let results: Vec<_> = (1..=8)
        .map(|i| json!({"index": format!("cure-{}", i), "name": format!("Cure Wounds {}", i)}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/spells"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 8, "results": results})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("history.db");
    {
        let h = harness(&server, &db_path);
        h.orch.start().await.unwrap();
        let replies = h.orch.handle_message("cure spells").await.unwrap();
        assert_eq!(replies.len(), 7);
        assert_eq!(replies[0], "Found 8 result(s) in spells:");
        assert_eq!(replies[6], "...and 3 more.");
    }

    // A fresh session on the same database replays the conversation and skips the greeting.
    let h = harness(&server, &db_path);
    h.orch.start().await.unwrap();
    let history = h.orch.history().unwrap();
    assert_eq!(history.len(), 9);
    assert_eq!(history[1].sender, Sender::User);
    assert_eq!(history[1].text, "cure spells");

    let replayed = h
        .presenter
        .events()
        .into_iter()
        .filter(|e| matches!(e, PresenterEvent::Turn { .. }))
        .count();
    assert_eq!(replayed, 9);
}

#[tokio::test]
async fn test_server_error_degrades_then_reconnects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let h = harness(&server, &dir.path().join("history.db"));
    assert!(!h.orch.start().await.unwrap());
    assert_eq!(
        h.orch.handle_message("fireball spell").await.unwrap(),
        vec!["Still loading API data, please wait..."]
    );

    mount_root(&server).await;
    assert!(h.orch.connect().await.unwrap());
    assert!(h.orch.is_ready());
}

#[tokio::test]
async fn test_spell_endpoint_failure_apologizes_once() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/spells"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let h = harness(&server, &dir.path().join("history.db"));
    h.orch.start().await.unwrap();
    let replies = h.orch.handle_message("fireball spell").await.unwrap();
    assert_eq!(
        replies,
        vec!["Sorry, I encountered an error searching the D&D 5e API."]
    );
}
