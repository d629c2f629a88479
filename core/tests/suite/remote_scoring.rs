use std::sync::Arc;
use std::sync::Mutex;

use engine_room_core::ApplicationRecord;
use engine_room_core::Notice;
use engine_room_core::RecordId;
use engine_room_core::Stage;
use engine_room_core::Status;
use engine_room_core::advisory::AdvisoryEngine;
use engine_room_core::advisory::AdvisoryError;
use engine_room_core::advisory::AdvisoryOutcome;
use engine_room_core::advisory::AdvisoryReport;
use engine_room_core::advisory::AdvisoryTiming;
use engine_room_core::advisory::GeminiScorer;
use engine_room_core::advisory::ScoringBackend;
use engine_room_core::advisory::simulate;
use engine_room_core::config::AdvisoryConfig;
use engine_room_core::settings::ScoringCredentials;
use engine_room_core::settings::test_connection;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

const MODEL: &str = "gemini-1.5-flash";

fn credentials() -> ScoringCredentials {
    ScoringCredentials {
        api_key: "test-key".to_string(),
        model: MODEL.to_string(),
    }
}

fn scorer(server: &MockServer) -> GeminiScorer {
    GeminiScorer::with_client(
        reqwest::Client::new(),
        &format!("{}/models", server.uri()),
        credentials(),
    )
}

fn record() -> ApplicationRecord {
    let mut record = ApplicationRecord::new(RecordId(7), "Ada", Stage::Revenue, Status::Review);
    record.business_name = Some("Engines Ltd".to_string());
    record.description = "Analytical engines for hire".to_string();
    record
}

fn generated(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:generateContent")))
        .and(query_param("key", "test-key"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn remote_report_is_parsed_from_fenced_text() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(generated(
            "```json\n{\"score\": 77, \"verdict\": \"Strong Contender\", \"summary\": \"Two sentences.\"}\n```",
        )),
    )
    .await;

    let report = scorer(&server).score(&record()).await.unwrap();

    assert_eq!(
        report,
        AdvisoryReport {
            score: 77,
            verdict: "Strong Contender".to_string(),
            summary: "Two sentences.".to_string(),
        }
    );

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Name: Engines Ltd"));
    assert!(prompt.contains("Stage: revenue"));
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })),
    )
    .await;

    let err = scorer(&server).score(&record()).await.unwrap_err();

    match err {
        AdvisoryError::ApiResponse { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid.");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn error_without_message_uses_generic_text() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(503).set_body_string("upstream down")).await;

    let err = scorer(&server).score(&record()).await.unwrap_err();
    assert_eq!(err.to_string(), "API Request Failed");
}

#[tokio::test]
async fn missing_candidates_is_empty_response() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let err = scorer(&server).score(&record()).await.unwrap_err();
    assert!(matches!(err, AdvisoryError::EmptyResponse));
}

#[tokio::test]
async fn engine_falls_back_to_simulation_on_unparseable_text() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(generated("I think it is great!")),
    )
    .await;
    let engine = AdvisoryEngine::new(
        Some(Arc::new(scorer(&server))),
        AdvisoryTiming::immediate(),
    );
    let notices = Mutex::new(Vec::new());

    let outcome = engine
        .run(
            &record(),
            |n| notices.lock().unwrap().push(n),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    match &outcome {
        AdvisoryOutcome::FellBack { error, report } => {
            assert!(error.starts_with("could not parse report"), "{error}");
            assert_eq!(report, &simulate(&record()));
        }
        other => panic!("expected fallback, got {other:?}"),
    }
    let notices = notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert!(notices[0].message.ends_with(". Switching to Simulation."));
}

#[tokio::test]
async fn engine_reports_remote_success() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(generated(
            r#"{"score": 64, "verdict": "Solid Bet", "summary": "Fine."}"#,
        )),
    )
    .await;
    let engine = AdvisoryEngine::new(
        Some(Arc::new(scorer(&server))),
        AdvisoryTiming::immediate(),
    );
    let notices = Mutex::new(Vec::new());

    let outcome = engine
        .run(
            &record(),
            |n| notices.lock().unwrap().push(n),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.report().score, 64);
    assert_eq!(outcome.source(), "remote");
    assert_eq!(
        *notices.lock().unwrap(),
        vec![Notice::success("Analysis complete")]
    );
}

#[tokio::test]
async fn connection_test_pings_the_configured_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(generated("Pong")))
        .expect(1)
        .mount(&server)
        .await;
    let config = AdvisoryConfig {
        api_base_url: format!("{}/models", server.uri()),
        ..AdvisoryConfig::default()
    };

    let notice = test_connection(&config, "test-key", None, &CancellationToken::new()).await;
    assert_eq!(notice, Notice::success("Connection Successful"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Ping");
}

#[tokio::test]
async fn transport_errors_do_not_reveal_the_api_key() {
    let secret = "SECRET123";
    let scorer = GeminiScorer::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:1/models",
        ScoringCredentials {
            api_key: secret.to_string(),
            model: MODEL.to_string(),
        },
    );
    let engine = AdvisoryEngine::new(Some(Arc::new(scorer)), AdvisoryTiming::immediate());
    let notices = Mutex::new(Vec::new());

    let outcome = engine
        .run(
            &record(),
            |n| notices.lock().unwrap().push(n),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let AdvisoryOutcome::FellBack { error, .. } = &outcome else {
        panic!("expected fallback, got {outcome:?}");
    };
    assert!(!error.contains(secret), "{error}");
    let notices = notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert!(!notices[0].message.contains(secret), "{}", notices[0].message);

    let config = AdvisoryConfig {
        api_base_url: "http://127.0.0.1:1/models".to_string(),
        ..AdvisoryConfig::default()
    };
    let notice = test_connection(&config, secret, None, &CancellationToken::new()).await;
    assert!(notice.is_error());
    assert!(!notice.message.contains(secret), "{}", notice.message);
}
