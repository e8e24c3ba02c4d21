use std::collections::HashMap;
use std::io::Read;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use mockito::{Matcher, Server};
use screenask::domain::{ApiKey, GenerationRequest, LlmError, ProviderKind};
use screenask::infra::config::load_app_config_with;
use screenask::infra::llm::{
    LlmProvider, OllamaProvider, OpenAiCompatibleProvider, create_provider,
};
use serde_json::json;

fn ollama(base_url: String) -> OllamaProvider {
    OllamaProvider::with_config(base_url, "qwen2.5-coder:7b", Duration::from_secs(2))
        .expect("provider should build")
}

fn chat(kind: ProviderKind, base_url: String, api_key: Option<&str>) -> OpenAiCompatibleProvider {
    OpenAiCompatibleProvider::with_config(
        kind,
        api_key.and_then(ApiKey::new),
        base_url,
        "test-model",
        Duration::from_secs(2),
    )
    .expect("provider should build")
}

#[test]
fn ollama_generate_returns_response_field() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .match_header(
            "content-type",
            Matcher::Regex("application/json.*".to_string()),
        )
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen2.5-coder:7b",
            "prompt": "say hello",
            "stream": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"qwen2.5-coder:7b","response":"hello","done":true}"#)
        .create();

    let reply = ollama(server.url()).generate_response("say hello", None);

    mock.assert();
    assert_eq!(reply, "hello");
}

#[test]
fn ollama_generate_sends_system_prompt() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({
            "system": "Answer the following question quickly without any explanation."
        })))
        .with_status(200)
        .with_body(r#"{"response":"4"}"#)
        .create();

    let reply = ollama(server.url()).generate_response(
        "2+2?",
        Some("Answer the following question quickly without any explanation."),
    );

    mock.assert();
    assert_eq!(reply, "4");
}

#[test]
fn ollama_generate_joins_output_list_fragments() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"outputs":[{"content":"a"},{"text":"b"}]}"#)
        .create();

    let reply = ollama(server.url()).generate_response("list", None);

    mock.assert();
    assert_eq!(reply, "a\nb");
}

#[test]
fn ollama_http_error_becomes_diagnostic_text() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(500)
        .with_body("model not loaded")
        .create();

    let provider = ollama(server.url());
    let reply = provider.generate_response("hello", None);

    mock.assert();
    assert!(reply.contains("500"), "reply was: {reply}");
    assert!(reply.contains("model not loaded"), "reply was: {reply}");

    let error = provider
        .try_generate(&GenerationRequest::new("hello"))
        .expect_err("status 500 should be an error");
    assert!(matches!(
        error,
        LlmError::HttpStatus { status: 500, ref body, .. } if body == "model not loaded"
    ));
}

#[test]
fn ollama_unreachable_service_reports_connection_failure() {
    let provider = ollama("http://127.0.0.1:1".to_string());

    let reply = provider.generate_response("hello", None);

    assert!(
        reply.starts_with("Could not connect to the Ollama service at http://127.0.0.1:1/api/generate"),
        "reply was: {reply}"
    );
}

#[test]
fn ollama_silent_service_reports_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let address = listener.local_addr().expect("listener address");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buffer = [0_u8; 1024];
            while matches!(stream.read(&mut buffer), Ok(read) if read > 0) {}
        }
    });
    let provider = OllamaProvider::with_config(
        format!("http://{address}"),
        "qwen2.5-coder:7b",
        Duration::from_secs(1),
    )
    .expect("provider should build");

    let error = provider
        .try_generate(&GenerationRequest::new("hello"))
        .expect_err("silent service should time out");

    assert_eq!(
        error,
        LlmError::Timeout {
            provider: "Ollama".to_string(),
            timeout_secs: 1,
        }
    );
    assert_eq!(error.user_message(), "Ollama did not respond within 1 seconds");
}

#[test]
fn chat_completion_trims_first_choice_content() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_header(
            "content-type",
            Matcher::Regex("application/json.*".to_string()),
        )
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hello"}
            ],
            "temperature": 0.7,
            "max_tokens": 1000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" hi "}}]}"#)
        .create();

    let provider = chat(ProviderKind::OpenAi, format!("{}/v1", server.url()), Some("sk-test"));
    let reply = provider.generate_response("hello", Some("be brief"));

    mock.assert();
    assert_eq!(reply, "hi");
}

#[test]
fn chat_completion_inserts_version_segment_for_bare_host() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"text":"plain text choice"}]}"#)
        .create();

    let provider = chat(ProviderKind::DeepSeek, server.url(), Some("sk-test"));
    let reply = provider.generate_response("hello", None);

    mock.assert();
    assert_eq!(reply, "plain text choice");
}

#[test]
fn chat_completion_without_key_makes_no_request() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create();

    let provider = chat(ProviderKind::Qianwen, server.url(), None);
    let reply = provider.generate_response("hello", None);

    mock.assert();
    assert_eq!(reply, "Qianwen API key is not configured");
}

#[test]
fn chat_completion_http_error_keeps_status_and_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"invalid api key"}}"#)
        .create();

    let provider = chat(ProviderKind::OpenAi, format!("{}/v1", server.url()), Some("sk-bad"));
    let reply = provider.generate_response("hello", None);

    mock.assert();
    assert_eq!(
        reply,
        r#"OpenAI API call failed: 401 - {"error":{"message":"invalid api key"}}"#
    );
}

#[test]
fn factory_builds_configured_chat_provider_from_environment() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/compatible-mode/v1/chat/completions")
        .match_header("authorization", "Bearer sk-dash")
        .match_body(Matcher::PartialJson(json!({"model": "qwen-flash"})))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
        .create();

    let vars: HashMap<&str, String> = HashMap::from([
        ("SCREENASK_AI_PROVIDER", "QW".to_string()),
        (
            "SCREENASK_QIANWEN_API_URL",
            format!("{}/compatible-mode/v1", server.url()),
        ),
        ("DASHSCOPE_API_KEY", "sk-dash".to_string()),
    ]);
    let config = load_app_config_with(|name| Ok(vars.get(name).cloned()))
        .expect("config should load");

    let provider = create_provider(&config).expect("provider should build");
    let reply = provider.generate_response("ping", None);

    mock.assert();
    assert_eq!(provider.provider_id(), "qianwen");
    assert_eq!(reply, "ok");
}

#[test]
fn factory_falls_back_to_ollama_for_unknown_provider() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"response":"local"}"#)
        .create();

    let vars: HashMap<&str, String> = HashMap::from([
        ("SCREENASK_AI_PROVIDER", "gemini".to_string()),
        ("SCREENASK_OLLAMA_BASE_URL", server.url()),
    ]);
    let config = load_app_config_with(|name| Ok(vars.get(name).cloned()))
        .expect("config should load");

    let provider = create_provider(&config).expect("provider should build");
    let reply = provider.generate_response("ping", None);

    mock.assert();
    assert_eq!(provider.provider_id(), "ollama");
    assert_eq!(reply, "local");
}
