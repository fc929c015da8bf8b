use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use samvad::error::SamvadError;
use samvad::provider::aipipe::AiPipeProvider;
use samvad::provider::google::GoogleProvider;
use samvad::provider::openai::OpenAiProvider;
use samvad::provider::{ChatProvider, ToolDefinition};
use samvad::settings::LlmSettings;
use samvad::types::Message;

fn llm(model: &str) -> LlmSettings {
    LlmSettings {
        model: model.into(),
        ..LlmSettings::default()
    }
}

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        name: "web_search".into(),
        description: "Search the web".into(),
        parameters: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"],
        }),
    }
}

#[tokio::test]
async fn openai_chat_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "temperature": 0.7,
        })))
        .and(body_string_contains("\"role\":\"user\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "hello from the mock"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key".into(), Some(server.uri()));
    let reply = provider
        .chat(&[Message::user("hi")], &[], &llm("gpt-4o"))
        .await
        .unwrap();

    assert_eq!(reply.content.as_deref(), Some("hello from the mock"));
    assert!(reply.tool_calls.is_empty());
}

#[tokio::test]
async fn openai_chat_sends_tool_definitions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"type\":\"function\""))
        .and(body_string_contains("web_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "function": {"name": "web_search", "arguments": "{\"query\":\"rust\"}"}
                }]
            }}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key".into(), Some(server.uri()));
    let reply = provider
        .chat(&[Message::user("find rust")], &[search_tool()], &llm("gpt-4o"))
        .await
        .unwrap();

    assert_eq!(reply.content, None);
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].id, "call_1");
    assert_eq!(reply.tool_calls[0].arguments["query"], "rust");
}

#[tokio::test]
async fn openai_non_success_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("bad-key".into(), Some(server.uri()));
    let err = provider
        .chat(&[Message::user("hi")], &[], &llm("gpt-4o"))
        .await
        .unwrap_err();

    match err {
        SamvadError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn openai_list_models_filters_and_orders() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "whisper-1"},
                {"id": "gpt-3.5-turbo"},
                {"id": "gpt-4o"},
                {"id": "dall-e-3"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key".into(), Some(server.uri()));
    let models = provider.list_models().await.unwrap();
    assert_eq!(models, vec!["gpt-4o".to_string(), "gpt-3.5-turbo".to_string()]);
}

#[tokio::test]
async fn google_chat_uses_query_key_and_remapped_roles() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "hi"}]},
                {"role": "model", "parts": [{"text": "hello"}]},
                {"role": "user", "parts": [{"text": "again"}]}
            ],
            "systemInstruction": {"parts": [{"text": "be brief"}]},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "short answer"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleProvider::new("g-key".into(), Some(server.uri()));
    let messages = [
        Message::system("be brief"),
        Message::user("hi"),
        Message::assistant("hello"),
        Message::user("again"),
    ];
    let reply = provider
        .chat(&messages, &[], &llm("gemini-1.5-pro"))
        .await
        .unwrap();

    assert_eq!(reply.content.as_deref(), Some("short answer"));
}

#[tokio::test]
async fn google_function_call_becomes_tool_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .and(body_string_contains("functionDeclarations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"functionCall": {"name": "web_search", "args": {"query": "rust"}}}
            ]}}]
        })))
        .mount(&server)
        .await;

    let provider = GoogleProvider::new("g-key".into(), Some(server.uri()));
    let reply = provider
        .chat(&[Message::user("find rust")], &[search_tool()], &llm("gemini-1.5-pro"))
        .await
        .unwrap();

    assert_eq!(reply.content, None);
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].name, "web_search");
    assert_eq!(reply.tool_calls[0].arguments["query"], "rust");
    assert!(reply.tool_calls[0].id.starts_with("call_"));
}

#[tokio::test]
async fn google_list_models_keeps_generate_content_only() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "models/gemini-1.5-pro", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]}
            ]
        })))
        .mount(&server)
        .await;

    let provider = GoogleProvider::new("g-key".into(), Some(server.uri()));
    let models = provider.list_models().await.unwrap();
    assert_eq!(
        models,
        vec!["gemini-1.5-pro".to_string(), "gemini-1.5-flash".to_string()]
    );
}

#[tokio::test]
async fn aipipe_chat_routes_through_openrouter_with_fallback_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openrouter/v1/chat/completions"))
        .and(header("authorization", "Bearer pipe-key"))
        .and(body_partial_json(json!({"model": "openai/gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "proxied"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AiPipeProvider::new("pipe-key".into(), Some(server.uri()));
    // empty model selects the proxy's fallback
    let reply = provider
        .chat(&[Message::user("hi")], &[], &llm(""))
        .await
        .unwrap();

    assert_eq!(reply.content.as_deref(), Some("proxied"));
}

#[tokio::test]
async fn aipipe_list_models_merges_and_dedupes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openrouter/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"id": "openai/gpt-4o-mini"}, {"id": "mistral/large"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openai/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "gpt-4o"}]
        })))
        .mount(&server)
        .await;

    let provider = AiPipeProvider::new("pipe-key".into(), Some(server.uri()));
    let models = provider.list_models().await.unwrap();

    assert_eq!(models[0], "openai/gpt-4o-mini");
    assert_eq!(models[1], "mistral/large");
    assert_eq!(models[2], "gpt-4o");
    // curated fallback pads the tail, already-seen ids are not repeated
    assert!(models.contains(&"openai/gpt-3.5-turbo".to_string()));
    assert_eq!(
        models.iter().filter(|m| *m == "openai/gpt-4o-mini").count(),
        1
    );
}

#[tokio::test]
async fn aipipe_list_models_survives_unreachable_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/openrouter/v1/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openai/v1/models"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = AiPipeProvider::new("pipe-key".into(), Some(server.uri()));
    let models = provider.list_models().await.unwrap();
    // only the curated fallback remains
    assert_eq!(models.len(), 5);
    assert_eq!(models[0], "openai/gpt-4o-mini");
}

#[tokio::test]
async fn tool_results_round_trip_on_the_openai_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"role\":\"tool\""))
        .and(body_string_contains("\"tool_call_id\":\"call_1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "used the result"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key".into(), Some(server.uri()));
    let messages = [
        Message::user("search"),
        Message::assistant_tool_calls(vec![samvad::types::ToolCallRequest {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: json!({"query": "rust"}),
        }]),
        Message::tool_result("call_1", "web_search", json!({"status": "ok"})),
    ];
    let reply = provider
        .chat(&messages, &[], &llm("gpt-4o"))
        .await
        .unwrap();

    assert_eq!(reply.content.as_deref(), Some("used the result"));
}
