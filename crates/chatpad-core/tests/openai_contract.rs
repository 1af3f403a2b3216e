use chatpad_core::{ChatMessage, CompletionGateway, GatewayError, OpenAIClient, RequestParameters};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAIClient {
    OpenAIClient::with_options("test-key", "gpt-3.5-turbo", &server.uri(), None)
}

fn ok_body(content: &str, total_tokens: u64) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 8, "completion_tokens": 4, "total_tokens": total_tokens}
    })
}

#[tokio::test]
async fn test_request_carries_messages_and_sampling_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "Be brief"},
                {"role": "user", "content": "Hello"}
            ],
            "temperature": 0.5,
            "max_tokens": 200
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Hi there", 12)))
        .expect(1)
        .mount(&server)
        .await;

    let params = RequestParameters { temperature: 0.5, max_tokens: 200, context_length: 2 };
    let messages = vec![ChatMessage::system("Be brief"), ChatMessage::user("Hello")];
    let completion = client(&server).complete(&messages, &params).await.unwrap();

    assert_eq!(completion.content, "Hi there");
    assert_eq!(completion.usage_tokens, 12);
}

#[tokio::test]
async fn test_missing_usage_counts_as_zero() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let completion = client(&server)
        .complete(&[ChatMessage::user("hi")], &RequestParameters::default())
        .await
        .unwrap();
    assert_eq!(completion.usage_tokens, 0);
}

#[tokio::test]
async fn test_auth_failure_maps_to_status_error_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&[ChatMessage::user("hi")], &RequestParameters::default())
        .await
        .unwrap_err();

    match &err {
        GatewayError::Status { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("Incorrect API key provided"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.to_string().starts_with("API error 401"));
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .complete(&[ChatMessage::user("hi")], &RequestParameters::default())
        .await;
    assert!(matches!(result, Err(GatewayError::Status { status: 429, .. })));
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client(&server)
        .complete(&[ChatMessage::user("hi")], &RequestParameters::default())
        .await;
    assert!(matches!(result, Err(GatewayError::Malformed(_))));
}

#[tokio::test]
async fn test_empty_choices_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let result = client(&server)
        .complete(&[ChatMessage::user("hi")], &RequestParameters::default())
        .await;
    assert!(matches!(result, Err(GatewayError::Malformed(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = OpenAIClient::with_options("k", "gpt-3.5-turbo", &uri, None);
    let result = client
        .complete(&[ChatMessage::user("hi")], &RequestParameters::default())
        .await;
    assert!(matches!(result, Err(GatewayError::Transport(_))));
}

#[tokio::test]
async fn test_complete_text_sends_single_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "rendered prompt"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("reply", 3)))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client(&server)
        .complete_text("rendered prompt", &RequestParameters::default())
        .await
        .unwrap();
    assert_eq!(completion.content, "reply");
}
