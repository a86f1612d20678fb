use mockito::Matcher;
use parley_llm::{
    CompletionClient, CompletionRequest, ModelFamily, ProviderClient, ProviderConfig, ProviderError,
    RequestShape, UserTurn,
};
use serde_json::json;

fn config_for(server: &mockito::Server) -> ProviderConfig {
    ProviderConfig::new()
        .with_base_url(server.url())
        .with_attribution("https://parley.example", "Parley")
}

#[tokio::test]
async fn test_wire_contract() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-or-test")
        .match_header("content-type", "application/json")
        .match_header("http-referer", "https://parley.example")
        .match_header("x-title", "Parley")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek/deepseek-r1",
            "stream": false,
            "max_tokens": 4000,
            "reasoning": { "effort": "medium" },
            "messages": [
                { "role": "system", "content": "You are a helpful AI assistant." },
                { "role": "user", "content": "ping" }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"gen-1","choices":[{"index":0,"message":{"role":"assistant","content":"pong"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ProviderClient::new(config_for(&server)).unwrap();
    let request = CompletionRequest::new("deepseek/deepseek-r1", "sk-or-test", UserTurn::text("ping"))
        .with_system_prompt("You are a helpful AI assistant.")
        .with_shape(RequestShape::for_family(ModelFamily::Reasoning));

    let text = client.complete(request).await.unwrap();

    assert_eq!(text, "pong");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_invalid() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"No auth credentials found","code":401}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = ProviderClient::new(config_for(&server)).unwrap();
    let request = CompletionRequest::new("openai/gpt-4o", "sk-bad", UserTurn::text("hi"));

    let err = client.complete(request).await.unwrap_err();

    assert_eq!(err, ProviderError::AuthInvalid);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let config = ProviderConfig::new().with_base_url("http://127.0.0.1:9/api/v1");
    let client = ProviderClient::new(config).unwrap();
    let request = CompletionRequest::new("openai/gpt-4o", "sk-test", UserTurn::text("hi"));

    let err = client.complete(request).await.unwrap_err();

    assert!(matches!(err, ProviderError::Network { .. }));
}
