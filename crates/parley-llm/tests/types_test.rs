use parley_llm::{Content, ContentPart, Message, ModelFamily, RequestShape};
use serde_json::json;

#[test]
fn test_content_text_creation() {
    let content = Content::text("Hello, world!");
    assert_eq!(content.as_text(), Some("Hello, world!"));
    assert!(!content.has_image());
}

#[test]
fn test_content_from_string() {
    let content: Content = "Test".into();
    assert_eq!(content.as_text(), Some("Test"));
}

#[test]
fn test_single_text_part_reads_as_text() {
    let content = Content::Parts(vec![ContentPart::text("only text")]);
    assert_eq!(content.as_text(), Some("only text"));
}

#[test]
fn test_image_content_is_not_plain_text() {
    let content = Content::text_with_image("look", &[0x89, b'P', b'N', b'G']);
    assert!(content.has_image());
    assert_eq!(content.as_text(), None);
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("You are helpful").role(), "system");
    assert_eq!(Message::human("Hello").role(), "user");
    assert_eq!(Message::ai("Hi there!").role(), "assistant");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value, json!({"role": "user", "content": "Hello"}));
}

#[test]
fn test_message_serialization_ai() {
    let msg = Message::ai("Response");
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value, json!({"role": "assistant", "content": "Response"}));
}

#[test]
fn test_message_deserialization() {
    let msg: Message = serde_json::from_str(r#"{"role":"user","content":"Test"}"#).unwrap();
    assert_eq!(msg, Message::human("Test"));

    let msg: Message = serde_json::from_str(
        r#"{"role":"user","content":[{"type":"text","text":"hi"},{"type":"image_url","image_url":{"url":"data:image/png;base64,AA=="}}]}"#,
    )
    .unwrap();
    assert!(msg.content().has_image());
}

#[test]
fn test_shape_builders_override_family_defaults() {
    let shape = RequestShape::for_family(ModelFamily::Vision)
        .max_tokens(800)
        .temperature(0.2)
        .top_p(0.5)
        .extra("transforms", json!(["middle-out"]));

    assert_eq!(shape.family, ModelFamily::Vision);
    assert_eq!(shape.max_tokens, 800);
    assert_eq!(shape.temperature, 0.2);
    assert_eq!(shape.top_p, 0.5);
    assert!(shape.supports_images);
    assert_eq!(shape.extra.get("transforms"), Some(&json!(["middle-out"])));
}

#[test]
fn test_default_shape_is_default_family() {
    let shape = RequestShape::default();
    assert_eq!(shape.family, ModelFamily::Default);
    assert_eq!(shape.max_tokens, 1000);
    assert!(!shape.supports_images);
}
