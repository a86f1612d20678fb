use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Content, Message, RequestShape};

/// Upper bound on provider error text carried into `BadRequest`
const MAX_ERROR_MESSAGE_CHARS: usize = 500;

// ============================================================================
// REQUEST BODY
// ============================================================================

/// `POST /chat/completions` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stream: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The turn being answered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTurn {
    pub text: String,
    pub image: Option<Vec<u8>>,
}

impl UserTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }
}

/// Content for the new user turn under `shape`.
///
/// Images are dropped for models that do not accept them; the turn is
/// still sent as text.
pub fn turn_content(turn: &UserTurn, shape: &RequestShape) -> Content {
    match &turn.image {
        Some(image) if shape.supports_images => Content::text_with_image(turn.text.clone(), image),
        Some(_) => {
            tracing::debug!(family = ?shape.family, "Model does not accept images, sending text only");
            Content::text(turn.text.clone())
        }
        None => Content::text(turn.text.clone()),
    }
}

/// `[system] + context + [new user turn]`, with the shape's parameters
pub fn build_body(
    model: &str,
    shape: &RequestShape,
    system_prompt: &str,
    context: &[Message],
    turn: &UserTurn,
) -> ChatCompletionBody {
    let mut messages = Vec::with_capacity(context.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(context.iter().cloned());
    messages.push(Message::human(turn_content(turn, shape)));

    ChatCompletionBody {
        model: model.to_string(),
        messages,
        max_tokens: shape.max_tokens,
        temperature: shape.temperature,
        top_p: shape.top_p,
        stream: false,
        extra: shape.extra.clone(),
    }
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenRouterChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `choices[0].message.content`, if present and not blank
pub fn parse_completion(body: &str) -> Option<String> {
    let raw: OpenRouterChatResponse = serde_json::from_str(body).ok()?;
    let content = raw.choices.into_iter().next()?.message.content?;
    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}

/// Human-readable reason from an error response body
pub fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        return "bad request".to_string();
    }
    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}
