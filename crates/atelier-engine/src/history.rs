use atelier_contracts::agents::AgentName;
use atelier_contracts::messages::ChatMessage;
use serde_json::{json, Value};

/// Converts the visible message list into Gemini `contents`.
///
/// Only user messages and model-written persona messages are kept. Each user
/// message is its own `user` turn; runs of persona messages collapse into one
/// `model` turn with a text part per message.
pub fn to_gemini_contents(messages: &[ChatMessage]) -> Vec<Value> {
    let mut contents = Vec::new();
    let mut model_parts: Vec<Value> = Vec::new();

    for message in messages {
        if message.sender == AgentName::User {
            if !model_parts.is_empty() {
                contents.push(json!({ "role": "model", "parts": model_parts }));
                model_parts = Vec::new();
            }
            contents.push(json!({
                "role": "user",
                "parts": [{ "text": message.text }],
            }));
        } else if message.sender.is_model_persona() {
            model_parts.push(json!({ "text": history_text(message) }));
        }
    }
    if !model_parts.is_empty() {
        contents.push(json!({ "role": "model", "parts": model_parts }));
    }
    contents
}

/// Text the model sees for one of its own earlier messages.
///
/// Questions and prompts were parsed out of the reply and are not part of
/// `text`, so they are appended again as a numbered list. The model's history
/// therefore carries more than the visible bubble text: an Aura turn with
/// questions goes over the wire as `"{text}\n\n1. ...\n2. ..."`.
pub fn history_text(message: &ChatMessage) -> String {
    let mut text = message.text.clone();
    for items in [message.questions.as_deref(), message.prompts.as_deref()]
        .into_iter()
        .flatten()
    {
        if items.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        let numbered = items
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("{}. {}", idx + 1, item))
            .collect::<Vec<String>>()
            .join("\n");
        text.push_str(&numbered);
    }
    text
}
