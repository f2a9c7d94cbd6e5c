use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::agents::AgentName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender: AgentName,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_generating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, sender: AgentName, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender,
            text: text.into(),
            image_url: None,
            is_generating: false,
            prompts: None,
            questions: None,
        }
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_questions(mut self, questions: Vec<String>) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn with_prompts(mut self, prompts: Vec<String>) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn generating(mut self) -> Self {
        self.is_generating = true;
        self
    }
}

/// Where the two-step creative workflow currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Idle,
    AwaitingRefinement,
}

impl ConversationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingRefinement => "awaiting_refinement",
        }
    }
}

/// Message id source. Ids are `<millis>-<seq>` so two messages created in the
/// same millisecond stay distinct.
#[derive(Debug, Default)]
pub struct MessageIds {
    seq: AtomicU64,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", Utc::now().timestamp_millis(), seq)
    }

    pub fn next_with_suffix(&self, suffix: &str) -> String {
        format!("{}-{}", self.next(), suffix)
    }
}

/// Inline image sent alongside a chat message; `data` is base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: String,
}

impl ImageAttachment {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        let mime = mime_for_path(path).unwrap_or("image/png");
        Ok(Self::from_bytes(mime, &bytes))
    }

    pub fn decoded_len(&self) -> usize {
        BASE64
            .decode(self.data.as_bytes())
            .map(|bytes| bytes.len())
            .unwrap_or(0)
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}
