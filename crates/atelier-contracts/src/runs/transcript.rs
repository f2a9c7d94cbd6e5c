use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::messages::{ChatMessage, ConversationPhase};

/// On-disk record of a chat session, saved as `transcript.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub path: PathBuf,
    pub schema_version: u64,
    pub session_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub phase: ConversationPhase,
    pub messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema_version: 1,
            session_id: Uuid::new_v4().to_string(),
            created_at: now_utc_iso(),
            updated_at: None,
            phase: ConversationPhase::Idle,
            messages: Vec::new(),
        }
    }

    /// Reads a saved transcript. Missing or malformed fields fall back to the
    /// values of a fresh transcript, and unreadable messages are dropped.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut transcript = Self::new(path.clone());
        let payload = read_json(&path).unwrap_or(Value::Object(Map::new()));
        let Some(obj) = payload.as_object() else {
            return transcript;
        };

        transcript.schema_version = obj
            .get("schema_version")
            .and_then(Value::as_u64)
            .unwrap_or(transcript.schema_version);
        transcript.session_id = obj
            .get("session_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(transcript.session_id);
        transcript.created_at = obj
            .get("created_at")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(transcript.created_at);
        transcript.updated_at = obj
            .get("updated_at")
            .and_then(Value::as_str)
            .map(str::to_string);
        transcript.phase = obj
            .get("phase")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        if let Some(messages) = obj.get("messages").and_then(Value::as_array) {
            for item in messages {
                if let Ok(parsed) = serde_json::from_value::<ChatMessage>(item.clone()) {
                    transcript.messages.push(parsed);
                }
            }
        }
        transcript
    }

    pub fn replace_state(&mut self, messages: &[ChatMessage], phase: ConversationPhase) {
        self.messages = messages.to_vec();
        self.phase = phase;
        self.updated_at = Some(now_utc_iso());
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let mut payload = Map::new();
        payload.insert(
            "schema_version".to_string(),
            Value::Number(self.schema_version.into()),
        );
        payload.insert(
            "session_id".to_string(),
            Value::String(self.session_id.clone()),
        );
        payload.insert(
            "created_at".to_string(),
            Value::String(self.created_at.clone()),
        );
        payload.insert(
            "updated_at".to_string(),
            self.updated_at
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        payload.insert("phase".to_string(), serde_json::to_value(self.phase)?);
        payload.insert(
            "messages".to_string(),
            Value::Array(
                self.messages
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<Value>, _>>()?,
            ),
        );

        write_json(&self.path, Value::Object(payload))
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json(path: &Path, payload: Value) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Transcript;
    use crate::agents::AgentName;
    use crate::messages::{ChatMessage, ConversationPhase};

    #[test]
    fn transcript_roundtrip_keeps_messages_and_phase() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("transcript.json");
        let mut transcript = Transcript::new(&path);
        let messages = vec![
            ChatMessage::new("1", AgentName::User, "hello").with_image_url("board.png"),
            ChatMessage::new("2", AgentName::Aura, "Warm tones.")
                .with_questions(vec!["For print?".to_string()]),
        ];
        transcript.replace_state(&messages, ConversationPhase::AwaitingRefinement);
        transcript.save()?;

        let loaded = Transcript::load(&path);
        assert_eq!(loaded.session_id, transcript.session_id);
        assert_eq!(loaded.phase, ConversationPhase::AwaitingRefinement);
        assert_eq!(loaded.messages, messages);
        assert!(loaded.updated_at.is_some());
        Ok(())
    }

    #[test]
    fn load_tolerates_missing_and_bad_entries() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let missing = Transcript::load(tmp.path().join("nope.json"));
        assert!(missing.messages.is_empty());
        assert_eq!(missing.phase, ConversationPhase::Idle);

        let path = tmp.path().join("transcript.json");
        std::fs::write(
            &path,
            serde_json::to_string(&json!({
                "session_id": "s-1",
                "phase": "bogus",
                "messages": [
                    {"id": "1", "sender": "GEMINI", "text": "hi"},
                    {"id": "2", "sender": "ROBOT", "text": "??"}
                ]
            }))?,
        )?;
        let loaded = Transcript::load(&path);
        assert_eq!(loaded.session_id, "s-1");
        assert_eq!(loaded.phase, ConversationPhase::Idle);
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].sender, AgentName::Gemini);
        Ok(())
    }
}
