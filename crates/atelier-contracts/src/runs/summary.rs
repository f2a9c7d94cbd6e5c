use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agents::AgentName;
use crate::messages::ChatMessage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub total_messages: u64,
    pub messages_by_sender: BTreeMap<String, u64>,
    pub questions_asked: u64,
    pub prompts_offered: u64,
    pub images_generated: u64,
}

impl SessionSummary {
    pub fn from_messages(
        session_id: &str,
        started_at: &str,
        finished_at: &str,
        messages: &[ChatMessage],
    ) -> Self {
        let mut messages_by_sender = BTreeMap::new();
        let mut questions_asked = 0;
        let mut prompts_offered = 0;
        let mut images_generated = 0;
        for message in messages {
            *messages_by_sender
                .entry(message.sender.label().to_string())
                .or_insert(0) += 1;
            questions_asked += message.questions.as_ref().map_or(0, Vec::len) as u64;
            prompts_offered += message.prompts.as_ref().map_or(0, Vec::len) as u64;
            if message.sender == AgentName::Sora && message.image_url.is_some() {
                images_generated += 1;
            }
        }
        Self {
            session_id: session_id.to_string(),
            started_at: started_at.to_string(),
            finished_at: finished_at.to_string(),
            total_messages: messages.len() as u64,
            messages_by_sender,
            questions_asked,
            prompts_offered,
            images_generated,
        }
    }
}

pub fn write_summary(
    path: &Path,
    summary: &SessionSummary,
    extra: Option<&Map<String, Value>>,
) -> anyhow::Result<()> {
    let mut payload = match serde_json::to_value(summary)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    payload.insert("ts".to_string(), Value::String(now_utc_iso()));
    if let Some(extra) = extra {
        for (key, value) in extra {
            payload.insert(key.clone(), value.clone());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&Value::Object(payload))?)?;
    Ok(())
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
