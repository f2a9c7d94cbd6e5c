use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, ATTACH_IMAGE_COMMANDS, EXPORT_COMMAND, GENERATE_IMAGE_COMMANDS, NO_ARG_COMMANDS,
    RAW_ARG_COMMANDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub prompt: Option<String>,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            prompt: None,
            command_args: BTreeMap::new(),
        }
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

// Byte offset where the first shell-style token of `arg` ends.
fn first_token_end(arg: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in arg.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(open) if ch == open => quote = None,
            Some('"') if ch == '\\' => escaped = true,
            Some(_) => {}
            None if ch.is_whitespace() => return idx,
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '\\' => escaped = true,
            None => {}
        }
    }
    arg.len()
}

// First argument is the image path (shell quoting allowed); the rest of the
// line is kept verbatim as the message text.
fn parse_attach_args(arg: &str) -> (String, Option<String>) {
    let arg = arg.trim();
    if arg.is_empty() {
        return (String::new(), None);
    }
    let (token, rest) = arg.split_at(first_token_end(arg));
    let path = shell_words::split(token)
        .ok()
        .and_then(|parts| parts.into_iter().next())
        .unwrap_or_else(|| token.trim_matches(|ch: char| ch == '"' || ch == '\'').to_string());
    let text = rest.trim();
    (
        path,
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        },
    )
}

fn insert_generate_target(intent: &mut Intent, arg: &str) {
    if let Ok(index) = arg.parse::<u64>() {
        intent
            .command_args
            .insert("index".to_string(), Value::Number(index.into()));
        return;
    }
    let prompt = arg.trim().trim_matches('"').trim();
    if !prompt.is_empty() {
        intent.prompt = Some(prompt.to_string());
    }
}

pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    if let Some(slash_tail) = raw_trimmed.strip_prefix('/') {
        let command_len = slash_tail
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
            .count();
        if command_len > 0 {
            let command = slash_tail[..command_len].to_ascii_lowercase();
            let arg = slash_tail[command_len..].trim();

            if let Some(action) = find_action(&command, RAW_ARG_COMMANDS) {
                let mut intent = Intent::new(action, text);
                intent
                    .command_args
                    .insert("model".to_string(), Value::String(arg.to_string()));
                return intent;
            }

            if let Some(action) = find_action(&command, ATTACH_IMAGE_COMMANDS) {
                let (path, message) = parse_attach_args(arg);
                let mut intent = Intent::new(action, text);
                intent
                    .command_args
                    .insert("path".to_string(), Value::String(path));
                intent.prompt = message;
                return intent;
            }

            if let Some(action) = find_action(&command, GENERATE_IMAGE_COMMANDS) {
                let mut intent = Intent::new(action, text);
                insert_generate_target(&mut intent, arg);
                return intent;
            }

            if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
                return Intent::new(action, text);
            }

            if command == EXPORT_COMMAND.command {
                let mut intent = Intent::new(EXPORT_COMMAND.action, text);
                intent.command_args.insert(
                    "format".to_string(),
                    Value::String(if arg.is_empty() {
                        "markdown".to_string()
                    } else {
                        arg.to_ascii_lowercase()
                    }),
                );
                return intent;
            }

            let mut intent = Intent::new("unknown", text);
            intent
                .command_args
                .insert("command".to_string(), Value::String(command));
            intent
                .command_args
                .insert("arg".to_string(), Value::String(arg.to_string()));
            return intent;
        }
    }

    let mut intent = Intent::new("send_message", text);
    intent.prompt = Some(raw_trimmed.to_string());
    intent
}
