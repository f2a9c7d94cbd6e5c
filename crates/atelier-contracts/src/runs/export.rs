use std::fmt::Write as _;

use crate::messages::ChatMessage;

/// Renders a conversation as Markdown, one section per message.
pub fn export_markdown(title: &str, messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {title}\n");
    for message in messages {
        let _ = writeln!(out, "## {}\n", message.sender);
        if !message.text.trim().is_empty() {
            let _ = writeln!(out, "{}\n", message.text.trim());
        }
        if let Some(url) = message.image_url.as_deref() {
            if url.starts_with("data:") {
                out.push_str("_(inline image)_\n\n");
            } else {
                let _ = writeln!(out, "![image]({url})\n");
            }
        }
        for (heading, items) in [
            ("Questions", message.questions.as_deref()),
            ("Prompts", message.prompts.as_deref()),
        ] {
            let Some(items) = items.filter(|items| !items.is_empty()) else {
                continue;
            };
            let _ = writeln!(out, "**{heading}**\n");
            for (idx, item) in items.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", idx + 1, item);
            }
            out.push('\n');
        }
    }
    out
}
