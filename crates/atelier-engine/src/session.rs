use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atelier_contracts::agents::AgentName;
use atelier_contracts::chat::instructions::{
    DEFAULT_MOODBOARD_TEXT, GREETING, MOODBOARD_PROMPT_INITIAL, MUSE_PROMPTS_TEXT,
    REFINED_ANALYSIS_PREFIX,
};
use atelier_contracts::chat::{parse_reply, ParsedReply};
use atelier_contracts::events::{EventPayload, EventWriter};
use atelier_contracts::messages::{ChatMessage, ConversationPhase, ImageAttachment, MessageIds};
use atelier_contracts::models::ModelSelector;
use atelier_contracts::runs::summary::{write_summary, SessionSummary};
use atelier_contracts::runs::transcript::Transcript;
use serde_json::json;

use crate::{
    chat_backend_for, decode_data_url, error_chain_text, extension_for_mime, image_backend_for,
    map_object, now_utc_iso, ChatBackend, ImageBackend,
};

const ERROR_TEXT_MAX_CHARS: usize = 600;

/// Image the user attached to a message, plus where it came from.
#[derive(Debug, Clone)]
pub struct MoodboardUpload {
    pub attachment: ImageAttachment,
    pub source: String,
}

impl MoodboardUpload {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self {
            attachment: ImageAttachment::from_path(path)?,
            source: path.to_string_lossy().to_string(),
        })
    }
}

/// One chat session: the linear message list, the workflow phase and the two
/// collaborators. Every mutation is written to `transcript.json`.
pub struct CreativeSession {
    session_dir: PathBuf,
    events: EventWriter,
    transcript: Transcript,
    ids: MessageIds,
    messages: Vec<ChatMessage>,
    phase: ConversationPhase,
    chat: Box<dyn ChatBackend>,
    images: Box<dyn ImageBackend>,
    model_selector: ModelSelector,
    started_at: String,
}

impl CreativeSession {
    /// Opens (or resumes) the session stored in `session_dir`.
    pub fn new(
        session_dir: impl Into<PathBuf>,
        events_path: Option<PathBuf>,
        chat: Box<dyn ChatBackend>,
        images: Box<dyn ImageBackend>,
    ) -> Result<Self> {
        let session_dir = session_dir.into();
        fs::create_dir_all(&session_dir)
            .with_context(|| format!("failed to create {}", session_dir.display()))?;
        let transcript_path = session_dir.join("transcript.json");
        let resumed = transcript_path.exists();
        let transcript = if resumed {
            Transcript::load(&transcript_path)
        } else {
            Transcript::new(&transcript_path)
        };
        let events_path = events_path.unwrap_or_else(|| session_dir.join("events.jsonl"));
        let events = EventWriter::new(events_path, transcript.session_id.clone());
        let ids = MessageIds::new();

        let mut messages = transcript.messages.clone();
        let phase = transcript.phase;
        let started_at = if resumed {
            transcript.created_at.clone()
        } else {
            now_utc_iso()
        };
        if messages.is_empty() {
            messages.push(ChatMessage::new(
                ids.next_with_suffix("init"),
                AgentName::Gemini,
                GREETING,
            ));
        }

        events.emit(
            "session_started",
            map_object(json!({
                "session_dir": session_dir.to_string_lossy().to_string(),
                "resumed": resumed,
                "messages": messages.len(),
                "text_model": chat.model(),
                "image_model": images.model(),
            })),
        )?;

        let mut session = Self {
            session_dir,
            events,
            transcript,
            ids,
            messages,
            phase,
            chat,
            images,
            model_selector: ModelSelector::new(None),
            started_at,
        };
        session.persist()?;
        Ok(session)
    }

    /// Opens a session with backends picked from the model registry.
    pub fn open(
        session_dir: impl Into<PathBuf>,
        events_path: Option<PathBuf>,
        text_model: Option<&str>,
        image_model: Option<&str>,
    ) -> Result<Self> {
        let selector = ModelSelector::new(None);
        let text = selector
            .select(text_model, "text")
            .map_err(anyhow::Error::msg)?;
        let image = selector
            .select(image_model, "image")
            .map_err(anyhow::Error::msg)?;
        let mut session = Self::new(
            session_dir,
            events_path,
            chat_backend_for(&text.model)?,
            image_backend_for(&image.model)?,
        )?;
        session.model_selector = selector;
        for (capability, selection) in [("text", &text), ("image", &image)] {
            session.emit_model_selected(
                capability,
                &selection.model.name,
                selection.requested.as_deref(),
                selection.fallback_reason.as_deref(),
            )?;
        }
        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        &self.transcript.session_id
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn text_model(&self) -> &str {
        self.chat.model()
    }

    pub fn image_model(&self) -> &str {
        self.images.model()
    }

    /// Switches the text model. Returns the fallback reason when the requested
    /// model was not usable and another one was picked.
    pub fn set_text_model(&mut self, requested: &str) -> Result<Option<String>> {
        let selection = self
            .model_selector
            .select(Some(requested), "text")
            .map_err(anyhow::Error::msg)?;
        self.chat = chat_backend_for(&selection.model)?;
        self.emit_model_selected(
            "text",
            &selection.model.name,
            Some(requested),
            selection.fallback_reason.as_deref(),
        )?;
        Ok(selection.fallback_reason)
    }

    pub fn set_image_model(&mut self, requested: &str) -> Result<Option<String>> {
        let selection = self
            .model_selector
            .select(Some(requested), "image")
            .map_err(anyhow::Error::msg)?;
        self.images = image_backend_for(&selection.model)?;
        self.emit_model_selected(
            "image",
            &selection.model.name,
            Some(requested),
            selection.fallback_reason.as_deref(),
        )?;
        Ok(selection.fallback_reason)
    }

    pub fn latest_prompts(&self) -> Option<&[String]> {
        self.messages
            .iter()
            .rev()
            .find_map(|message| message.prompts.as_deref())
    }

    pub fn latest_questions(&self) -> Option<&[String]> {
        self.messages
            .iter()
            .rev()
            .find_map(|message| message.questions.as_deref())
    }

    /// 1-based lookup into the most recent Muse prompts.
    pub fn prompt_by_index(&self, index: usize) -> Option<String> {
        let prompts = self.latest_prompts()?;
        index
            .checked_sub(1)
            .and_then(|idx| prompts.get(idx))
            .cloned()
    }

    /// Sends a user message, optionally with a moodboard image, and appends the
    /// user bubble plus whatever the reply turns into. Returns the appended
    /// messages. Backend failures become a System message rather than an error.
    pub fn send_message(
        &mut self,
        text: &str,
        upload: Option<MoodboardUpload>,
    ) -> Result<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() && upload.is_none() {
            return Ok(Vec::new());
        }

        let history = self.messages.clone();
        let first_new = self.messages.len();

        let (prompt, attachment) = match upload {
            Some(upload) => {
                self.phase = ConversationPhase::AwaitingRefinement;
                let bubble = if text.is_empty() {
                    DEFAULT_MOODBOARD_TEXT
                } else {
                    text
                };
                let user_message = ChatMessage::new(self.ids.next(), AgentName::User, bubble)
                    .with_image_url(upload.source.clone());
                self.push_message("message_sent", user_message)?;
                (MOODBOARD_PROMPT_INITIAL.to_string(), Some(upload.attachment))
            }
            None => {
                let user_message = ChatMessage::new(self.ids.next(), AgentName::User, text);
                self.push_message("message_sent", user_message)?;
                (text.to_string(), None)
            }
        };

        self.process_reply(&history, &prompt, attachment.as_ref())?;
        Ok(self.messages[first_new..].to_vec())
    }

    fn process_reply(
        &mut self,
        history: &[ChatMessage],
        prompt: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<()> {
        let reply = match self.chat.send_message(history, prompt, image) {
            Ok(reply) => reply,
            Err(err) => {
                let detail = error_chain_text(&err, ERROR_TEXT_MAX_CHARS);
                self.phase = ConversationPhase::Idle;
                let message = ChatMessage::new(
                    self.ids.next(),
                    AgentName::System,
                    format!("Sorry, I encountered an error. {detail}"),
                );
                let mut payload = EventPayload::new();
                payload.insert("error".to_string(), json!(detail));
                payload.insert("backend".to_string(), json!(self.chat.name()));
                return self.push_message_with("message_failed", message, payload);
            }
        };

        let parsed = parse_reply(&reply);
        let kind = parsed.kind();
        match parsed {
            ParsedReply::InitialAnalysis {
                analysis,
                questions,
            } => {
                let aura = ChatMessage::new(
                    self.ids.next_with_suffix("aura-initial"),
                    AgentName::Aura,
                    analysis,
                )
                .with_questions(questions);
                self.push_message_with("reply_parsed", aura, kind_payload(kind))
            }
            ParsedReply::RefinedAnalysis { analysis, prompts } => {
                let aura = ChatMessage::new(
                    self.ids.next_with_suffix("aura-refined"),
                    AgentName::Aura,
                    format!("{REFINED_ANALYSIS_PREFIX}\n\n{analysis}"),
                );
                let muse = ChatMessage::new(
                    self.ids.next_with_suffix("muse"),
                    AgentName::Muse,
                    MUSE_PROMPTS_TEXT,
                )
                .with_prompts(prompts);
                self.phase = ConversationPhase::Idle;
                self.push_message_with("reply_parsed", aura, kind_payload(kind))?;
                self.push_message_with("reply_parsed", muse, kind_payload(kind))
            }
            ParsedReply::General { text } => {
                let gemini = ChatMessage::new(self.ids.next(), AgentName::Gemini, text);
                self.phase = ConversationPhase::Idle;
                self.push_message_with("reply_parsed", gemini, kind_payload(kind))
            }
        }
    }

    /// Asks Sora for an image. A placeholder is shown while the backend works
    /// and is then replaced in place, keeping its id.
    pub fn generate_image(&mut self, prompt: &str) -> Result<ChatMessage> {
        let prompt = prompt.trim();
        let id = self.ids.next();
        let placeholder = ChatMessage::new(
            id.clone(),
            AgentName::Sora,
            format!("Generating an image for the prompt: \"{prompt}\""),
        )
        .generating();
        let mut payload = EventPayload::new();
        payload.insert("prompt".to_string(), json!(prompt));
        payload.insert("backend".to_string(), json!(self.images.name()));
        payload.insert("model".to_string(), json!(self.images.model()));
        self.push_message_with("image_generation_started", placeholder, payload)?;

        let outcome = self
            .images
            .generate_image(prompt)
            .and_then(|url| self.materialize_image(&id, url));
        let (event_type, result, mut payload) = match outcome {
            Ok(image_url) => {
                let message = ChatMessage::new(
                    id.clone(),
                    AgentName::Sora,
                    format!("Here is the generated image for: \"{prompt}\""),
                )
                .with_image_url(image_url.clone());
                let mut payload = EventPayload::new();
                payload.insert("image_url".to_string(), json!(image_url));
                ("image_generated", message, payload)
            }
            Err(err) => {
                let detail = error_chain_text(&err, ERROR_TEXT_MAX_CHARS);
                let message = ChatMessage::new(
                    id.clone(),
                    AgentName::Sora,
                    format!("Sorry, I couldn't create the image. {detail}"),
                );
                let mut payload = EventPayload::new();
                payload.insert("error".to_string(), json!(detail));
                ("image_generation_failed", message, payload)
            }
        };

        if let Some(slot) = self.messages.iter_mut().find(|message| message.id == id) {
            *slot = result.clone();
        } else {
            self.messages.push(result.clone());
        }
        payload.insert("prompt".to_string(), json!(prompt));
        self.events.emit_message(event_type, &result, payload)?;
        self.persist()?;
        Ok(result)
    }

    /// Writes `data:` URLs out as session artifacts; other URLs pass through.
    fn materialize_image(&self, message_id: &str, url: String) -> Result<String> {
        let Some((mime, bytes)) = decode_data_url(&url) else {
            if url.trim().is_empty() {
                anyhow::bail!("Image generation failed to return an image URL.");
            }
            return Ok(url);
        };
        let path = self.session_dir.join(format!(
            "artifact-{}.{}",
            message_id,
            extension_for_mime(&mime)
        ));
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Writes `summary.json` and logs the end of the session.
    pub fn finish(&self) -> Result<SessionSummary> {
        let summary = SessionSummary::from_messages(
            self.session_id(),
            &self.started_at,
            &now_utc_iso(),
            &self.messages,
        );
        let extra = map_object(json!({
            "text_model": self.chat.model(),
            "image_model": self.images.model(),
            "phase": self.phase.as_str(),
        }));
        write_summary(&self.session_dir.join("summary.json"), &summary, Some(&extra))?;
        self.events.emit(
            "session_finished",
            map_object(json!({
                "total_messages": summary.total_messages,
                "images_generated": summary.images_generated,
            })),
        )?;
        Ok(summary)
    }

    fn emit_model_selected(
        &self,
        capability: &str,
        model: &str,
        requested: Option<&str>,
        fallback_reason: Option<&str>,
    ) -> Result<()> {
        self.events.emit(
            "model_selected",
            map_object(json!({
                "capability": capability,
                "model": model,
                "requested": requested,
                "fallback_reason": fallback_reason,
            })),
        )?;
        Ok(())
    }

    fn push_message(&mut self, event_type: &str, message: ChatMessage) -> Result<()> {
        self.push_message_with(event_type, message, EventPayload::new())
    }

    fn push_message_with(
        &mut self,
        event_type: &str,
        message: ChatMessage,
        mut payload: EventPayload,
    ) -> Result<()> {
        payload.insert("phase".to_string(), json!(self.phase.as_str()));
        self.events.emit_message(event_type, &message, payload)?;
        self.messages.push(message);
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        self.transcript.replace_state(&self.messages, self.phase);
        self.transcript.save()
    }
}

fn kind_payload(kind: &str) -> EventPayload {
    let mut payload = EventPayload::new();
    payload.insert("reply_kind".to_string(), json!(kind));
    payload
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use atelier_contracts::agents::AgentName;
    use atelier_contracts::events::read_event_types;
    use atelier_contracts::messages::{ChatMessage, ConversationPhase, ImageAttachment};
    use atelier_contracts::runs::transcript::Transcript;

    use super::{CreativeSession, MoodboardUpload};
    use crate::{ChatBackend, DryrunImageProvider, ImageBackend};

    #[derive(Debug, Clone)]
    struct SentCall {
        history_len: usize,
        message: String,
        image: bool,
    }

    #[derive(Default)]
    struct Script {
        replies: VecDeque<Result<String, String>>,
        calls: Vec<SentCall>,
    }

    #[derive(Clone, Default)]
    struct ScriptedChat {
        script: Arc<Mutex<Script>>,
    }

    impl ScriptedChat {
        fn replying(replies: &[Result<&str, &str>]) -> Self {
            let chat = Self::default();
            if let Ok(mut script) = chat.script.lock() {
                script.replies = replies
                    .iter()
                    .map(|reply| reply.map(str::to_string).map_err(str::to_string))
                    .collect();
            }
            chat
        }

        fn calls(&self) -> Vec<SentCall> {
            self.script
                .lock()
                .map(|script| script.calls.clone())
                .unwrap_or_default()
        }
    }

    impl ChatBackend for ScriptedChat {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-text"
        }

        fn send_message(
            &self,
            history: &[ChatMessage],
            message: &str,
            image: Option<&ImageAttachment>,
        ) -> Result<String> {
            let mut script = self.script.lock().map_err(|_| anyhow!("poisoned"))?;
            script.calls.push(SentCall {
                history_len: history.len(),
                message: message.to_string(),
                image: image.is_some(),
            });
            match script.replies.pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(err)) => Err(anyhow!(err)),
                None => Err(anyhow!("no scripted reply left")),
            }
        }
    }

    struct FailingImages;

    impl ImageBackend for FailingImages {
        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "failing-image"
        }

        fn generate_image(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("quota exceeded"))
        }
    }

    struct UrlImages;

    impl ImageBackend for UrlImages {
        fn name(&self) -> &str {
            "url"
        }

        fn model(&self) -> &str {
            "url-image"
        }

        fn generate_image(&self, prompt: &str) -> Result<String> {
            Ok(format!("https://images.example/{}.png", prompt.len()))
        }
    }

    const INITIAL: &str = "AURA'S INITIAL ANALYSIS:\nDusky blues.\n\nAURA'S QUESTIONS:\n1. Audience?\n2. Medium?";
    const REFINED: &str = "AURA'S REFINED ANALYSIS:\nA nocturne for print.\n\nMUSE'S HYPER-DETAILED PROMPTS:\n1. Harbour at dusk.\n2. Neon rain.\n3. Moonlit dunes.";

    fn session_with(
        dir: &std::path::Path,
        chat: ScriptedChat,
        images: Box<dyn ImageBackend>,
    ) -> Result<CreativeSession> {
        CreativeSession::new(dir, None, Box::new(chat), images)
    }

    fn upload() -> MoodboardUpload {
        MoodboardUpload {
            attachment: ImageAttachment::from_bytes("image/png", b"png-bytes"),
            source: "board.png".to_string(),
        }
    }

    #[test]
    fn new_session_starts_with_greeting() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let session = session_with(
            temp.path(),
            ScriptedChat::default(),
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].sender, AgentName::Gemini);
        assert!(session.messages()[0].text.starts_with("Hello!"));
        assert_eq!(session.phase(), ConversationPhase::Idle);
        Ok(())
    }

    #[test]
    fn moodboard_then_answers_runs_both_steps() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::replying(&[Ok(INITIAL), Ok(REFINED)]);
        let mut session = session_with(
            temp.path(),
            chat.clone(),
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;

        let step_one = session.send_message("", Some(upload()))?;
        assert_eq!(step_one.len(), 2);
        assert_eq!(step_one[0].sender, AgentName::User);
        assert_eq!(
            step_one[0].text,
            "Here's a moodboard. Let's start the creative process."
        );
        assert_eq!(step_one[0].image_url.as_deref(), Some("board.png"));
        assert_eq!(step_one[1].sender, AgentName::Aura);
        assert_eq!(step_one[1].text, "Dusky blues.");
        assert!(step_one[1].id.ends_with("-aura-initial"));
        assert_eq!(
            session.latest_questions(),
            Some(&["Audience?".to_string(), "Medium?".to_string()][..])
        );
        assert_eq!(session.phase(), ConversationPhase::AwaitingRefinement);

        let step_two = session.send_message("Gallery visitors, print", None)?;
        assert_eq!(step_two.len(), 3);
        assert_eq!(
            step_two[1].text,
            "Based on your answers, here is the refined analysis:\n\nA nocturne for print."
        );
        assert_eq!(step_two[2].sender, AgentName::Muse);
        assert_eq!(
            step_two[2].text,
            "And here are some hyper-detailed prompts inspired by our discussion:"
        );
        assert_eq!(session.prompt_by_index(2).as_deref(), Some("Neon rain."));
        assert_eq!(session.prompt_by_index(0), None);
        assert_eq!(session.prompt_by_index(4), None);
        assert_eq!(session.phase(), ConversationPhase::Idle);

        let calls = chat.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].image);
        assert_eq!(calls[0].history_len, 1);
        assert!(calls[0].message.starts_with("Please execute Step 1"));
        assert!(!calls[1].image);
        assert_eq!(calls[1].history_len, 3);
        assert_eq!(calls[1].message, "Gallery visitors, print");

        let raw = std::fs::read_to_string(temp.path().join("events.jsonl"))?;
        let reply_kinds = raw
            .lines()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter(|row| row["type"] == "reply_parsed")
            .filter_map(|row| row["reply_kind"].as_str().map(str::to_string))
            .collect::<Vec<String>>();
        assert_eq!(
            reply_kinds,
            vec!["initial_analysis", "refined_analysis", "refined_analysis"]
        );
        Ok(())
    }

    #[test]
    fn moodboard_keeps_user_text_in_bubble() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::replying(&[Ok(INITIAL)]);
        let mut session = session_with(
            temp.path(),
            chat.clone(),
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        let added = session.send_message("for a jazz poster", Some(upload()))?;
        assert_eq!(added[0].text, "for a jazz poster");
        assert!(chat.calls()[0].message.starts_with("Please execute Step 1"));
        Ok(())
    }

    #[test]
    fn general_reply_becomes_gemini_message() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::replying(&[Ok("Paris is the capital of France.")]);
        let mut session = session_with(
            temp.path(),
            chat,
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        let added = session.send_message("capital of France?", None)?;
        assert_eq!(added.len(), 2);
        assert_eq!(added[1].sender, AgentName::Gemini);
        assert_eq!(added[1].text, "Paris is the capital of France.");
        assert_eq!(session.phase(), ConversationPhase::Idle);
        Ok(())
    }

    #[test]
    fn backend_error_becomes_system_message_and_resets_phase() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::replying(&[Err("Gemini request failed (500): boom")]);
        let mut session = session_with(
            temp.path(),
            chat,
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        let added = session.send_message("", Some(upload()))?;
        assert_eq!(added[1].sender, AgentName::System);
        assert_eq!(
            added[1].text,
            "Sorry, I encountered an error. Gemini request failed (500): boom"
        );
        assert_eq!(session.phase(), ConversationPhase::Idle);
        Ok(())
    }

    #[test]
    fn blank_message_without_image_is_ignored() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::default();
        let mut session = session_with(
            temp.path(),
            chat.clone(),
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        assert!(session.send_message("   ", None)?.is_empty());
        assert!(chat.calls().is_empty());
        assert_eq!(session.messages().len(), 1);
        Ok(())
    }

    #[test]
    fn generated_data_url_is_saved_as_artifact() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut session = session_with(
            temp.path(),
            ScriptedChat::default(),
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        let before = session.messages().len();
        let result = session.generate_image("harbour at dusk")?;
        assert_eq!(session.messages().len(), before + 1);
        assert_eq!(result.sender, AgentName::Sora);
        assert!(!result.is_generating);
        assert_eq!(result.text, "Here is the generated image for: \"harbour at dusk\"");
        let path = result.image_url.clone().unwrap_or_default();
        assert!(path.ends_with(".png"), "{path}");
        assert!(std::path::Path::new(&path).exists());
        assert_eq!(session.messages().last(), Some(&result));

        let types = read_event_types(&temp.path().join("events.jsonl"))?;
        assert!(types.contains(&"image_generation_started".to_string()));
        assert!(types.contains(&"image_generated".to_string()));
        Ok(())
    }

    #[test]
    fn remote_image_url_passes_through() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut session = session_with(temp.path(), ScriptedChat::default(), Box::new(UrlImages))?;
        let result = session.generate_image("fox")?;
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://images.example/3.png")
        );
        Ok(())
    }

    #[test]
    fn image_failure_replaces_placeholder() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut session =
            session_with(temp.path(), ScriptedChat::default(), Box::new(FailingImages))?;
        let result = session.generate_image("fox")?;
        assert_eq!(session.messages().len(), 2);
        assert_eq!(result.text, "Sorry, I couldn't create the image. quota exceeded");
        assert!(result.image_url.is_none());
        assert!(!session.messages().iter().any(|message| message.is_generating));
        Ok(())
    }

    #[test]
    fn session_resumes_from_transcript() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::replying(&[Ok(INITIAL)]);
        let session_id = {
            let mut session = session_with(
                temp.path(),
                chat,
                Box::new(DryrunImageProvider::new("dryrun-image-1")),
            )?;
            session.send_message("", Some(upload()))?;
            session.session_id().to_string()
        };

        let saved = Transcript::load(temp.path().join("transcript.json"));
        assert_eq!(saved.messages.len(), 3);
        assert_eq!(saved.phase, ConversationPhase::AwaitingRefinement);

        let resumed = session_with(
            temp.path(),
            ScriptedChat::default(),
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        assert_eq!(resumed.session_id(), session_id);
        assert_eq!(resumed.messages().len(), 3);
        assert_eq!(resumed.phase(), ConversationPhase::AwaitingRefinement);
        let summary = resumed.finish()?;
        assert_eq!(summary.started_at, saved.created_at);
        Ok(())
    }

    #[test]
    fn open_selects_dryrun_backends_and_reports_fallback() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut session = CreativeSession::open(
            temp.path(),
            None,
            Some("dryrun-text-1"),
            Some("dryrun-image-1"),
        )?;
        assert_eq!(session.text_model(), "dryrun-text-1");
        assert_eq!(session.image_model(), "dryrun-image-1");

        let fallback = session.set_text_model("gpt-unknown")?;
        assert_eq!(
            fallback.as_deref(),
            Some("Requested model 'gpt-unknown' unavailable for capability 'text'.")
        );
        assert_eq!(session.text_model(), "gemini-2.5-flash");
        assert_eq!(session.set_text_model("dryrun-text-1")?, None);

        let added = session.send_message("hello", None)?;
        assert_eq!(added[1].text, "(dry run) You said: hello");
        Ok(())
    }

    #[test]
    fn finish_writes_summary_and_event() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let chat = ScriptedChat::replying(&[Ok(INITIAL), Ok(REFINED)]);
        let mut session = session_with(
            temp.path(),
            chat,
            Box::new(DryrunImageProvider::new("dryrun-image-1")),
        )?;
        session.send_message("", Some(upload()))?;
        session.send_message("print", None)?;
        session.generate_image("Neon rain.")?;
        let summary = session.finish()?;

        assert_eq!(summary.questions_asked, 2);
        assert_eq!(summary.prompts_offered, 3);
        assert_eq!(summary.images_generated, 1);
        assert!(temp.path().join("summary.json").exists());
        let types = read_event_types(&temp.path().join("events.jsonl"))?;
        assert_eq!(types.first().map(String::as_str), Some("session_started"));
        assert_eq!(types.last().map(String::as_str), Some("session_finished"));
        assert!(types.contains(&"reply_parsed".to_string()));
        Ok(())
    }
}
