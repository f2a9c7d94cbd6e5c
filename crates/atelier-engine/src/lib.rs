use std::env;
use std::io::Cursor;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use atelier_contracts::agents::AgentName;
use atelier_contracts::chat::instructions::{
    INITIAL_ANALYSIS_MARKER, PROMPTS_MARKER, QUESTIONS_MARKER, REFINED_ANALYSIS_MARKER,
    SYSTEM_INSTRUCTION,
};
use atelier_contracts::messages::{ChatMessage, ImageAttachment};
use atelier_contracts::models::ModelSpec;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

mod history;
mod session;

pub use history::{history_text, to_gemini_contents};
pub use session::{CreativeSession, MoodboardUpload};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const GEMINI_KEY_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "GEMINI_API_KEY_VERCEL",
    "API_KEY",
    "GOOGLE_API_KEY",
];
const IMAGEN_KEY_VARS: &[&str] = &[
    "IMAGEN_API_KEY",
    "GEMINI_API_KEY",
    "GEMINI_API_KEY_VERCEL",
    "API_KEY",
    "GOOGLE_API_KEY",
];

/// Per-request timeout plus linear backoff retries on transport failures.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TransportPolicy {
    timeout_s: f64,
    max_retries: usize,
    retry_backoff_s: f64,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            timeout_s: 90.0,
            max_retries: 2,
            retry_backoff_s: 1.2,
        }
    }
}

/// "Send chat message" collaborator: the full persona conversation goes
/// through one text model.
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    fn send_message(
        &self,
        history: &[ChatMessage],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String>;
}

/// "Generate image" collaborator. Returns an image URL, usually a `data:` URL.
pub trait ImageBackend: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    fn generate_image(&self, prompt: &str) -> Result<String>;
}

pub fn chat_backend_for(model: &ModelSpec) -> Result<Box<dyn ChatBackend>> {
    match model.provider.as_str() {
        "gemini" => Ok(Box::new(GeminiChatProvider::new(&model.name))),
        "dryrun" => Ok(Box::new(DryrunChatProvider::new(&model.name))),
        other => bail!("no chat provider for '{other}' (model {})", model.name),
    }
}

pub fn image_backend_for(model: &ModelSpec) -> Result<Box<dyn ImageBackend>> {
    match model.provider.as_str() {
        "imagen" => Ok(Box::new(ImagenProvider::new(&model.name))),
        "dryrun" => Ok(Box::new(DryrunImageProvider::new(&model.name))),
        other => bail!("no image provider for '{other}' (model {})", model.name),
    }
}

pub struct GeminiChatProvider {
    api_base: String,
    model: String,
    http: HttpClient,
    transport: TransportPolicy,
}

impl GeminiChatProvider {
    pub fn new(model: &str) -> Self {
        Self {
            api_base: api_base_from_env(&["GEMINI_API_BASE"]),
            model: model.trim().to_string(),
            http: HttpClient::new(),
            transport: TransportPolicy::default(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.api_base,
            model_path(&self.model)
        )
    }

    fn build_payload(
        history: &[ChatMessage],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Value {
        let mut contents = to_gemini_contents(history);
        let mut parts = vec![json!({ "text": message })];
        if let Some(image) = image {
            parts.push(json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data,
                }
            }));
        }
        contents.push(json!({ "role": "user", "parts": parts }));
        json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }],
            },
            "contents": contents,
        })
    }

    /// Joins the text parts of the first candidate.
    fn extract_reply_text(response_payload: &Value) -> Option<String> {
        let parts = response_payload
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)?;
        let text = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<&str>>()
            .join("");
        if text.trim().is_empty() {
            return None;
        }
        Some(text)
    }
}

impl ChatBackend for GeminiChatProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn send_message(
        &self,
        history: &[ChatMessage],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String> {
        let api_key = api_key_from_env(GEMINI_KEY_VARS)?;
        let endpoint = self.endpoint();
        let payload = Self::build_payload(history, message, image);
        let response = post_json_with_retries(
            &self.http,
            "Gemini",
            &endpoint,
            &api_key,
            &payload,
            self.transport,
        )?;
        let response_payload = response_json_or_error("Gemini", response)?;
        match Self::extract_reply_text(&response_payload) {
            Some(text) => Ok(text),
            None => bail!("Failed to generate response from Gemini API"),
        }
    }
}

pub struct ImagenProvider {
    api_base: String,
    model: String,
    http: HttpClient,
    transport: TransportPolicy,
}

impl ImagenProvider {
    pub fn new(model: &str) -> Self {
        Self {
            api_base: api_base_from_env(&["IMAGEN_API_BASE", "GEMINI_API_BASE"]),
            model: Self::resolve_model_name(model),
            http: HttpClient::new(),
            transport: TransportPolicy::default(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim().trim_end_matches('/').to_string();
        self
    }

    fn resolve_model_name(raw_model: &str) -> String {
        let trimmed = raw_model.trim().trim_start_matches("models/").to_string();
        match trimmed.to_ascii_lowercase().as_str() {
            "imagen-3" | "imagen-3.0" => "imagen-3.0-generate-002".to_string(),
            "imagen-4" | "imagen-4.0" => "imagen-4.0-generate-001".to_string(),
            "imagen-4-ultra" | "imagen-4.0-ultra" => "imagen-4.0-ultra-generate-001".to_string(),
            _ => trimmed,
        }
    }

    fn build_payload(prompt: &str) -> Value {
        json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "1:1",
                "outputOptions": { "mimeType": "image/jpeg" },
            },
        })
    }

    /// First prediction as `(base64, mime)`.
    fn first_prediction(response_payload: &Value) -> Option<(String, String)> {
        let predictions = response_payload.get("predictions").and_then(Value::as_array)?;
        for row in predictions {
            let Some(obj) = row.as_object() else {
                continue;
            };
            let source = obj
                .get("image")
                .or_else(|| obj.get("generatedImage"))
                .and_then(Value::as_object)
                .unwrap_or(obj);
            let encoded = source
                .get("bytesBase64Encoded")
                .or_else(|| source.get("imageBytes"))
                .or_else(|| source.get("bytes_base64_encoded"))
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty());
            if let Some(encoded) = encoded {
                let mime = source
                    .get("mimeType")
                    .or_else(|| source.get("mime_type"))
                    .and_then(Value::as_str)
                    .unwrap_or("image/jpeg");
                return Some((encoded.to_string(), mime.to_string()));
            }
        }
        None
    }
}

impl ImageBackend for ImagenProvider {
    fn name(&self) -> &str {
        "imagen"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn generate_image(&self, prompt: &str) -> Result<String> {
        let api_key = api_key_from_env(IMAGEN_KEY_VARS)?;
        let endpoint = format!("{}/{}:predict", self.api_base, model_path(&self.model));
        let response = post_json_with_retries(
            &self.http,
            "Imagen",
            &endpoint,
            &api_key,
            &Self::build_payload(prompt),
            self.transport,
        )?;
        let response_payload = response_json_or_error("Imagen", response)?;
        let Some((encoded, mime)) = Self::first_prediction(&response_payload) else {
            bail!("Image generation failed");
        };
        Ok(format!("data:{mime};base64,{encoded}"))
    }
}

/// Offline stand-in that answers in the persona protocol format.
pub struct DryrunChatProvider {
    model: String,
}

impl DryrunChatProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

impl ChatBackend for DryrunChatProvider {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn send_message(
        &self,
        history: &[ChatMessage],
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String> {
        if let Some(image) = image {
            return Ok(format!(
                "{INITIAL_ANALYSIS_MARKER}\nA {} moodboard of {} bytes with a calm, balanced composition.\n\n{QUESTIONS_MARKER}\n1. What mood should the final piece carry?\n2. Where will it be shown?\n3. Which colours should dominate?",
                image.mime_type,
                image.decoded_len()
            ));
        }

        let awaiting_answers = history
            .iter()
            .rev()
            .find(|entry| entry.sender.is_model_persona())
            .map(|entry| entry.sender == AgentName::Aura && entry.questions.is_some())
            .unwrap_or(false);
        if awaiting_answers {
            let answers = message.trim();
            return Ok(format!(
                "{REFINED_ANALYSIS_MARKER}\nThe board, read through your answers ({answers}), points to a restrained, atmospheric piece.\n\n{PROMPTS_MARKER}\n1. Wide establishing shot, soft morning haze, muted palette, {answers}.\n2. Intimate close-up, shallow depth of field, film grain, {answers}.\n3. Graphic poster layout, bold negative space, {answers}."
            ));
        }

        Ok(format!("(dry run) You said: {}", message.trim()))
    }
}

/// Renders a solid colour PNG derived from the prompt.
pub struct DryrunImageProvider {
    model: String,
    size: u32,
}

impl DryrunImageProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            size: 64,
        }
    }
}

impl ImageBackend for DryrunImageProvider {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn generate_image(&self, prompt: &str) -> Result<String> {
        let (r, g, b) = color_from_prompt(prompt);
        let mut image = RgbImage::new(self.size, self.size);
        for pixel in image.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("dryrun image encode failed")?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
    }
}

/// Splits a base64 `data:` URL into its mime type and decoded bytes.
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = BASE64.decode(data.trim().as_bytes()).ok()?;
    let mime = if mime.is_empty() {
        "application/octet-stream"
    } else {
        mime
    };
    Some((mime.to_string(), bytes))
}

pub fn extension_for_mime(mime: &str) -> &'static str {
    let lowered = mime.to_ascii_lowercase();
    if lowered.contains("jpeg") || lowered.contains("jpg") {
        return "jpg";
    }
    if lowered.contains("webp") {
        return "webp";
    }
    if lowered.contains("gif") {
        return "gif";
    }
    "png"
}

/// Cause chain of an error on one line, consecutive duplicates removed.
pub fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parts.last().map(|existing| existing == trimmed).unwrap_or(false) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

fn model_path(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{trimmed}")
    }
}

fn api_base_from_env(keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
}

fn api_key_from_env(vars: &[&str]) -> Result<String> {
    match vars.iter().find_map(|key| non_empty_env(key)) {
        Some(key) => Ok(key),
        None => bail!("{}", missing_key_message(vars)),
    }
}

fn missing_key_message(vars: &[&str]) -> String {
    format!("API key not set; set one of {}", vars.join(", "))
}

fn post_json_with_retries(
    http: &HttpClient,
    provider: &str,
    endpoint: &str,
    api_key: &str,
    payload: &Value,
    policy: TransportPolicy,
) -> Result<HttpResponse> {
    let mut attempt = 0;
    loop {
        let response = http
            .post(endpoint)
            .query(&[("key", api_key)])
            .timeout(Duration::from_secs_f64(policy.timeout_s))
            .json(payload)
            .send();
        match response {
            Ok(ok) => return Ok(ok),
            Err(raw) => {
                let err = anyhow::Error::new(raw)
                    .context(format!("{provider} request failed ({endpoint})"));
                if !is_retryable_transport_error(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                thread::sleep(Duration::from_secs_f64(
                    policy.retry_backoff_s * attempt as f64,
                ));
            }
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, 512)
        );
    }
    let parsed: Value = serde_json::from_str(&body)
        .with_context(|| format!("{provider} returned invalid JSON payload"))?;
    Ok(parsed)
}

fn is_retryable_transport_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .map(|reqwest_err| {
                reqwest_err.is_timeout() || reqwest_err.is_connect() || reqwest_err.is_request()
            })
            .unwrap_or(false)
    })
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

fn color_from_prompt(prompt: &str) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}

fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn now_utc_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use atelier_contracts::agents::AgentName;
    use atelier_contracts::chat::{parse_reply, ParsedReply};
    use atelier_contracts::messages::{ChatMessage, ImageAttachment};
    use atelier_contracts::models::ModelSelector;
    use serde_json::json;

    use super::*;

    #[test]
    fn gemini_payload_carries_instruction_history_and_image() {
        let history = vec![
            ChatMessage::new("0", AgentName::Gemini, "Hello!"),
            ChatMessage::new("1", AgentName::User, "hi"),
        ];
        let image = ImageAttachment::from_bytes("image/png", b"png");
        let payload = GeminiChatProvider::build_payload(&history, "describe", Some(&image));

        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"],
            json!(SYSTEM_INSTRUCTION)
        );
        let contents = payload["contents"].as_array().cloned().unwrap_or_default();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], json!("model"));
        assert_eq!(contents[1]["role"], json!("user"));
        assert_eq!(contents[2]["parts"][0]["text"], json!("describe"));
        assert_eq!(
            contents[2]["parts"][1]["inlineData"]["mimeType"],
            json!("image/png")
        );
    }

    #[test]
    fn gemini_payload_without_image_has_single_text_part() {
        let payload = GeminiChatProvider::build_payload(&[], "hello", None);
        assert_eq!(payload["contents"][0]["parts"], json!([{ "text": "hello" }]));
    }

    #[test]
    fn gemini_reply_text_joins_parts_of_first_candidate() {
        let payload = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "AURA'S " }, { "text": "QUESTIONS:" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(
            GeminiChatProvider::extract_reply_text(&payload).as_deref(),
            Some("AURA'S QUESTIONS:")
        );
        assert_eq!(
            GeminiChatProvider::extract_reply_text(&json!({ "candidates": [] })),
            None
        );
        assert_eq!(
            GeminiChatProvider::extract_reply_text(&json!({
                "candidates": [{ "content": { "parts": [{ "inlineData": {} }] } }]
            })),
            None
        );
    }

    #[test]
    fn gemini_endpoint_normalizes_model_path() {
        let provider = GeminiChatProvider::new("gemini-2.5-flash").with_api_base("http://x/v1/");
        assert_eq!(
            provider.endpoint(),
            "http://x/v1/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(model_path("models/foo"), "models/foo");
    }

    #[test]
    fn imagen_payload_requests_one_square_jpeg() {
        let payload = ImagenProvider::build_payload("a fox");
        assert_eq!(payload["instances"][0]["prompt"], json!("a fox"));
        assert_eq!(payload["parameters"]["sampleCount"], json!(1));
        assert_eq!(payload["parameters"]["aspectRatio"], json!("1:1"));
        assert_eq!(
            payload["parameters"]["outputOptions"]["mimeType"],
            json!("image/jpeg")
        );
    }

    #[test]
    fn imagen_first_prediction_reads_both_shapes() {
        let flat = json!({
            "predictions": [{ "bytesBase64Encoded": "AAAA", "mimeType": "image/png" }]
        });
        assert_eq!(
            ImagenProvider::first_prediction(&flat),
            Some(("AAAA".to_string(), "image/png".to_string()))
        );
        let nested = json!({ "predictions": [{ "image": { "imageBytes": "BBBB" } }] });
        assert_eq!(
            ImagenProvider::first_prediction(&nested),
            Some(("BBBB".to_string(), "image/jpeg".to_string()))
        );
        assert_eq!(ImagenProvider::first_prediction(&json!({ "predictions": [] })), None);
        assert_eq!(ImagenProvider::first_prediction(&json!({})), None);
    }

    #[test]
    fn imagen_model_aliases_resolve() {
        assert_eq!(
            ImagenProvider::resolve_model_name("models/imagen-4"),
            "imagen-4.0-generate-001"
        );
        assert_eq!(
            ImagenProvider::resolve_model_name("imagen-3.0-generate-002"),
            "imagen-3.0-generate-002"
        );
    }

    #[test]
    fn dryrun_chat_walks_the_two_step_protocol() -> Result<()> {
        let chat = DryrunChatProvider::new("dryrun-text-1");
        let image = ImageAttachment::from_bytes("image/png", b"abc");
        let step_one = chat.send_message(&[], "analyze", Some(&image))?;
        let ParsedReply::InitialAnalysis { questions, .. } = parse_reply(&step_one) else {
            panic!("expected initial analysis, got {step_one}");
        };
        assert_eq!(questions.len(), 3);

        let history =
            vec![ChatMessage::new("a", AgentName::Aura, "analysis").with_questions(questions)];
        let step_two = chat.send_message(&history, "a poster", None)?;
        let ParsedReply::RefinedAnalysis { prompts, .. } = parse_reply(&step_two) else {
            panic!("expected refined analysis, got {step_two}");
        };
        assert_eq!(prompts.len(), 3);

        let general = chat.send_message(&[], "hi", None)?;
        assert_eq!(parse_reply(&general).kind(), "general");
        Ok(())
    }

    #[test]
    fn dryrun_image_is_a_decodable_png_data_url() -> Result<()> {
        let url = DryrunImageProvider::new("dryrun-image-1").generate_image("boat")?;
        let (mime, bytes) = decode_data_url(&url).unwrap_or_default();
        assert_eq!(mime, "image/png");
        let decoded = image::load_from_memory(&bytes)?;
        assert_eq!(decoded.width(), 64);
        Ok(())
    }

    #[test]
    fn data_url_decoding_rejects_non_base64_urls() {
        assert_eq!(
            decode_data_url("data:image/jpeg;base64,/9j/"),
            Some(("image/jpeg".to_string(), vec![0xff, 0xd8, 0xff]))
        );
        assert_eq!(decode_data_url("https://example.com/a.png"), None);
        assert_eq!(decode_data_url("data:text/plain,hello"), None);
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/png"), "png");
    }

    #[test]
    fn backends_follow_selected_provider() -> Result<()> {
        let selector = ModelSelector::new(None);
        let text = selector
            .select(Some("dryrun-text-1"), "text")
            .map_err(anyhow::Error::msg)?;
        assert_eq!(chat_backend_for(&text.model)?.name(), "dryrun");
        let image = selector.select(None, "image").map_err(anyhow::Error::msg)?;
        let backend = image_backend_for(&image.model)?;
        assert_eq!(backend.name(), "imagen");
        assert_eq!(backend.model(), "imagen-3.0-generate-002");

        let mut bogus = text.model.clone();
        bogus.provider = "mystery".to_string();
        assert!(chat_backend_for(&bogus).is_err());
        Ok(())
    }

    #[test]
    fn error_chain_text_joins_causes() {
        let err = anyhow::anyhow!("connection refused").context("Gemini request failed (x)");
        assert_eq!(
            error_chain_text(&err, 200),
            "Gemini request failed (x) | caused by: connection refused"
        );
        assert_eq!(error_chain_text(&err, 6), "Gemini…");
    }

    #[test]
    fn both_providers_share_the_retrying_transport() {
        let policy = TransportPolicy::default();
        assert_eq!(policy.timeout_s, 90.0);
        assert_eq!(policy.max_retries, 2);
        assert_eq!(GeminiChatProvider::new("gemini-2.5-flash").transport, policy);
        assert_eq!(ImagenProvider::new("imagen-3").transport, policy);
    }

    #[test]
    fn missing_key_message_names_every_variable() {
        let message = missing_key_message(IMAGEN_KEY_VARS);
        for var in [
            "IMAGEN_API_KEY",
            "GEMINI_API_KEY",
            "GEMINI_API_KEY_VERCEL",
            "API_KEY",
            "GOOGLE_API_KEY",
        ] {
            assert!(message.contains(var), "{message}");
        }
        assert!(!missing_key_message(GEMINI_KEY_VARS).contains("IMAGEN"));
        assert!(api_key_from_env(&["ATELIER_TEST_UNSET_KEY_VAR"]).is_err());
    }
}
