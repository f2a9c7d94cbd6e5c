use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use atelier_contracts::agents::{AgentName, AGENT_DEFINITIONS};
use atelier_contracts::chat::{parse_intent, CHAT_HELP_COMMANDS};
use atelier_contracts::messages::ChatMessage;
use atelier_contracts::runs::export::export_markdown;
use atelier_contracts::runs::transcript::Transcript;
use atelier_engine::{CreativeSession, MoodboardUpload};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(
    name = "atelier",
    version,
    about = "Multi-persona creative assistant: moodboard analysis, prompts and images"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat(ChatArgs),
    Ask(AskArgs),
    Moodboard(MoodboardArgs),
    Export(ExportArgs),
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
}

#[derive(Debug, Parser)]
struct AskArgs {
    #[arg(long)]
    prompt: String,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    text_model: Option<String>,
}

#[derive(Debug, Parser)]
struct MoodboardArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    text_model: Option<String>,
}

#[derive(Debug, Parser)]
struct ExportArgs {
    #[arg(long)]
    session: PathBuf,
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value = "markdown")]
    format: String,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("atelier error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    match cli.command {
        Command::Chat(args) => {
            run_chat(args)?;
            Ok(0)
        }
        Command::Ask(args) => run_ask(args),
        Command::Moodboard(args) => run_moodboard(args),
        Command::Export(args) => run_export(args),
    }
}

fn run_chat(args: ChatArgs) -> Result<()> {
    let mut session = CreativeSession::open(
        &args.out,
        args.events.clone(),
        args.text_model.as_deref(),
        args.image_model.as_deref(),
    )?;

    let stdin = io::stdin();
    let mut line = String::new();

    println!("Atelier chat started. Type /help for commands.");
    for message in session.messages() {
        print_message(message);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        let intent = parse_intent(input);
        match intent.action.as_str() {
            "noop" => continue,
            "help" => {
                println!("Commands: {}", CHAT_HELP_COMMANDS.join(" "));
                println!("Team:");
                for entry in team_lines() {
                    println!("  {entry}");
                }
            }
            "history" => {
                for message in session.messages() {
                    print_message(message);
                }
            }
            "questions" => match session.latest_questions() {
                Some(questions) => print_numbered("Questions", questions),
                None => println!("No questions yet. Upload a moodboard with /moodboard <path>."),
            },
            "prompts" => match session.latest_prompts() {
                Some(prompts) => print_numbered("Prompts", prompts),
                None => println!("No prompts yet. Answer Aura's questions first."),
            },
            "status" => {
                println!("Session: {}", session.session_id());
                println!("Directory: {}", session.session_dir().display());
                println!("Phase: {}", session.phase().as_str());
                println!("Text model: {}", session.text_model());
                println!("Image model: {}", session.image_model());
                println!("Messages: {}", session.messages().len());
            }
            "set_text_model" => {
                let Some(model) = value_as_non_empty_string(intent.command_args.get("model"))
                else {
                    println!("Text model: {}", session.text_model());
                    continue;
                };
                if let Some(reason) = session.set_text_model(&model)? {
                    println!("{reason}");
                }
                println!("Text model set to {}", session.text_model());
            }
            "set_image_model" => {
                let Some(model) = value_as_non_empty_string(intent.command_args.get("model"))
                else {
                    println!("Image model: {}", session.image_model());
                    continue;
                };
                if let Some(reason) = session.set_image_model(&model)? {
                    println!("{reason}");
                }
                println!("Image model set to {}", session.image_model());
            }
            "attach_image" => {
                let Some(path) = value_as_non_empty_string(intent.command_args.get("path")) else {
                    println!("/moodboard requires an image path");
                    continue;
                };
                let upload = match MoodboardUpload::from_path(Path::new(&path)) {
                    Ok(upload) => upload,
                    Err(err) => {
                        println!("Could not read image: {err:#}");
                        continue;
                    }
                };
                let text = intent.prompt.clone().unwrap_or_default();
                for message in session.send_message(&text, Some(upload))?.iter().skip(1) {
                    print_message(message);
                }
            }
            "generate_image" => {
                let prompt = match generate_target(&intent.command_args, intent.prompt.as_deref())
                {
                    GenerateTarget::Prompt(prompt) => prompt,
                    GenerateTarget::Index(index) => match session.prompt_by_index(index) {
                        Some(prompt) => prompt,
                        None => {
                            println!("No prompt #{index}. Use /prompts to list them.");
                            continue;
                        }
                    },
                    GenerateTarget::Missing => {
                        println!("/generate requires a prompt number or text");
                        continue;
                    }
                };
                let result = session.generate_image(&prompt)?;
                print_message(&result);
            }
            "export" => {
                let format = value_as_non_empty_string(intent.command_args.get("format"))
                    .unwrap_or_else(|| "markdown".to_string());
                let Some(extension) = export_extension(&format) else {
                    println!("Unknown export format '{format}'. Use markdown or json.");
                    continue;
                };
                let out = session.session_dir().join(format!("transcript.{extension}"));
                let rendered = render_export(&format, session.session_id(), session.messages())?;
                fs::write(&out, rendered)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Exported to {}", out.display());
            }
            "unknown" => {
                let command = value_as_non_empty_string(intent.command_args.get("command"))
                    .unwrap_or_default();
                println!("Unknown command: /{command}. Type /help for commands.");
            }
            _ => {
                let text = intent.prompt.clone().unwrap_or_else(|| input.to_string());
                for message in session.send_message(&text, None)?.iter().skip(1) {
                    print_message(message);
                }
            }
        }
    }

    let summary = session.finish()?;
    println!(
        "Session saved: {} messages, {} images ({})",
        summary.total_messages,
        summary.images_generated,
        session.session_dir().display()
    );
    Ok(())
}

fn run_ask(args: AskArgs) -> Result<i32> {
    let mut session =
        CreativeSession::open(&args.out, args.events, args.text_model.as_deref(), None)?;
    let added = session.send_message(&args.prompt, None)?;
    session.finish()?;
    print_replies(&added)
}

fn run_moodboard(args: MoodboardArgs) -> Result<i32> {
    if !args.image.exists() {
        bail!("moodboard image not found: {}", args.image.display());
    }
    let upload = MoodboardUpload::from_path(&args.image)?;
    let mut session =
        CreativeSession::open(&args.out, args.events, args.text_model.as_deref(), None)?;
    let added = session.send_message(args.text.as_deref().unwrap_or_default(), Some(upload))?;
    session.finish()?;
    print_replies(&added)
}

fn run_export(args: ExportArgs) -> Result<i32> {
    let transcript_path = args.session.join("transcript.json");
    if !transcript_path.exists() {
        bail!("no transcript at {}", transcript_path.display());
    }
    let transcript = Transcript::load(&transcript_path);
    let rendered = render_export(&args.format, &transcript.session_id, &transcript.messages)?;
    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.out, rendered)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Exported to {}", args.out.display());
    Ok(0)
}

/// Prints everything after the user's own bubble. A System reply means the
/// backend failed, which is reported through the exit code.
fn print_replies(added: &[ChatMessage]) -> Result<i32> {
    let mut failed = false;
    for message in added.iter().skip(1) {
        print_message(message);
        failed |= message.sender == AgentName::System;
    }
    Ok(if failed { 2 } else { 0 })
}

fn print_message(message: &ChatMessage) {
    println!("{}", format_message(message));
}

fn format_message(message: &ChatMessage) -> String {
    let mut out = format!("[{}] {}", message.sender, message.text.trim());
    if let Some(url) = message.image_url.as_deref() {
        if url.starts_with("data:") {
            out.push_str("\n  (inline image)");
        } else {
            out.push_str(&format!("\n  image: {url}"));
        }
    }
    for items in [message.questions.as_deref(), message.prompts.as_deref()]
        .into_iter()
        .flatten()
    {
        for (idx, item) in items.iter().enumerate() {
            out.push_str(&format!("\n  {}. {}", idx + 1, item));
        }
    }
    out
}

fn team_lines() -> Vec<String> {
    AGENT_DEFINITIONS
        .iter()
        .map(|def| format!("{}: {}", def.name, def.description))
        .collect()
}

fn print_numbered(title: &str, items: &[String]) {
    println!("{title}:");
    for (idx, item) in items.iter().enumerate() {
        println!("  {}. {}", idx + 1, item);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum GenerateTarget {
    Index(usize),
    Prompt(String),
    Missing,
}

fn generate_target(
    command_args: &std::collections::BTreeMap<String, Value>,
    prompt: Option<&str>,
) -> GenerateTarget {
    if let Some(index) = command_args.get("index").and_then(Value::as_u64) {
        return GenerateTarget::Index(index as usize);
    }
    match prompt.map(str::trim).filter(|value| !value.is_empty()) {
        Some(prompt) => GenerateTarget::Prompt(prompt.to_string()),
        None => GenerateTarget::Missing,
    }
}

fn export_extension(format: &str) -> Option<&'static str> {
    match format {
        "markdown" | "md" => Some("md"),
        "json" => Some("json"),
        _ => None,
    }
}

fn render_export(format: &str, session_id: &str, messages: &[ChatMessage]) -> Result<String> {
    match export_extension(format) {
        Some("md") => Ok(export_markdown(
            &format!("Atelier session {session_id}"),
            messages,
        )),
        Some(_) => Ok(serde_json::to_string_pretty(&json!({
            "session_id": session_id,
            "messages": messages,
        }))?),
        None => bail!("unknown export format '{format}' (expected markdown or json)"),
    }
}

fn value_as_non_empty_string(value: Option<&Value>) -> Option<String> {
    let raw = value
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
