use super::instructions::{
    INITIAL_ANALYSIS_MARKER, PROMPTS_MARKER, QUESTIONS_MARKER, REFINED_ANALYSIS_MARKER,
};

/// Shape of a model reply once the persona delimiters have been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// Step 1: Aura's first read of a moodboard plus clarifying questions.
    InitialAnalysis {
        analysis: String,
        questions: Vec<String>,
    },
    /// Step 2: Aura's refined analysis and Muse's image prompts.
    RefinedAnalysis {
        analysis: String,
        prompts: Vec<String>,
    },
    General {
        text: String,
    },
}

impl ParsedReply {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InitialAnalysis { .. } => "initial_analysis",
            Self::RefinedAnalysis { .. } => "refined_analysis",
            Self::General { .. } => "general",
        }
    }
}

pub fn parse_reply(text: &str) -> ParsedReply {
    if text.contains(INITIAL_ANALYSIS_MARKER) && text.contains(QUESTIONS_MARKER) {
        let (analysis, items) = split_tagged(text, INITIAL_ANALYSIS_MARKER, QUESTIONS_MARKER);
        return ParsedReply::InitialAnalysis {
            analysis,
            questions: items,
        };
    }
    if text.contains(REFINED_ANALYSIS_MARKER) && text.contains(PROMPTS_MARKER) {
        let (analysis, items) = split_tagged(text, REFINED_ANALYSIS_MARKER, PROMPTS_MARKER);
        return ParsedReply::RefinedAnalysis {
            analysis,
            prompts: items,
        };
    }
    ParsedReply::General {
        text: text.to_string(),
    }
}

// The head is everything before the first list marker with the first heading
// removed; the list is the segment between the first and second list marker.
fn split_tagged(text: &str, heading: &str, list_marker: &str) -> (String, Vec<String>) {
    let mut segments = text.split(list_marker);
    let head = segments.next().unwrap_or_default();
    let list = segments.next().unwrap_or_default();
    let analysis = head.replacen(heading, "", 1).trim().to_string();
    (analysis, split_numbered_items(list.trim()))
}

/// Splits `1. foo 2. bar` style lists into their items.
///
/// A marker is a run of ASCII digits followed by `.` and one whitespace
/// character, where the run is not glued to a preceding letter or digit
/// (`**1. ` and `:1. ` count, `v2. ` does not). Pieces are trimmed of
/// whitespace and markdown emphasis, and empty pieces dropped, so text ahead
/// of the first marker survives as an item of its own.
pub fn split_numbered_items(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut pieces: Vec<&str> = Vec::new();
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        let at_boundary = idx == 0 || !bytes[idx - 1].is_ascii_alphanumeric();
        if !(bytes[idx].is_ascii_digit() && at_boundary) {
            idx += 1;
            continue;
        }
        let mut end = idx;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        let is_marker =
            end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_whitespace();
        if is_marker {
            pieces.push(&text[start..idx]);
            idx = end + 2;
            start = idx;
        } else {
            idx = end;
        }
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(|piece| piece.trim_matches(is_item_padding))
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_item_padding(ch: char) -> bool {
    ch.is_whitespace() || ch == '*' || ch == '_'
}
