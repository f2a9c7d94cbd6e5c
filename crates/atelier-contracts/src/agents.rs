use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
///
/// The personas (Aura, Muse, Sora, Gemini) are roles the same text model is
/// asked to play through the system instruction, not separate processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentName {
    User,
    Aura,
    Muse,
    Sora,
    Gemini,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDefinition {
    pub name: AgentName,
    pub description: &'static str,
}

pub const AGENT_DEFINITIONS: &[AgentDefinition] = &[
    AgentDefinition {
        name: AgentName::Aura,
        description: "Design expert analyzing aesthetics.",
    },
    AgentDefinition {
        name: AgentName::Muse,
        description: "Creative writer generating prompts.",
    },
    AgentDefinition {
        name: AgentName::Sora,
        description: "Visionary artist generating images.",
    },
    AgentDefinition {
        name: AgentName::Gemini,
        description: "Helpful assistant for your questions.",
    },
];

impl AgentName {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Aura => "Aura",
            Self::Muse => "Muse",
            Self::Sora => "Sora",
            Self::Gemini => "Gemini",
            Self::System => "System",
        }
    }

    /// Personas whose text was written by the model and belongs in its history.
    pub fn is_model_persona(self) -> bool {
        matches!(self, Self::Aura | Self::Muse | Self::Gemini)
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
