#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

pub(crate) const RAW_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "text_model",
        action: "set_text_model",
    },
    CommandSpec {
        command: "image_model",
        action: "set_image_model",
    },
];

pub(crate) const ATTACH_IMAGE_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "moodboard",
        action: "attach_image",
    },
    CommandSpec {
        command: "image",
        action: "attach_image",
    },
    CommandSpec {
        command: "upload",
        action: "attach_image",
    },
];

pub(crate) const GENERATE_IMAGE_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "generate",
        action: "generate_image",
    },
    CommandSpec {
        command: "sora",
        action: "generate_image",
    },
];

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "history",
        action: "history",
    },
    CommandSpec {
        command: "prompts",
        action: "prompts",
    },
    CommandSpec {
        command: "questions",
        action: "questions",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
];

pub(crate) const EXPORT_COMMAND: CommandSpec = CommandSpec {
    command: "export",
    action: "export",
};

pub const CHAT_HELP_COMMANDS: &[&str] = &[
    "/moodboard <path> [text]",
    "/generate <n|prompt>",
    "/prompts",
    "/questions",
    "/history",
    "/status",
    "/text_model <name>",
    "/image_model <name>",
    "/export [markdown|json]",
    "/help",
];
