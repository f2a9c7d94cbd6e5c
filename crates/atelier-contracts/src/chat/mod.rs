mod command_registry;
pub mod instructions;
mod intent_parser;
mod reply_parser;

pub use command_registry::CHAT_HELP_COMMANDS;
pub use intent_parser::{parse_intent, Intent};
pub use reply_parser::{parse_reply, split_numbered_items, ParsedReply};
