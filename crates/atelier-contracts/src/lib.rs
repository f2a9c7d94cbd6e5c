pub mod agents;
pub mod chat;
pub mod events;
pub mod messages;
pub mod models;
pub mod runs;
