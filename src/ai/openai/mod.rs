pub mod chat;
pub mod client;

pub use chat::OpenAiChatClient;
