pub mod completion_client;
pub mod conversation;
pub mod relay;

pub use completion_client::{CompletionProvider, GroqClient};
pub use relay::ChatRelay;
