pub mod settings;

pub use settings::{MemoryConfig, PromptsConfig, ServerConfig, Settings, UpstreamConfig};
