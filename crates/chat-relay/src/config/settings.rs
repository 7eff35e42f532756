use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder replaced with the caller's `user_name` in the default prompt.
pub const USER_NAME_PLACEHOLDER: &str = "{{USER_NAME}}";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub memory: MemoryConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    /// 0 = wait forever
    pub timeout_seconds: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: String::new(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemoryConfig {
    pub max_turns: usize,
    /// 0 = keep idle histories forever
    pub idle_ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl MemoryConfig {
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.idle_ttl_seconds > 0).then(|| Duration::from_secs(self.idle_ttl_seconds))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 15,
            idle_ttl_seconds: 6 * 60 * 60,
            sweep_interval_seconds: 300,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    pub default_system_prompt: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            default_system_prompt: format!(
                "Sen EnForce Discord botusun. Kullanıcı adı: {USER_NAME_PLACEHOLDER}.\n\
                 Dostane, yardımsever ve gerektiğinde hafif sarkastik ol.\n\
                 Komutlar ve hata çözümü hakkında bilgi ver."
            ),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .set_override_option("upstream.api_key", std::env::var("GROQ_API_KEY").ok())?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
