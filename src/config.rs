use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub genai_api_key: Option<String>,
    pub genai_model: String,
    pub genai_base_url: String,
    pub genai_max_retries: u32,
    pub genai_base_delay_ms: u64,
    pub genai_timeout_secs: u64,
    pub public_rps: u32,
    pub max_upload_bytes: usize,
    pub question_time_limit_secs: i64,
    pub deadline_sweep_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let server_address = match env::var("SERVER_ADDRESS") {
            Ok(addr) => addr,
            Err(_) => format!("0.0.0.0:{}", get_env_or("PORT", 3000u16)?),
        };

        Ok(Self {
            server_address,
            genai_api_key: ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"]
                .iter()
                .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty())),
            genai_model: env::var("GENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            genai_base_url: env::var("GENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GENAI_BASE_URL.to_string()),
            genai_max_retries: get_env_or("GENAI_MAX_RETRIES", 4)?,
            genai_base_delay_ms: get_env_or("GENAI_BASE_DELAY_MS", 500)?,
            genai_timeout_secs: get_env_or("GENAI_TIMEOUT_SECS", 60)?,
            public_rps: get_env_or("PUBLIC_RPS", 50)?,
            max_upload_bytes: get_env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            question_time_limit_secs: get_env_or("QUESTION_TIME_LIMIT_SECS", 600)?,
            deadline_sweep_secs: get_env_or("DEADLINE_SWEEP_SECS", 5)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:3000".to_string(),
            genai_api_key: None,
            genai_model: DEFAULT_MODEL.to_string(),
            genai_base_url: DEFAULT_GENAI_BASE_URL.to_string(),
            genai_max_retries: 4,
            genai_base_delay_ms: 500,
            genai_timeout_secs: 60,
            public_rps: 50,
            max_upload_bytes: 10 * 1024 * 1024,
            question_time_limit_secs: 600,
            deadline_sweep_secs: 5,
        }
    }
}

fn get_env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
