use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub resume_parse_endpoint: String,
    pub questions_endpoint: String,
    pub evaluate_endpoint: String,
    pub data_dir: PathBuf,
    /// Seconds allotted to each question.
    pub question_time_secs: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let question_time_secs = env_or("QUESTION_TIME_SECS", "60")
            .parse::<u32>()
            .context("QUESTION_TIME_SECS must be a whole number of seconds")?;
        if question_time_secs == 0 {
            anyhow::bail!("QUESTION_TIME_SECS must be greater than zero");
        }

        Ok(Config {
            backend_url: require_env("BACKEND_URL")?,
            resume_parse_endpoint: env_or("RESUME_PARSE_ENDPOINT", "/api/resume/parse"),
            questions_endpoint: env_or("QUESTIONS_ENDPOINT", "/api/interview/questions"),
            evaluate_endpoint: env_or("EVALUATE_ENDPOINT", "/api/evaluate"),
            data_dir: PathBuf::from(env_or("DATA_DIR", ".interview")),
            question_time_secs,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
