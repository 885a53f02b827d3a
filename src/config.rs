use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Which hosted chat endpoint handles vision, translation and suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Toolkit,
    OpenAi,
}

impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toolkit" => Ok(Self::Toolkit),
            "openai" => Ok(Self::OpenAi),
            other => anyhow::bail!("unknown LLM_PROVIDER '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub tts_model: String,
    pub tts_voice: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
    pub openai: OpenAiConfig,
    pub classifier_url: String,
    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: var_or("JWT_ISSUER", "mediview"),
            audience: var_or("JWT_AUDIENCE", "mediview-users"),
            ttl_minutes: parsed_or("JWT_TTL_MINUTES", 60 * 24 * 7),
        };
        let llm = LlmConfig {
            provider: var_or("LLM_PROVIDER", "toolkit").parse()?,
            endpoint: var_or("LLM_ENDPOINT", "https://toolkit.rork.com/text/llm/"),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            model: var_or("LLM_MODEL", "gpt-4o-mini"),
            timeout_secs: parsed_or("LLM_TIMEOUT_SECS", 60),
        };
        let openai = OpenAiConfig {
            api_key: var_or("OPENAI_API_KEY", ""),
            base_url: var_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            tts_model: var_or("TTS_MODEL", "tts-1"),
            tts_voice: var_or("TTS_VOICE", "alloy"),
        };
        Ok(Self {
            database_url,
            jwt,
            llm,
            openai,
            classifier_url: var_or("CHEXNET_MICROSERVICE_URL", "http://localhost:8000/predict"),
            minio_endpoint: std::env::var("MINIO_ENDPOINT").context("MINIO_ENDPOINT")?,
            minio_bucket: std::env::var("MINIO_BUCKET").context("MINIO_BUCKET")?,
            minio_access_key: std::env::var("MINIO_ACCESS_KEY").context("MINIO_ACCESS_KEY")?,
            minio_secret_key: std::env::var("MINIO_SECRET_KEY").context("MINIO_SECRET_KEY")?,
        })
    }
}
