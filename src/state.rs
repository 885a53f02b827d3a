use std::{sync::Arc, time::Duration};

use tracing::info;

use crate::ai::{
    classifier::ChexnetClient, openai::OpenAiClient, toolkit::ToolkitClient, Analyzer, ChatClient,
    ClassifierClient, SpeechClient,
};
use crate::auth::{
    otp::{LogMailer, OtpMailer},
    repo::{PgUserRepo, UserRepo},
};
use crate::config::{AppConfig, LlmProvider};
use crate::db;
use crate::history::repo::{AnalysisRepo, PgAnalysisRepo};
use crate::storage::{Storage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub analyses: Arc<dyn AnalysisRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn OtpMailer>,
    pub chat: Arc<dyn ChatClient>,
    pub speech: Arc<dyn SpeechClient>,
    pub classifier: Arc<dyn ClassifierClient>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;
        db::migrate(&db).await;

        // Реальный S3/MinIO
        let storage = Arc::new(Storage::from_config(&config).await?) as Arc<dyn StorageClient>;

        let timeout = Duration::from_secs(config.llm.timeout_secs);
        let openai = Arc::new(OpenAiClient::new(&config.openai, &config.llm.model, timeout)?);
        let chat: Arc<dyn ChatClient> = match config.llm.provider {
            LlmProvider::Toolkit => Arc::new(ToolkitClient::new(
                &config.llm.endpoint,
                config.llm.api_key.clone(),
                timeout,
            )?),
            LlmProvider::OpenAi => openai.clone(),
        };
        info!(provider = ?config.llm.provider, model = %config.llm.model, "chat provider selected");

        let classifier = Arc::new(ChexnetClient::new(&config.classifier_url, timeout)?);

        Ok(Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            analyses: Arc::new(PgAnalysisRepo::new(db)),
            storage,
            mailer: Arc::new(LogMailer),
            analyzer: Arc::new(Analyzer::new(chat.clone(), timeout)),
            chat,
            speech: openai,
            classifier,
            config,
        })
    }

    /// Per-call bound for every provider request.
    pub fn call_timeout(&self) -> Duration {
        self.analyzer.call_timeout()
    }
}
