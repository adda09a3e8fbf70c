pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    genai_client::GenAiClient, interview_service::InterviewService,
    question_service::QuestionService, session_store::SessionStore,
};
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub genai: GenAiClient,
    pub question_service: QuestionService,
    pub interview_service: InterviewService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.genai_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let sessions = SessionStore::new();
        let genai = GenAiClient::from_config(config, http_client);
        let question_service = QuestionService::new(genai.clone());
        let interview_service = InterviewService::new(
            sessions.clone(),
            question_service.clone(),
            config.question_time_limit_secs,
        );

        Ok(Self {
            sessions,
            genai,
            question_service,
            interview_service,
        })
    }
}
