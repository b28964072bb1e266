//! One method per backend endpoint, returning wire types.

use crate::error::ClientResult;
use crate::http::HttpBackend;
use crate::models::{AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse, HealthResponse};

use super::CompanionClient;

impl<B: HttpBackend> CompanionClient<B> {
    pub(crate) async fn post_analyze(&self, text: &str) -> ClientResult<AnalyzeResponse> {
        let url = self.endpoint("analyze")?;
        self.backend.post_json(&url, &AnalyzeRequest { text }).await
    }

    pub(crate) async fn post_chat(&self, message: &str) -> ClientResult<ChatResponse> {
        let url = self.endpoint("chat")?;
        self.backend.post_json(&url, &ChatRequest { message }).await
    }

    pub(crate) async fn get_health(&self) -> ClientResult<HealthResponse> {
        let url = self.endpoint("health")?;
        self.backend.get_json(&url).await
    }
}
