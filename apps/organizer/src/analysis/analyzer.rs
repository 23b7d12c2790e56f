//! Pluggable analyzer backend. Submits rendered prompts and returns typed replies.
//!
//! `AppState` holds an `Arc<dyn DocumentAnalyzer>`; the default is `LlmAnalyzer`.

use async_trait::async_trait;

use crate::analysis::schema::AnalysisResult;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::prompts::{ANALYZE_FILE_SYSTEM, EMBEDDING_SUMMARY_SYSTEM};

#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Submits a rendered analyze-file prompt and parses the reply.
    async fn analyze(&self, prompt: &str) -> Result<AnalysisResult, AppError>;

    /// Submits a rendered embedding summary prompt and returns the summary text.
    async fn summarize(&self, prompt: &str) -> Result<String, AppError>;

    /// Short name for logs and responses.
    fn backend(&self) -> &'static str;
}

/// Claude-backed analyzer.
pub struct LlmAnalyzer {
    llm: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl DocumentAnalyzer for LlmAnalyzer {
    async fn analyze(&self, prompt: &str) -> Result<AnalysisResult, AppError> {
        Ok(self
            .llm
            .complete_json::<AnalysisResult>(prompt, ANALYZE_FILE_SYSTEM)
            .await?)
    }

    async fn summarize(&self, prompt: &str) -> Result<String, AppError> {
        Ok(self
            .llm
            .complete_text(prompt, EMBEDDING_SUMMARY_SYSTEM)
            .await?)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}
