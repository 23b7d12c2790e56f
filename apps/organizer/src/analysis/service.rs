//! Document analysis pipeline: preview → render → submit → validate.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::analyzer::DocumentAnalyzer;
use crate::analysis::schema::{
    sanitize_suggested_name, validate_analysis, AnalysisResult, SchemaValidation,
};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::prompts::{
    render_analyze_file_prompt, render_embedding_summary_prompt, truncate_preview,
    DocumentMetadata, CONTENT_PREVIEW_CHARS,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis: AnalysisResult,
    pub validation: SchemaValidation,
    /// Cleaned-up `suggested_name`, present only when the model's name breaks the
    /// rules and something usable is left after cleaning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_name: Option<String>,
    /// True when content was cut to the preview length before rendering.
    pub content_truncated: bool,
    pub backend: String,
}

/// Analyzes one document. Content is cut to [`CONTENT_PREVIEW_CHARS`] here,
/// since the template advertises a preview and the renderer does not enforce it.
pub async fn analyze_document(
    analyzer: &dyn DocumentAnalyzer,
    metadata: &DocumentMetadata,
    content: &str,
) -> Result<AnalysisReport, AppError> {
    let preview = truncate_preview(content, CONTENT_PREVIEW_CHARS);
    let content_truncated = preview.len() < content.len();

    let prompt = render_analyze_file_prompt(metadata, preview)?;
    debug!(
        name = %metadata.current_name,
        prompt_len = prompt.len(),
        content_truncated,
        "analyze-file prompt rendered"
    );

    let analysis = analyzer.analyze(&prompt).await?;
    let validation = validate_analysis(&analysis);
    let sanitized_name = Some(sanitize_suggested_name(&analysis.suggested_name))
        .filter(|name| !name.is_empty() && *name != analysis.suggested_name);

    info!(
        name = %metadata.current_name,
        doc_type = ?analysis.doc_type,
        confidence = analysis.confidence,
        violations = validation.violations.len(),
        "document analyzed"
    );

    Ok(AnalysisReport {
        analysis,
        validation,
        sanitized_name,
        content_truncated,
        backend: analyzer.backend().to_string(),
    })
}

/// Produces a semantic summary for a vector index.
pub async fn summarize_for_embedding(
    analyzer: &dyn DocumentAnalyzer,
    content: &str,
) -> Result<String, AppError> {
    let prompt = render_embedding_summary_prompt(content)?;
    let summary = analyzer.summarize(&prompt).await?;
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(AppError::Llm(LlmError::EmptyContent));
    }
    debug!(summary_len = summary.len(), "embedding summary produced");
    Ok(summary.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::schema::{DocType, Entities};

    /// Analyzer double that records prompts and returns canned replies.
    pub(crate) struct StubAnalyzer {
        pub reply: AnalysisResult,
        pub summary: String,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubAnalyzer {
        pub(crate) fn new() -> Self {
            Self {
                reply: AnalysisResult {
                    doc_type: DocType::Invoice,
                    suggested_name: "acme_invoice_1002".to_string(),
                    suggested_path: "Finance/Invoices".to_string(),
                    entities: Entities {
                        dates: vec!["2024-04-01".to_string()],
                        ..Entities::default()
                    },
                    tags: vec!["invoice".into(), "acme".into(), "finance".into()],
                    summary: "Invoice from Acme Corp.".to_string(),
                    confidence: 0.9,
                },
                summary: "  Acme invoice for consulting services.  ".to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl DocumentAnalyzer for StubAnalyzer {
        async fn analyze(&self, prompt: &str) -> Result<AnalysisResult, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }

        async fn summarize(&self, prompt: &str) -> Result<String, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.summary.clone())
        }

        fn backend(&self) -> &'static str {
            "stub"
        }
    }

    fn metadata() -> DocumentMetadata {
        DocumentMetadata::new("scan.txt", "text/plain", 12, "2024-03-15")
    }

    #[tokio::test]
    async fn test_analyze_document_returns_validated_report() {
        let stub = StubAnalyzer::new();
        let report = analyze_document(&stub, &metadata(), "Invoice #1002").await.unwrap();
        assert!(report.validation.passed);
        assert!(!report.content_truncated);
        assert_eq!(report.backend, "stub");
        assert!(report.sanitized_name.is_none());
        assert!(stub.last_prompt().contains("Current name: scan.txt"));
    }

    #[tokio::test]
    async fn test_analyze_document_truncates_to_preview() {
        let stub = StubAnalyzer::new();
        let content = format!("{}{}", "a".repeat(CONTENT_PREVIEW_CHARS), "TAIL");
        let report = analyze_document(&stub, &metadata(), &content).await.unwrap();
        assert!(report.content_truncated);
        let prompt = stub.last_prompt();
        assert!(prompt.contains(&"a".repeat(CONTENT_PREVIEW_CHARS)));
        assert!(!prompt.contains("TAIL"));
    }

    #[tokio::test]
    async fn test_analyze_document_exact_preview_not_truncated() {
        let stub = StubAnalyzer::new();
        let content = "ü".repeat(CONTENT_PREVIEW_CHARS);
        let report = analyze_document(&stub, &metadata(), &content).await.unwrap();
        assert!(!report.content_truncated);
    }

    #[tokio::test]
    async fn test_analyze_document_reports_violations() {
        let mut stub = StubAnalyzer::new();
        stub.reply.tags.clear();
        let report = analyze_document(&stub, &metadata(), "x").await.unwrap();
        assert!(!report.validation.passed);
        assert_eq!(report.validation.violations[0].field, "tags");
    }

    #[tokio::test]
    async fn test_analyze_document_offers_sanitized_name() {
        let mut stub = StubAnalyzer::new();
        stub.reply.suggested_name = "Acme Invoice #1002.pdf".to_string();
        let report = analyze_document(&stub, &metadata(), "x").await.unwrap();
        assert!(!report.validation.passed);
        assert_eq!(report.sanitized_name.as_deref(), Some("Acme_Invoice__1002_pdf"));
        assert_eq!(report.analysis.suggested_name, "Acme Invoice #1002.pdf");
    }

    #[tokio::test]
    async fn test_analyze_document_omits_empty_sanitized_name() {
        let mut stub = StubAnalyzer::new();
        stub.reply.suggested_name = "   ".to_string();
        let report = analyze_document(&stub, &metadata(), "x").await.unwrap();
        assert!(!report.validation.passed);
        assert!(report.sanitized_name.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("sanitized_name").is_none());
    }

    #[tokio::test]
    async fn test_summarize_trims_reply() {
        let stub = StubAnalyzer::new();
        let summary = summarize_for_embedding(&stub, "Acme invoice").await.unwrap();
        assert_eq!(summary, "Acme invoice for consulting services.");
        assert!(stub.last_prompt().ends_with("\n\nAcme invoice\n"));
    }

    #[tokio::test]
    async fn test_summarize_rejects_blank_reply() {
        let mut stub = StubAnalyzer::new();
        stub.summary = "   ".to_string();
        let err = summarize_for_embedding(&stub, "x").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
