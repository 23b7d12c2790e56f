// Document analysis prompt templates.
// Wording is consumed by downstream tooling verbatim; edit with care.

/// System prompt sent alongside the analyze-file template.
pub const ANALYZE_FILE_SYSTEM: &str = "\
You are a meticulous document classifier for a file organization service. \
You MUST respond with valid JSON only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

/// System prompt sent alongside the embedding summary template.
pub const EMBEDDING_SUMMARY_SYSTEM: &str = "\
You write dense, factual summaries of documents for semantic search indexes. \
Respond with the summary text only, without headings or preamble.";

/// Analyze-file template.
/// Replace: {current_name}, {mime_type}, {size}, {created_date}, {content}
pub const ANALYZE_FILE_PROMPT_TEMPLATE: &str = r#"
Analyze this document and provide:
1. Document type (invoice, contract, report, email, presentation, other)
2. Suggested filename (max 50 chars, descriptive, no special chars except _ and -)
3. Suggested folder path (logical categorization)
4. Extracted entities:
   - dates (ISO format)
   - monetary amounts
   - company/organization names
   - people names
   - any other relevant entities
5. 3-5 relevant tags
6. Brief summary (2-3 sentences)

Document metadata:
- Current name: {current_name}
- File type: {mime_type}
- Size: {size}
- Created: {created_date}

Document content preview (first 5000 chars):
{content}

Return response as JSON:
{
  "doc_type": "string",
  "suggested_name": "string",
  "suggested_path": "string",
  "entities": {
    "dates": [],
    "amounts": [],
    "companies": [],
    "people": [],
    "custom": {}
  },
  "tags": [],
  "summary": "string",
  "confidence": 0.0
}
"#;

/// Embedding summary template. Replace `{content}` before sending.
pub const EMBEDDING_SUMMARY_PROMPT_TEMPLATE: &str = r#"
Generate a semantic summary of this document for vector search.
Focus on: topic, purpose, key entities, and context.
Keep it concise but comprehensive (2-3 paragraphs max).

{content}
"#;

#[cfg(test)]
/// The literal response schema block embedded in the analyze-file template.
pub fn analyze_file_schema_block() -> &'static str {
    let start = ANALYZE_FILE_PROMPT_TEMPLATE
        .find("Return response as JSON:\n")
        .map(|i| i + "Return response as JSON:\n".len())
        .unwrap_or(0);
    ANALYZE_FILE_PROMPT_TEMPLATE[start..].trim_end()
}
