//! Prompt templates. Renders the document analysis and embedding summary
//! prompts from typed inputs.
//!
//! Rendering is pure string construction: no I/O, no shared state, safe to call
//! from any number of tasks at once. Truncating content to the preview length is
//! the caller's job (see [`truncate_preview`]); the engine renders what it is given.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod templates;

pub use templates::{
    ANALYZE_FILE_PROMPT_TEMPLATE, ANALYZE_FILE_SYSTEM, EMBEDDING_SUMMARY_PROMPT_TEMPLATE,
    EMBEDDING_SUMMARY_SYSTEM,
};

/// Number of content characters the analyze-file template advertises.
pub const CONTENT_PREVIEW_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("missing required metadata field: {field}")]
    MissingField { field: &'static str },

    #[error("content is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Encoding { valid_up_to: usize },
}

/// Metadata describing the document being analyzed. All fields are required.
///
/// Deserializing goes through [`MetadataFields`] so that an absent field is
/// reported as [`PromptError::MissingField`] rather than a generic serde error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetadataFields")]
pub struct DocumentMetadata {
    pub current_name: String,
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// ISO-8601 recommended.
    pub created_date: String,
}

/// Loosely-typed metadata as it arrives from a caller, before required-field checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataFields {
    pub current_name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub created_date: Option<String>,
}

impl DocumentMetadata {
    pub fn new(
        current_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        created_date: impl Into<String>,
    ) -> Self {
        Self {
            current_name: current_name.into(),
            mime_type: mime_type.into(),
            size,
            created_date: created_date.into(),
        }
    }
}

impl TryFrom<MetadataFields> for DocumentMetadata {
    type Error = PromptError;

    fn try_from(fields: MetadataFields) -> Result<Self, Self::Error> {
        Ok(Self {
            current_name: fields.current_name.ok_or(PromptError::MissingField {
                field: "current_name",
            })?,
            mime_type: fields.mime_type.ok_or(PromptError::MissingField {
                field: "mime_type",
            })?,
            size: fields.size.ok_or(PromptError::MissingField { field: "size" })?,
            created_date: fields.created_date.ok_or(PromptError::MissingField {
                field: "created_date",
            })?,
        })
    }
}

/// Renders the analyze-file prompt.
///
/// `content` may be text or raw bytes; bytes must be valid UTF-8. The caller is
/// expected to have cut it to [`CONTENT_PREVIEW_CHARS`] already.
pub fn render_analyze_file_prompt(
    metadata: &DocumentMetadata,
    content: impl AsRef<[u8]>,
) -> Result<String, PromptError> {
    let content = decode(content.as_ref())?;
    let size = metadata.size.to_string();

    Ok(fill(
        ANALYZE_FILE_PROMPT_TEMPLATE,
        &[
            ("current_name", metadata.current_name.as_str()),
            ("mime_type", metadata.mime_type.as_str()),
            ("size", size.as_str()),
            ("created_date", metadata.created_date.as_str()),
            ("content", content),
        ],
    ))
}

/// Renders the embedding summary prompt. No length limit applies to `content`.
pub fn render_embedding_summary_prompt(content: impl AsRef<[u8]>) -> Result<String, PromptError> {
    let content = decode(content.as_ref())?;
    Ok(fill(EMBEDDING_SUMMARY_PROMPT_TEMPLATE, &[("content", content)]))
}

/// Returns at most the first `max_chars` characters of `content`.
pub fn truncate_preview(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

fn decode(bytes: &[u8]) -> Result<&str, PromptError> {
    std::str::from_utf8(bytes).map_err(|e| PromptError::Encoding {
        valid_up_to: e.valid_up_to(),
    })
}

/// Single-pass placeholder substitution.
///
/// Substituted values are never rescanned, so a value that itself contains
/// `{content}` lands in the output verbatim. Braces that do not spell a known
/// placeholder (the JSON schema block) pass through unchanged.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];

        let hit = values.iter().find(|(name, _)| {
            tail.starts_with(name) && tail[name.len()..].starts_with('}')
        });

        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
