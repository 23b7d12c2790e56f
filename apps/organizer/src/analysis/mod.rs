// Document analysis: typed reply schema, analyzer backends, the
// preview/render/submit pipeline and its HTTP handlers.
// All model calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod schema;
pub mod service;
