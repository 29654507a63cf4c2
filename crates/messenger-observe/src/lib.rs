//! Observability for Gemini Messenger: subscriber setup and the GenAI
//! attribute names recorded on LLM spans.

pub mod genai_attrs;
pub mod tracing_setup;
