// Adapters layer: concrete implementations for external systems (dataset files, LLM, HTTP, terminal).

pub mod dataset;
pub mod http;
pub mod llm;
pub mod repl;
