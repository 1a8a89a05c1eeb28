//! Client for the Ollama model-serving daemon (`/api/generate`, non-streaming).

pub mod client;
pub mod types;

pub use client::{ModelClient, OllamaClient, OllamaError};
pub use types::{GenerateOptions, GenerateRequest, GenerateResponse};
