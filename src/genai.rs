//! Generative-AI collaborator.
//!
//! Handlers talk to the provider through [`GenAiClient`], held in
//! `AppState` so tests can swap in a scripted client.

mod client;
mod gemini;
pub mod prompts;
pub mod schemas;

#[cfg(test)]
pub mod mock;

pub use client::{parse_json, Attachment, GenAiClient, GenAiError, GenerateRequest};
pub use gemini::GeminiClient;
