//! LLM analysis for the dealscope enrichment pipeline.
//!
//! This crate provides:
//! - [`prompt`] — deterministic analysis-prompt rendering
//! - [`parse`] — tolerant JSON extraction from model text
//! - [`retry`] — the pure retry policy (rate limits vs hard failures)
//! - [`client`] — the chat-completions client ([`LlmClient`])

pub mod client;
pub mod parse;
pub mod prompt;
pub mod retry;

pub use client::{LlmClient, LlmConfig};
pub use parse::extract_json;
pub use prompt::{NO_CONTENT_NOTICE, SYSTEM_PROMPT, build_analysis_prompt};
pub use retry::{AttemptFailure, RetryDecision, RetryPolicy, RetryState};
