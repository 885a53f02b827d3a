//! Hosted AI providers and the analysis workflow built on them.

pub mod classifier;
pub mod client;
pub mod openai;
pub mod orchestrator;
pub mod prompts;
pub mod suggestion;
pub mod toolkit;

pub use client::{ChatClient, ClassifierClient, SpeechClient};
pub use orchestrator::Analyzer;
