//! AI Integration Layer
//!
//! Text-generation providers, the fallback chain that drives them, and the
//! prompt builder used to talk to them.

pub mod prompt;
pub mod provider;
pub mod timeout;

pub use prompt::{PromptBuilder, PromptSection};
pub use provider::{
    ChainAttempt, ChainConfig, ChainOutcome, ChainStats, ChainStep, ClaudeCodeProvider,
    GenerationOptions, OllamaProvider, OpenAiProvider, ProviderAdapter, ProviderChain,
    ProviderConfig, ProviderHealth, SharedProvider, Sleeper, TextProvider, TokioSleeper,
    create_provider,
};
pub use timeout::with_timeout;
