#[cfg(feature = "gemini")]
pub mod client;
pub mod extractor;
pub mod prompts;
#[cfg(feature = "gemini")]
pub mod types;

#[cfg(feature = "gemini")]
pub use client::*;
pub use extractor::*;
pub use prompts::*;

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation service that answers a prompt with free-form text.
///
/// Calls may fail or be slow; callers own pacing and treat errors per call.
#[async_trait]
pub trait PriceGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<G: PriceGenerator + ?Sized> PriceGenerator for &G {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}
