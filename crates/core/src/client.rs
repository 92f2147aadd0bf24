//! The text generation capability the controller depends on.

use crate::error::GenerationFailure;
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can turn a prompt into generated text.
///
/// Implementations own their transport, authentication and any retry
/// behavior. An empty string means the service answered without text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailure>;
}

#[async_trait]
impl<T> GenerationClient for Arc<T>
where
    T: GenerationClient + ?Sized,
{
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailure> {
        (**self).generate(prompt).await
    }
}
