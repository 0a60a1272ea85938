use crate::domain::model::FaqEntry;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Backing store for the question/answer table.
#[async_trait]
pub trait FaqStore: Send + Sync {
    async fn load(&self) -> Result<Vec<FaqEntry>>;
    async fn append(&self, entry: &FaqEntry) -> Result<()>;
}

/// Free-text completion backend used when nothing else answers.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
