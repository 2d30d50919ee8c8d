pub mod ollama;

pub use ollama::OllamaBackend;

use crate::error::BackendError;
use async_trait::async_trait;

/// A service that turns a prompt into model output.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a single user-role prompt to `model` and return the reply text.
    async fn chat(&self, model: &str, prompt: &str) -> Result<String, BackendError>;

    /// Names of the models the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>, BackendError>;

    fn name(&self) -> &'static str;
}
