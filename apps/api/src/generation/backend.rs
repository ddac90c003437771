//! The generation backend seam.
//!
//! `AppState` holds an `Arc<dyn GenerationBackend>`. Production wires in
//! `llm_client::AzureClient`; tests wire in a stub, since the real service is
//! non-deterministic.

use async_trait::async_trait;
use bytes::Bytes;

use crate::llm_client::{ChatMessage, LlmError};

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Runs a chat completion over `messages` and returns the reply text.
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, LlmError>;

    /// Produces the raw bytes of one image for `prompt`.
    async fn generate_image(&self, prompt: &str) -> Result<Bytes, LlmError>;
}

#[cfg(test)]
pub(crate) mod stub {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;

    use super::*;
    use crate::generation::prompts::IMAGE_PROMPT_SYSTEM;

    /// Holds the next text completion until the test releases it.
    #[derive(Default)]
    pub(crate) struct TextGate {
        pub armed: AtomicBool,
        pub entered: Notify,
        pub release: Notify,
    }

    impl TextGate {
        pub(crate) fn armed() -> Arc<Self> {
            let gate = Self::default();
            gate.armed.store(true, Ordering::SeqCst);
            Arc::new(gate)
        }

        async fn pass(&self) {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
        }
    }

    /// Deterministic stand-in for the Azure deployments.
    ///
    /// Rewrites echo the user message under a heading, image prompts return a
    /// fixed prompt, and every request is recorded for inspection.
    #[derive(Default)]
    pub(crate) struct StubBackend {
        pub fail_text: bool,
        pub fail_image: bool,
        pub empty_text: bool,
        pub requests: Mutex<Vec<Vec<ChatMessage>>>,
        pub images: AtomicUsize,
        pub gate: Option<Arc<TextGate>>,
    }

    #[async_trait]
    impl GenerationBackend for StubBackend {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _temperature: f32,
        ) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(messages.to_vec());

            if messages.first().map(|m| m.content.as_str()) == Some(IMAGE_PROMPT_SYSTEM) {
                return Ok("Scales of justice on an oak desk".to_string());
            }
            if let Some(gate) = &self.gate {
                gate.pass().await;
            }
            if self.fail_text {
                return Err(LlmError::Api {
                    status: 400,
                    message: "content filtered".to_string(),
                });
            }
            if self.empty_text {
                return Ok("   ".to_string());
            }
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
            Ok(format!("# Rewritten\n\n{last}"))
        }

        async fn generate_image(&self, _prompt: &str) -> Result<Bytes, LlmError> {
            if self.fail_image {
                return Err(LlmError::EmptyContent);
            }
            self.images.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(b"\x89PNG stub"))
        }
    }
}
