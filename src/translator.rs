//! One request/response translation cycle.

use crate::backend::{Backend, OllamaBackend};
use crate::config::Config;
use crate::direction::Direction;
use crate::error::BackendError;
use crate::glossary::Glossary;
use crate::normalize::{
    estimate_time, is_code_only, is_empty_translation, long_text_warning, strip_prefixes,
};
use crate::prompt::build_prompt;
use crate::protect::{protect, restore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const EMPTY_RESULT_MESSAGE: &str = "[翻訳結果なし] モデルが空の応答を返しました";

/// Outcome of a single translate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub original: String,
    /// Final text, or a user-facing error message when `error` is set.
    pub translated: String,
    pub direction: Direction,
    pub error: bool,
    pub warning: Option<String>,
    pub is_code_only: bool,
    pub is_empty_result: bool,
    /// Estimated backend time in seconds, set for long inputs.
    pub estimated_time: Option<u64>,
}

impl TranslationResult {
    fn new(original: &str, translated: impl Into<String>, direction: Direction) -> Self {
        Self {
            original: original.to_string(),
            translated: translated.into(),
            direction,
            error: false,
            warning: None,
            is_code_only: false,
            is_empty_result: false,
            estimated_time: None,
        }
    }

    /// Map a backend failure onto an error result.
    fn from_backend_error(original: &str, direction: Direction, err: &BackendError) -> Self {
        Self {
            error: true,
            ..Self::new(original, err.user_message(), direction)
        }
    }
}

/// Outcome of a backend reachability and model check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub ok: bool,
    pub message: String,
}

/// Translates software-engineering text while keeping code fragments intact.
///
/// Holds no mutable state; the glossary is fixed at construction, so one
/// instance can serve concurrent calls.
#[derive(Clone)]
pub struct CodeTranslator {
    backend: Arc<dyn Backend>,
    model: String,
    glossary: Arc<Glossary>,
}

impl CodeTranslator {
    pub fn new(backend: Box<dyn Backend>, model: impl Into<String>, glossary: Glossary) -> Self {
        Self {
            backend: Arc::from(backend),
            model: model.into(),
            glossary: Arc::new(glossary),
        }
    }

    /// Build an Ollama-backed translator from configuration.
    pub fn from_config(config: &Config) -> Self {
        let backend = OllamaBackend::new(&config.ollama_host).with_timeout(config.timeout());
        let glossary = Glossary::load(&config.glossary_path);
        Self::new(Box::new(backend), &config.model, glossary)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// Translate `text`. Never fails: backend problems come back as a
    /// result with `error` set.
    pub async fn translate(&self, text: &str, direction: Direction) -> TranslationResult {
        if text.is_empty() {
            return TranslationResult::new("", "", direction);
        }

        let char_count = text.chars().count();
        let (protected, placeholders) = protect(text);
        debug!(
            "Protected {} code fragment(s) in {} chars",
            placeholders.len(),
            char_count
        );

        if is_code_only(&protected, &placeholders, char_count) {
            debug!("Input is code only, echoing original");
            return TranslationResult {
                is_code_only: true,
                ..TranslationResult::new(text, text, direction)
            };
        }

        let estimated = estimate_time(char_count);
        if estimated > 0 {
            info!("Long input ({} chars), estimated {}s", char_count, estimated);
        }

        let prompt = build_prompt(&protected, direction, &self.glossary);

        let raw = match self.backend.chat(&self.model, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Translation via {} failed: {}", self.backend.name(), e);
                return TranslationResult::from_backend_error(text, direction, &e);
            }
        };

        let stripped = strip_prefixes(&raw);
        if is_empty_translation(&stripped) {
            warn!("Backend returned an empty translation");
            return TranslationResult {
                is_empty_result: true,
                ..TranslationResult::new(text, EMPTY_RESULT_MESSAGE, direction)
            };
        }

        let translated = restore(&stripped, &placeholders);
        TranslationResult {
            warning: (estimated > 0).then(|| long_text_warning(estimated)),
            estimated_time: (estimated > 0).then_some(estimated),
            ..TranslationResult::new(text, translated, direction)
        }
    }

    /// Check that the backend is reachable and serves the configured model.
    pub async fn check_connection(&self) -> ConnectionStatus {
        match self.backend.list_models().await {
            Ok(models) if models.iter().any(|m| m == &self.model) => ConnectionStatus {
                ok: true,
                message: "OK".to_string(),
            },
            Ok(_) => ConnectionStatus {
                ok: false,
                message: format!("モデルが見つかりません: {}", self.model),
            },
            Err(e) if e.is_unreachable() => ConnectionStatus {
                ok: false,
                message: "Ollama に接続できません".to_string(),
            },
            Err(e) => ConnectionStatus {
                ok: false,
                message: format!("接続エラー: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CONNECTIVITY_MESSAGE, MODEL_NOT_FOUND_MESSAGE, TIMEOUT_MESSAGE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend returning a canned reply and recording prompts.
    struct FakeBackend {
        reply: std::result::Result<String, BackendError>,
        prompts: Arc<Mutex<Vec<String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeBackend {
        fn replying(reply: std::result::Result<&str, BackendError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                prompts: Arc::new(Mutex::new(Vec::new())),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn chat(&self, _model: &str, prompt: &str) -> std::result::Result<String, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }

        async fn list_models(&self) -> std::result::Result<Vec<String>, BackendError> {
            match &self.reply {
                Ok(_) => Ok(vec!["translategemma:12b".to_string()]),
                Err(e) => Err(e.clone()),
            }
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn translator(backend: FakeBackend) -> CodeTranslator {
        CodeTranslator::new(Box::new(backend), "translategemma:12b", Glossary::default())
    }

    #[tokio::test]
    async fn test_empty_input_skips_backend() {
        let backend = FakeBackend::replying(Ok("unused"));
        let calls = backend.calls.clone();
        let result = translator(backend).translate("", Direction::JaToEn).await;

        assert_eq!(result, TranslationResult::new("", "", Direction::JaToEn));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_code_only_input_echoed() {
        let backend = FakeBackend::replying(Ok("unused"));
        let calls = backend.calls.clone();
        let result = translator(backend).translate("`x`", Direction::EnToJa).await;

        assert!(result.is_code_only);
        assert!(!result.error);
        assert_eq!(result.translated, "`x`");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_restores_code_and_strips_prefix() {
        let backend = FakeBackend::replying(Ok("Translation:\nCall __CODE_BLOCK_0__ here."));
        let prompts = backend.prompts.clone();
        let result = translator(backend)
            .translate("ここで `foo()` を呼ぶ。", Direction::JaToEn)
            .await;

        assert!(!result.error);
        assert_eq!(result.translated, "Call `foo()` here.");
        assert_eq!(result.warning, None);
        assert_eq!(result.estimated_time, None);

        let prompts = prompts.lock().unwrap();
        assert!(prompts[0].ends_with("\n\n\nここで __CODE_BLOCK_0__ を呼ぶ。"));
        assert!(!prompts[0].contains("foo()"));
    }

    #[tokio::test]
    async fn test_empty_backend_reply() {
        let backend = FakeBackend::replying(Ok("Here is the translation:\n  \n"));
        let result = translator(backend).translate("テスト", Direction::JaToEn).await;

        assert!(result.is_empty_result);
        assert!(!result.error);
        assert_eq!(result.translated, EMPTY_RESULT_MESSAGE);
    }

    #[tokio::test]
    async fn test_backend_failures_are_classified() {
        let cases = [
            (BackendError::Connectivity("refused".into()), CONNECTIVITY_MESSAGE),
            (BackendError::ModelNotFound("missing".into()), MODEL_NOT_FOUND_MESSAGE),
            (BackendError::Timeout, TIMEOUT_MESSAGE),
            (BackendError::Other("Some other error".into()), "Some other error"),
        ];

        for (err, expected) in cases {
            let result = translator(FakeBackend::replying(Err(err)))
                .translate("テスト", Direction::JaToEn)
                .await;
            assert!(result.error);
            assert_eq!(result.original, "テスト");
            assert_eq!(result.translated, expected);
        }
    }

    #[tokio::test]
    async fn test_long_input_gets_warning() {
        let text = "a".repeat(6000);
        let result = translator(FakeBackend::replying(Ok("b")))
            .translate(&text, Direction::EnToJa)
            .await;

        assert_eq!(result.estimated_time, Some(18));
        assert!(result.warning.is_some());
        assert_eq!(result.translated, "b");
    }

    #[tokio::test]
    async fn test_check_connection() {
        let status = translator(FakeBackend::replying(Ok(""))).check_connection().await;
        assert!(status.ok);
        assert_eq!(status.message, "OK");

        let other = CodeTranslator::new(
            Box::new(FakeBackend::replying(Ok(""))),
            "llama3",
            Glossary::default(),
        );
        let status = other.check_connection().await;
        assert!(!status.ok);
        assert_eq!(status.message, "モデルが見つかりません: llama3");

        let status = translator(FakeBackend::replying(Err(BackendError::Connectivity(
            "refused".into(),
        ))))
        .check_connection()
        .await;
        assert_eq!(status.message, "Ollama に接続できません");

        let status = translator(FakeBackend::replying(Err(BackendError::Timeout)))
            .check_connection()
            .await;
        assert!(status.message.starts_with("接続エラー: "));
    }

    #[tokio::test]
    async fn test_check_connection_http_status_is_unreachable() {
        for err in [
            BackendError::from_status(503, "Connection refused"),
            BackendError::from_status(404, "not found"),
        ] {
            let status = translator(FakeBackend::replying(Err(err))).check_connection().await;
            assert!(!status.ok);
            assert_eq!(status.message, "Ollama に接続できません");
        }

        let status = translator(FakeBackend::replying(Err(BackendError::Other(
            "Failed to parse model list".into(),
        ))))
        .check_connection()
        .await;
        assert_eq!(status.message, "接続エラー: Failed to parse model list");
    }
}
