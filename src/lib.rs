pub mod backend;
pub mod config;
pub mod direction;
pub mod error;
pub mod glossary;
pub mod normalize;
pub mod prompt;
pub mod protect;
pub mod translator;

pub use config::Config;
pub use direction::Direction;
pub use error::{BackendError, Result, TranslateError};
pub use glossary::Glossary;
pub use translator::{CodeTranslator, ConnectionStatus, TranslationResult};
