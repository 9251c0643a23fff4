mod dictionary;

pub use dictionary::DictionaryManager;

use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub word_count: usize,
}

/// Source of secret words and dictionary validation.
///
/// Implementations are immutable after construction and queried concurrently
/// by every room without locking. Rooms hold a shared handle injected at the
/// composition root, so tests can swap in a scripted provider.
pub trait WordProvider: Send + Sync {
    /// A random 5-letter word for the language, or `None` if the language
    /// has no words loaded.
    fn random_word(&self, language: &str) -> Option<String>;

    /// Whether the guess is a recognized dictionary word for the language.
    fn is_valid_word(&self, word: &str, language: &str) -> bool;

    fn is_supported(&self, language: &str) -> bool;

    fn available_languages(&self) -> Vec<LanguageInfo>;
}
