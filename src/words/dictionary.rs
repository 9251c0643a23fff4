use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use rand::Rng;
use tracing::{info, warn};

use super::{LanguageInfo, WordProvider};
use crate::game::evaluator::WORD_LENGTH;

struct Language {
    code: String,
    name: String,
    words: HashSet<String>,
    /// Kept alongside the set for O(1) random selection.
    answers: Vec<String>,
}

/// Word lists for all configured languages, loaded once at startup and
/// immutable afterwards.
pub struct DictionaryManager {
    languages: HashMap<String, Language>,
}

impl DictionaryManager {
    /// Load every language under `dir`: one subdirectory per language code
    /// containing `<code>.txt` and an optional `exceptions.txt` of excluded
    /// words. A language that fails to load is skipped with a warning.
    pub fn load(dir: &Path) -> io::Result<Self> {
        let mut languages = HashMap::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let code = entry.file_name().to_string_lossy().to_string();
            match load_language(&entry.path(), &code) {
                Ok(language) => {
                    info!(
                        language = %language.name,
                        code = %language.code,
                        words = language.words.len(),
                        "Loaded dictionary"
                    );
                    languages.insert(code, language);
                }
                Err(err) => {
                    warn!(code, %err, "Failed to load dictionary, skipping language");
                }
            }
        }

        Ok(Self { languages })
    }

    /// Build a provider from in-memory word lists. Applies the same
    /// filtering as the file loader.
    pub fn from_lists<I, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut languages = HashMap::new();
        for (code, words) in lists {
            let code = code.into();
            let words: Vec<String> = words.into_iter().map(Into::into).collect();
            languages.insert(code.clone(), build_language(&code, words, &HashSet::new()));
        }
        Self { languages }
    }
}

impl WordProvider for DictionaryManager {
    fn random_word(&self, language: &str) -> Option<String> {
        let language = self.languages.get(language)?;
        if language.answers.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..language.answers.len());
        Some(language.answers[index].clone())
    }

    fn is_valid_word(&self, word: &str, language: &str) -> bool {
        self.languages
            .get(language)
            .is_some_and(|l| l.words.contains(&word.to_uppercase()))
    }

    fn is_supported(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    fn available_languages(&self) -> Vec<LanguageInfo> {
        let mut languages: Vec<LanguageInfo> = self
            .languages
            .values()
            .map(|l| LanguageInfo {
                code: l.code.clone(),
                name: l.name.clone(),
                word_count: l.words.len(),
            })
            .collect();
        languages.sort_by(|a, b| a.name.cmp(&b.name));
        languages
    }
}

fn load_language(dir: &Path, code: &str) -> io::Result<Language> {
    let raw = fs::read_to_string(dir.join(format!("{code}.txt")))?;

    let exceptions: HashSet<String> = match fs::read_to_string(dir.join("exceptions.txt")) {
        Ok(content) => parse_words(&content)
            .into_iter()
            .map(|w| w.to_uppercase())
            .collect(),
        Err(_) => HashSet::new(),
    };

    Ok(build_language(code, parse_words(&raw), &exceptions))
}

fn build_language(code: &str, raw_words: Vec<String>, exceptions: &HashSet<String>) -> Language {
    let mut words = HashSet::new();
    let mut answers = Vec::new();

    for word in raw_words {
        if word.chars().count() != WORD_LENGTH {
            continue;
        }
        if !word.chars().all(char::is_alphabetic) {
            continue;
        }
        let word = word.to_uppercase();
        if exceptions.contains(&word) {
            continue;
        }
        if words.insert(word.clone()) {
            answers.push(word);
        }
    }

    Language {
        code: code.to_string(),
        name: language_name(code),
        words,
        answers,
    }
}

/// Comma-separated or newline-separated, trimmed, blanks dropped.
fn parse_words(content: &str) -> Vec<String> {
    let parts: Vec<&str> = if content.contains(',') {
        content.split(',').collect()
    } else {
        content.lines().collect()
    };

    parts
        .into_iter()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn language_name(code: &str) -> String {
    match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "pl" => "Polish",
        "nl" => "Dutch",
        "sv" => "Swedish",
        "da" => "Danish",
        "no" => "Norwegian",
        "fi" => "Finnish",
        _ => return code.to_uppercase(),
    }
    .to_string()
}
