use serde::{Deserialize, Serialize};

pub const WORD_LENGTH: usize = 5;

/// Per-letter verdict for a guessed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileState {
    Empty,
    Absent,
    Present,
    Correct,
}

/// Evaluate a guess against the secret word.
///
/// Two passes: exact matches first, consuming the letter on both sides, then
/// misplaced letters, each consuming one remaining occurrence in the secret.
/// A guess with repeated letters therefore earns no more `present`/`correct`
/// marks than the secret actually contains. Inputs are assumed to be
/// pre-validated 5-letter uppercase words.
pub fn evaluate_guess(secret: &str, guess: &str) -> [TileState; WORD_LENGTH] {
    let mut result = [TileState::Absent; WORD_LENGTH];
    let mut secret: Vec<Option<char>> = secret.chars().map(Some).collect();
    let mut guess: Vec<Option<char>> = guess.chars().map(Some).collect();

    if secret.len() != WORD_LENGTH || guess.len() != WORD_LENGTH {
        return result;
    }

    // First pass: correct positions
    for i in 0..WORD_LENGTH {
        if guess[i].is_some() && guess[i] == secret[i] {
            result[i] = TileState::Correct;
            secret[i] = None;
            guess[i] = None;
        }
    }

    // Second pass: misplaced letters
    for i in 0..WORD_LENGTH {
        let Some(letter) = guess[i] else { continue };
        if let Some(slot) = secret.iter_mut().find(|s| **s == Some(letter)) {
            result[i] = TileState::Present;
            *slot = None;
        }
    }

    result
}
