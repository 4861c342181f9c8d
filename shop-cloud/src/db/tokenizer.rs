//! Search query tokenizer
//!
//! Queries are split on whitespace. Chunks written in Thai carry no word
//! boundaries, so they are cut further with a greedy longest-match against a
//! word list loaded from `SEARCH_DICT_PATH` (default `./tdict-std.txt`).

use std::collections::HashSet;
use std::sync::OnceLock;

const DEFAULT_DICT_PATH: &str = "./tdict-std.txt";

static DICTIONARY: OnceLock<Option<Dictionary>> = OnceLock::new();

#[derive(Debug, Default)]
pub struct Dictionary {
    words: HashSet<String>,
    /// Longest word, in chars
    max_len: usize,
}

impl Dictionary {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::default();
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            dict.max_len = dict.max_len.max(word.chars().count());
            dict.words.insert(word.to_string());
        }
        dict
    }

    pub fn load(path: &str) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_words(content.lines()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Greedy longest-match segmentation; runs of unknown chars stay together
    pub fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut unknown = String::new();
        let mut i = 0;

        while i < chars.len() {
            let longest = (1..=self.max_len.min(chars.len() - i))
                .rev()
                .find(|&n| {
                    let candidate: String = chars[i..i + n].iter().collect();
                    self.words.contains(&candidate)
                });

            match longest {
                Some(n) => {
                    if !unknown.is_empty() {
                        out.push(std::mem::take(&mut unknown));
                    }
                    out.push(chars[i..i + n].iter().collect());
                    i += n;
                }
                None => {
                    unknown.push(chars[i]);
                    i += 1;
                }
            }
        }

        if !unknown.is_empty() {
            out.push(unknown);
        }
        out
    }
}

fn is_thai(c: char) -> bool {
    ('\u{0E00}'..='\u{0E7F}').contains(&c)
}

/// Process-wide dictionary, loaded on first use
pub fn dictionary() -> Option<&'static Dictionary> {
    DICTIONARY
        .get_or_init(|| {
            let path =
                std::env::var("SEARCH_DICT_PATH").unwrap_or_else(|_| DEFAULT_DICT_PATH.into());
            match Dictionary::load(&path) {
                Ok(dict) => {
                    tracing::info!(path = %path, words = dict.len(), "Search dictionary loaded");
                    Some(dict)
                }
                Err(e) => {
                    tracing::debug!(path = %path, error = %e, "Search dictionary not loaded");
                    None
                }
            }
        })
        .as_ref()
}

/// Tokenize with the process-wide dictionary
pub fn tokenize(q: &str) -> Vec<String> {
    tokenize_with(dictionary(), q)
}

pub fn tokenize_with(dict: Option<&Dictionary>, q: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for part in q.split_whitespace() {
        match dict {
            Some(dict) if part.chars().any(is_thai) => tokens.extend(dict.segment(part)),
            _ => tokens.push(part.to_string()),
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_split() {
        assert_eq!(tokenize_with(None, "  kbank  saving "), vec!["kbank", "saving"]);
        assert!(tokenize_with(None, "   ").is_empty());
    }

    #[test]
    fn test_thai_longest_match() {
        let dict = Dictionary::from_words(["ธนาคาร", "ธนา", "กสิกร", "ไทย"]);
        assert_eq!(dict.segment("ธนาคารกสิกรไทย"), vec!["ธนาคาร", "กสิกร", "ไทย"]);
    }

    #[test]
    fn test_unknown_run_kept_together() {
        let dict = Dictionary::from_words(["ไทย"]);
        assert_eq!(dict.segment("กขคไทย"), vec!["กขค", "ไทย"]);
    }

    #[test]
    fn test_latin_chunks_not_segmented() {
        let dict = Dictionary::from_words(["ban"]);
        assert_eq!(tokenize_with(Some(&dict), "bank ไทย"), vec!["bank", "ไทย"]);
    }

    #[test]
    fn test_missing_dictionary_keeps_thai_whole() {
        assert_eq!(tokenize_with(None, "ธนาคารไทย"), vec!["ธนาคารไทย"]);
    }
}
