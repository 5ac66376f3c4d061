use std::collections::HashSet;

/// Disfluencies removed when no vocabulary is configured
pub const DEFAULT_FILLER_WORDS: &[&str] = &[
    "um", "umm", "uh", "uhh", "uhm", "hmm", "mm", "mhm", "mm-hmm", "er", "erm", "ah",
];

/// Trailing punctuation ignored when matching a word against the vocabulary
pub const DEFAULT_STRIP_SUFFIXES: &[char] = &[',', '.'];

/// Immutable vocabulary of disfluency words.
///
/// Entries are stored normalized: lower-cased with one trailing strip
/// suffix removed, so "Um," and "um." and "UM" all match the entry "um".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerSet {
    words: HashSet<String>,
    strip_suffixes: Vec<char>,
}

impl FillerSet {
    /// Build a set from raw vocabulary entries using the default strip suffixes
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_strip_suffixes(words, DEFAULT_STRIP_SUFFIXES.to_vec())
    }

    pub fn with_strip_suffixes<I, S>(words: I, strip_suffixes: Vec<char>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            words: HashSet::new(),
            strip_suffixes,
        };
        set.words = words
            .into_iter()
            .map(|w| set.normalize(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();
        set
    }

    /// Lower-case `word` and drop at most one trailing strip suffix
    pub fn normalize(&self, word: &str) -> String {
        let mut normalized = word.to_lowercase();
        if normalized
            .chars()
            .last()
            .is_some_and(|c| self.strip_suffixes.contains(&c))
        {
            normalized.pop();
        }
        normalized
    }

    pub fn is_filler(&self, word: &str) -> bool {
        !word.is_empty() && self.words.contains(&self.normalize(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn strip_suffixes(&self) -> &[char] {
        &self.strip_suffixes
    }

    /// Vocabulary entries in sorted order
    pub fn words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.words.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }
}

impl Default for FillerSet {
    fn default() -> Self {
        Self::new(DEFAULT_FILLER_WORDS)
    }
}
