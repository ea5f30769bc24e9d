//! Pseudo-random identifier generation from a word dictionary.
//!
//! Generated names are chains of dictionary words in camel concatenation:
//! readable enough to survive code review tooling, meaningless enough to
//! leak nothing. The word stream is a seeded hash sequence, so a fixed seed
//! reproduces a run exactly while the CLI default (system-time seed) keeps
//! every shipped build's names fresh.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::core::errors::{Result, SymveilError};

static EMBEDDED_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    include_str!("../../assets/words.txt")
        .split_whitespace()
        .collect()
});

/// Retry budget before a collision during unique generation becomes an error.
const MAX_COLLISION_RETRIES: usize = 64;

/// The word list replacement identifiers are drawn from.
#[derive(Debug, Clone)]
pub struct WordDictionary {
    words: Vec<String>,
}

impl WordDictionary {
    /// The dictionary compiled into the binary.
    pub fn embedded() -> Self {
        Self {
            words: EMBEDDED_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    /// Build a dictionary from an explicit word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Load a dictionary from a whitespace-separated word file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SymveilError::io(
                format!("failed to read word dictionary: {}", path.display()),
                e,
            )
        })?;
        Ok(Self {
            words: content.split_whitespace().map(str::to_string).collect(),
        })
    }

    /// Number of words available.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the dictionary holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Casing style of a generated identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle<'a> {
    /// First word lowercase, subsequent words titlecased (methods, functions)
    LowerCamel,
    /// Every word titlecased (classes, protocols)
    TitleCase,
    /// Literal prefix followed by a titlecased word chain (initializers)
    InitializerLike(&'a str),
}

/// Seeded identifier generator.
///
/// Stateless apart from the dictionary and the position in the word stream;
/// uniqueness across generated names is the caller's concern (see
/// [`UniqueNamer`]).
#[derive(Debug)]
pub struct IdentifierGenerator {
    dictionary: WordDictionary,
    word_count: usize,
    seed: u64,
    counter: u64,
}

impl IdentifierGenerator {
    /// Create a generator.
    ///
    /// An empty dictionary is a configuration error: the word list is a
    /// required asset, and a run without it can produce no names at all.
    pub fn new(dictionary: WordDictionary, word_count: usize, seed: u64) -> Result<Self> {
        if dictionary.is_empty() {
            return Err(SymveilError::config_field(
                "identifier dictionary is empty",
                "obfuscation.dictionary_path",
            ));
        }
        if word_count == 0 {
            return Err(SymveilError::config_field(
                "must be at least 1",
                "obfuscation.word_count",
            ));
        }
        Ok(Self {
            dictionary,
            word_count,
            seed,
            counter: 0,
        })
    }

    /// A seed derived from the current time, for runs without a fixed seed.
    pub fn entropy_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9e37_79b9_7f4a_7c15)
    }

    /// Produce the next identifier in the given style.
    pub fn next(&mut self, style: NameStyle<'_>) -> String {
        match style {
            NameStyle::LowerCamel => self.word_chain(false),
            NameStyle::TitleCase => self.word_chain(true),
            NameStyle::InitializerLike(prefix) => {
                let mut name = String::from(prefix);
                name.push_str(&self.word_chain(true));
                name
            }
        }
    }

    fn word_chain(&mut self, title_first: bool) -> String {
        let mut chain = String::new();
        for position in 0..self.word_count {
            let word = self.pick_word();
            if position == 0 && !title_first {
                chain.push_str(word);
            } else {
                push_title_cased(&mut chain, word);
            }
        }
        chain
    }

    fn pick_word(&mut self) -> &str {
        let draw = xxh3_64_with_seed(&self.counter.to_le_bytes(), self.seed);
        self.counter += 1;
        let index = (draw % self.dictionary.len() as u64) as usize;
        &self.dictionary.words[index]
    }
}

fn push_title_cased(target: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        target.extend(first.to_uppercase());
        target.push_str(chars.as_str());
    }
}

/// Collision-checked generation: tracks every issued name and regenerates
/// until a fresh one appears, so no two descriptors share a replacement.
#[derive(Debug)]
pub struct UniqueNamer {
    generator: IdentifierGenerator,
    issued: HashSet<String>,
}

impl UniqueNamer {
    /// Wrap a generator with collision tracking.
    pub fn new(generator: IdentifierGenerator) -> Self {
        Self {
            generator,
            issued: HashSet::new(),
        }
    }

    /// Produce an identifier no earlier call has returned.
    pub fn next_unique(&mut self, style: NameStyle<'_>) -> Result<String> {
        for _ in 0..MAX_COLLISION_RETRIES {
            let candidate = self.generator.next(style);
            if self.issued.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(SymveilError::internal(format!(
            "could not generate a fresh identifier after {MAX_COLLISION_RETRIES} attempts; \
             dictionary or word count too small for this project"
        )))
    }

    /// Number of identifiers issued so far.
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_dictionary(words: &[&str]) -> WordDictionary {
        WordDictionary::from_words(words.iter().copied())
    }

    #[test]
    fn test_embedded_dictionary_is_usable() {
        let dict = WordDictionary::embedded();
        assert!(dict.len() > 100);
    }

    #[test]
    fn test_empty_dictionary_is_fatal() {
        let err = IdentifierGenerator::new(small_dictionary(&[]), 5, 1).unwrap_err();
        assert!(matches!(err, SymveilError::Config { .. }));
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let mut a = IdentifierGenerator::new(WordDictionary::embedded(), 5, 42).unwrap();
        let mut b = IdentifierGenerator::new(WordDictionary::embedded(), 5, 42).unwrap();
        for _ in 0..8 {
            assert_eq!(a.next(NameStyle::LowerCamel), b.next(NameStyle::LowerCamel));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = IdentifierGenerator::new(WordDictionary::embedded(), 5, 1).unwrap();
        let mut b = IdentifierGenerator::new(WordDictionary::embedded(), 5, 2).unwrap();
        let names_a: Vec<String> = (0..4).map(|_| a.next(NameStyle::TitleCase)).collect();
        let names_b: Vec<String> = (0..4).map(|_| b.next(NameStyle::TitleCase)).collect();
        assert_ne!(names_a, names_b);
    }

    #[test]
    fn test_title_case_style() {
        let mut generator =
            IdentifierGenerator::new(small_dictionary(&["ember", "fjord"]), 3, 7).unwrap();
        let name = generator.next(NameStyle::TitleCase);
        assert!(name.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_lower_camel_starts_lowercase() {
        let mut generator =
            IdentifierGenerator::new(small_dictionary(&["ember", "fjord"]), 3, 7).unwrap();
        let name = generator.next(NameStyle::LowerCamel);
        assert!(name.chars().next().unwrap().is_lowercase());
    }

    #[test]
    fn test_initializer_style_keeps_prefix() {
        let mut generator = IdentifierGenerator::new(WordDictionary::embedded(), 4, 11).unwrap();
        let name = generator.next(NameStyle::InitializerLike("initWith"));
        assert!(name.starts_with("initWith"));
        // The chain after the prefix is titlecased
        let rest = &name["initWith".len()..];
        assert!(rest.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_word_count_controls_chain_length() {
        let mut generator = IdentifierGenerator::new(small_dictionary(&["oak"]), 3, 5).unwrap();
        assert_eq!(generator.next(NameStyle::LowerCamel), "oakOakOak");
    }

    #[test]
    fn test_unique_namer_regenerates_on_collision() {
        // Two words and a single-word chain: only two possible outputs, so
        // the second unique draw must retry past a collision eventually.
        let generator = IdentifierGenerator::new(small_dictionary(&["ash", "elm"]), 1, 3).unwrap();
        let mut namer = UniqueNamer::new(generator);
        let first = namer.next_unique(NameStyle::LowerCamel).unwrap();
        let second = namer.next_unique(NameStyle::LowerCamel).unwrap();
        assert_ne!(first, second);
        assert_eq!(namer.issued_count(), 2);
    }

    #[test]
    fn test_unique_namer_reports_exhaustion() {
        let generator = IdentifierGenerator::new(small_dictionary(&["ash"]), 1, 3).unwrap();
        let mut namer = UniqueNamer::new(generator);
        namer.next_unique(NameStyle::LowerCamel).unwrap();
        let err = namer.next_unique(NameStyle::LowerCamel).unwrap_err();
        assert!(matches!(err, SymveilError::Internal { .. }));
    }
}
