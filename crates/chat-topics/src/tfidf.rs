//! TF-IDF (Term Frequency - Inverse Document Frequency) vectorizer.
//!
//! Bag-of-words model over unigrams and bigrams with a bounded vocabulary.
//! Tokens are maximal runs of Unicode word characters, so CJK text without
//! spaces still tokenizes (a whole run becomes one token).

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::TopicsError;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 100;

/// TF-IDF vectorizer producing L2-normalized document rows.
///
/// Term weights use raw counts and smoothed IDF:
/// `idf = ln((1 + n) / (1 + df)) + 1`.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    max_features: usize,
    /// Selected terms in column order (alphabetical)
    vocabulary: Vec<String>,
    /// IDF per column
    idf: Vec<f32>,
}

impl TfIdfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: Vec::new(),
            idf: Vec::new(),
        }
    }

    /// Fit the vocabulary on `documents` and return one row per document.
    ///
    /// Fails with [`TopicsError::EmptyVocabulary`] when no document yields a
    /// single token.
    pub fn fit_transform(&mut self, documents: &[&str]) -> Result<Vec<Vec<f32>>, TopicsError> {
        if self.max_features == 0 {
            return Err(TopicsError::InvalidConfig(
                "max_features must be > 0".to_string(),
            ));
        }
        if documents.is_empty() {
            return Err(TopicsError::Vectorization("no documents to fit".to_string()));
        }

        let doc_counts: Vec<HashMap<String, usize>> =
            documents.iter().map(|doc| count_terms(doc)).collect();

        // Corpus-wide frequency and document frequency
        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &doc_counts {
            for (term, count) in counts {
                *corpus_freq.entry(term.as_str()).or_insert(0) += count;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if corpus_freq.is_empty() {
            return Err(TopicsError::EmptyVocabulary);
        }

        // Keep the most frequent terms; ties broken alphabetically
        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut vocabulary: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        let n = documents.len() as f32;
        let idf: Vec<f32> = vocabulary
            .iter()
            .map(|term| {
                let df = *doc_freq.get(term.as_str()).unwrap_or(&0) as f32;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut row: Vec<f32> = vocabulary
                    .iter()
                    .zip(&idf)
                    .map(|(term, w)| *counts.get(term).unwrap_or(&0) as f32 * w)
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();

        self.vocabulary = vocabulary;
        self.idf = idf;
        Ok(rows)
    }

    /// Selected vocabulary after the last fit.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// IDF weight of a term after the last fit.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|idx| self.idf[idx])
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w+\b").expect("static token pattern"))
}

/// Lowercase word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Unigrams followed by space-joined bigrams.
pub fn ngrams(tokens: &[String]) -> Vec<String> {
    let mut terms = tokens.to_vec();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

fn count_terms(doc: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in ngrams(&tokenize(doc)) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

fn l2_normalize(row: &mut [f32]) {
    let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in row.iter_mut() {
            *val /= norm;
        }
    }
}
