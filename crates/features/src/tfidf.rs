//! TF-IDF vectorization of fingerprint columns
//!
//! One [`TfIdfVectorizer`] is fitted per included text column over the union
//! of train and test documents. Vocabulary terms are word n-grams joined by a
//! single space, kept when their document frequency reaches the column's
//! `min_frequency`, and ordered lexicographically so column positions are
//! stable across runs.

use botbid_types::{CsrBuilder, CsrMatrix, TextColumn, TextColumnConfig, TokenizerMode};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::errors::{FeatureError, Result};

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Split a document into tokens according to `mode`
pub fn tokenize(text: &str, mode: TokenizerMode) -> Vec<String> {
    match mode {
        TokenizerMode::Whitespace => text.split_whitespace().map(str::to_lowercase).collect(),
        TokenizerMode::Default => {
            let lowered = text.to_lowercase();
            WORD_TOKEN
                .find_iter(&lowered)
                .map(|m| m.as_str().to_string())
                .collect()
        }
    }
}

/// Word n-grams of every length in `min..=max`
pub fn ngrams(tokens: &[String], (min, max): (usize, usize)) -> Vec<String> {
    let mut grams = Vec::new();
    for n in min..=max {
        if n == 0 || n > tokens.len() {
            continue;
        }
        grams.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    grams
}

/// Fitted vocabulary and idf weights for one column
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    column: TextColumn,
    tokenizer: TokenizerMode,
    ngram_range: (usize, usize),
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Fit on every document of the column (train and test together)
    pub fn fit(config: &TextColumnConfig, documents: &[&str]) -> Result<Self> {
        let (min, max) = config.ngram_range;
        if min == 0 || min > max {
            return Err(FeatureError::InvalidNgramRange(min, max));
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let mut grams = ngrams(&tokenize(doc, config.tokenizer), config.ngram_range);
            grams.sort();
            grams.dedup();
            for gram in grams {
                *document_frequency.entry(gram).or_insert(0) += 1;
            }
        }

        let candidates = document_frequency.len();
        let n_documents = documents.len() as f64;
        let (terms, idf): (Vec<String>, Vec<f64>) = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= config.min_frequency)
            // Smoothed idf: ln((1 + n) / (1 + df)) + 1
            .map(|(term, df)| (term, ((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0))
            .unzip();

        if terms.is_empty() {
            return Err(FeatureError::EmptyVocabulary(config.column));
        }

        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();

        info!(
            "Vectorizer for {}: {} terms kept of {} (min_df={}, ngram={:?})",
            config.column,
            terms.len(),
            candidates,
            config.min_frequency,
            config.ngram_range
        );

        Ok(Self {
            column: config.column,
            tokenizer: config.tokenizer,
            ngram_range: config.ngram_range,
            vocabulary,
            terms,
            idf,
        })
    }

    pub fn column(&self) -> TextColumn {
        self.column
    }

    /// Vocabulary terms in column order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Term counts times idf, L2-normalized per document
    pub fn transform(&self, documents: &[&str]) -> Result<CsrMatrix> {
        let mut builder = CsrBuilder::new(self.terms.len());
        for doc in documents {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for gram in ngrams(&tokenize(doc, self.tokenizer), self.ngram_range) {
                if let Some(&idx) = self.vocabulary.get(&gram) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }

            let weighted: Vec<(usize, f64)> = counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * self.idf[idx]))
                .collect();
            let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            builder.push_row(
                weighted
                    .into_iter()
                    .map(|(idx, w)| (idx, if norm > 0.0 { w / norm } else { 0.0 })),
            )?;
        }
        let matrix = builder.finish();
        debug!(
            "Transformed {} documents for {} ({} non-zeros)",
            matrix.n_rows(),
            self.column,
            matrix.nnz()
        );
        Ok(matrix)
    }
}

/// Fit one vectorizer per included column, in declaration order.
///
/// `documents` yields the train ∪ test documents of a column.
pub fn fit_vectorizers<'a, F>(configs: &[TextColumnConfig], documents: F) -> Result<Vec<TfIdfVectorizer>>
where
    F: Fn(TextColumn) -> Vec<&'a str>,
{
    configs
        .iter()
        .filter(|c| c.included)
        .map(|config| TfIdfVectorizer::fit(config, &documents(config.column)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbid_types::CategoricalColumn;

    fn config(min_frequency: usize, ngram_range: (usize, usize), mode: TokenizerMode) -> TextColumnConfig {
        TextColumnConfig::new(
            TextColumn::Category(CategoricalColumn::Device),
            min_frequency,
            ngram_range,
            mode,
        )
    }

    #[test]
    fn test_default_tokenizer_splits_punctuation() {
        assert_eq!(
            tokenize("ip_1.22.3 Device_A", TokenizerMode::Default),
            vec!["ip_1", "22", "device_a"]
        );
        assert_eq!(
            tokenize("ip_1.22.3  device_a", TokenizerMode::Whitespace),
            vec!["ip_1.22.3", "device_a"]
        );
    }

    #[test]
    fn test_ngrams_span() {
        let tokens: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ngrams(&tokens, (1, 2)), vec!["a", "b", "c", "a b", "b c"]);
        assert!(ngrams(&tokens, (4, 4)).is_empty());
    }

    #[test]
    fn test_min_frequency_filters_vocabulary() {
        let docs = ["d_x d_y", "d_x", "d_z d_x"];
        let v = TfIdfVectorizer::fit(&config(2, (1, 1), TokenizerMode::Whitespace), &docs).unwrap();
        assert_eq!(v.terms(), &["d_x".to_string()]);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let docs = ["d_x d_y d_y", "d_y", ""];
        let v = TfIdfVectorizer::fit(&config(1, (1, 2), TokenizerMode::Whitespace), &docs).unwrap();
        let m = v.transform(&docs).unwrap();
        for row in 0..2 {
            let norm: f64 = m.row(row).map(|(_, w)| w * w).sum();
            assert!((norm - 1.0).abs() < 1e-12);
        }
        assert_eq!(m.row(2).count(), 0);
    }

    #[test]
    fn test_empty_vocabulary_is_fatal() {
        let docs = ["d_x", "d_y"];
        let err = TfIdfVectorizer::fit(&config(2, (1, 1), TokenizerMode::Whitespace), &docs).unwrap_err();
        assert!(matches!(err, FeatureError::EmptyVocabulary(_)));
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let docs = ["d_x d_y", "d_x", "d_x"];
        let v = TfIdfVectorizer::fit(&config(1, (1, 1), TokenizerMode::Whitespace), &docs).unwrap();
        let m = v.transform(&docs[..1]).unwrap();
        // vocabulary order: d_x, d_y
        assert!(m.get(0, 1) > m.get(0, 0));
    }
}
