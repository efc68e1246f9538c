//! Corpus-local term vectors: the always-available last tier.
//!
//! The vocabulary is the sorted set of tokens of the current corpus, so every
//! document maps to a vector of length |vocabulary|. Vectors are L2-normalized;
//! a document without tokens stays the zero vector.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use topicmap_core::config::LexicalWeighting;
use topicmap_core::text::tokenize;

const BM25_K1: f32 = 1.5;
const BM25_B: f32 = 0.75;

pub struct LexicalEmbedder {
    weighting: LexicalWeighting,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
    avg_doc_len: f32,
}

impl LexicalEmbedder {
    /// Build vocabulary and IDF weights from `documents`.
    pub fn fit<S: AsRef<str>>(documents: &[S], weighting: LexicalWeighting) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();
        Self::from_tokens(&tokenized, weighting)
    }

    fn from_tokens(tokenized: &[Vec<String>], weighting: LexicalWeighting) -> Self {
        let terms: BTreeSet<&str> = tokenized.iter().flatten().map(String::as_str).collect();
        let vocabulary: BTreeMap<String, usize> = terms.into_iter().enumerate().map(|(i, t)| (t.to_string(), i)).collect();

        let mut df = vec![0usize; vocabulary.len()];
        for tokens in tokenized {
            let unique: BTreeSet<usize> = tokens.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for idx in unique { df[idx] += 1; }
        }
        let n = tokenized.len() as f32;
        let idf = df.iter().map(|&d| bm25_idf(n, d as f32)).collect();
        let total: usize = tokenized.iter().map(Vec::len).sum();
        let avg_doc_len = if tokenized.is_empty() { 0.0 } else { total as f32 / n };

        Self { weighting, vocabulary, idf, avg_doc_len }
    }

    pub fn dim(&self) -> usize { self.vocabulary.len() }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> { self.vocabulary.keys().map(String::as_str) }

    /// Vector for one text against the fitted vocabulary.
    pub fn embed(&self, text: &str) -> Vec<f32> { self.embed_tokens(&tokenize(text)) }

    fn embed_tokens(&self, tokens: &[String]) -> Vec<f32> {
        let mut v = vec![0f32; self.dim()];
        if tokens.is_empty() { return v; }
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for t in tokens {
            if let Some(&idx) = self.vocabulary.get(t) { *counts.entry(idx).or_insert(0) += 1; }
        }
        let doc_len = tokens.len() as f32;
        for (idx, count) in counts {
            let tf = count as f32;
            v[idx] = match self.weighting {
                LexicalWeighting::TfIdf => (tf / doc_len) * self.idf[idx],
                LexicalWeighting::Bm25 => {
                    let norm = if self.avg_doc_len > 0.0 { doc_len / self.avg_doc_len } else { 1.0 };
                    let saturated = tf * (BM25_K1 + 1.0) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * norm));
                    self.idf[idx] * saturated
                }
            };
        }
        l2_normalize(&mut v);
        v
    }

    /// Fit on `documents` and embed each of them.
    pub fn fit_embed<S: AsRef<str>>(documents: &[S], weighting: LexicalWeighting) -> Vec<Vec<f32>> {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();
        let embedder = Self::from_tokens(&tokenized, weighting);
        tokenized.iter().map(|t| embedder.embed_tokens(t)).collect()
    }
}

/// BM25-smoothed inverse document frequency; always positive.
pub fn bm25_idf(n: f32, df: f32) -> f32 { ((n - df + 0.5) / (df + 0.5) + 1.0).ln() }

pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() { *x /= norm; }
    }
}
