//! Textual similarity estimation.
//!
//! Term-weighted (TF-IDF) document vectors over `title + abstract` text,
//! compared pairwise with cosine similarity. This is the dominant cost of a
//! run (O(n²) pairs), so pair enumeration is chunked into fixed-size blocks
//! and fanned out across the rayon worker pool; each worker checks the
//! cancellation token once per block and results are merged after all
//! workers complete, so the hot loop takes no locks.

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Minimum token length kept by the tokenizer.
const MIN_TOKEN_LEN: usize = 3;

/// Common words carrying no thematic weight.
fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "the"
            | "and"
            | "for"
            | "that"
            | "this"
            | "with"
            | "from"
            | "have"
            | "has"
            | "are"
            | "was"
            | "were"
            | "been"
            | "which"
            | "their"
            | "these"
            | "those"
            | "using"
            | "based"
            | "can"
            | "our"
            | "its"
            | "into"
            | "both"
            | "than"
            | "also"
            | "such"
            | "more"
            | "between"
            | "however"
            | "results"
            | "paper"
            | "study"
            | "propose"
            | "proposed"
            | "approach"
            | "method"
            | "methods"
    )
}

/// Split text into lowercase alphanumeric tokens, dropping short words
/// and stopwords. Length is counted in characters, not bytes.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN && !is_stopword(w))
        .collect()
}

/// TF-IDF representation of a document corpus.
///
/// Vectors are sparse `(term index, weight)` lists sorted by term index and
/// L2-normalized, so cosine similarity reduces to a sparse dot product.
pub struct TfIdfModel {
    terms: Vec<String>,
    vectors: Vec<Vec<(u32, f64)>>,
}

impl TfIdfModel {
    /// Fit the model over the given texts. Term weighting: tf = count / len,
    /// idf = ln(N / (1 + df)) + 1, where df is the number of documents
    /// containing the term.
    pub fn fit(texts: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t)).collect();

        // Vocabulary and document frequencies
        let mut term_index: HashMap<&str, u32> = HashMap::new();
        let mut terms: Vec<String> = Vec::new();
        let mut doc_freq: Vec<u32> = Vec::new();

        for tokens in &tokenized {
            let mut seen: Vec<u32> = Vec::new();
            for token in tokens {
                let idx = *term_index.entry(token.as_str()).or_insert_with(|| {
                    terms.push(token.clone());
                    doc_freq.push(0);
                    (terms.len() - 1) as u32
                });
                if !seen.contains(&idx) {
                    seen.push(idx);
                    doc_freq[idx as usize] += 1;
                }
            }
        }

        let n = tokenized.len() as f64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| (n / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        // Per-document normalized vectors
        let vectors = tokenized
            .iter()
            .map(|tokens| {
                if tokens.is_empty() {
                    return Vec::new();
                }
                let mut counts: HashMap<u32, usize> = HashMap::new();
                for token in tokens {
                    let idx = term_index[token.as_str()];
                    *counts.entry(idx).or_default() += 1;
                }
                let len = tokens.len() as f64;
                let mut vector: Vec<(u32, f64)> = counts
                    .into_iter()
                    .map(|(idx, count)| (idx, (count as f64 / len) * idf[idx as usize]))
                    .collect();
                vector.sort_unstable_by_key(|&(idx, _)| idx);

                let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in vector.iter_mut() {
                        *w /= norm;
                    }
                }
                vector
            })
            .collect();

        Self { terms, vectors }
    }

    /// Whether document `i` produced any usable tokens.
    pub fn has_text(&self, i: usize) -> bool {
        !self.vectors[i].is_empty()
    }

    /// Cosine similarity between documents `a` and `b`, clamped to [0, 1].
    pub fn similarity(&self, a: usize, b: usize) -> f64 {
        let (va, vb) = (&self.vectors[a], &self.vectors[b]);
        let mut dot = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < va.len() && j < vb.len() {
            match va[i].0.cmp(&vb[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += va[i].1 * vb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }

    /// Top `k` terms by accumulated weight across the given documents,
    /// heaviest first with an alphabetical tie-break. Used for cluster
    /// labels.
    pub fn top_terms(&self, doc_indices: &[usize], k: usize) -> Vec<String> {
        let mut weights: HashMap<u32, f64> = HashMap::new();
        for &i in doc_indices {
            for &(idx, w) in &self.vectors[i] {
                *weights.entry(idx).or_default() += w;
            }
        }
        let mut ranked: Vec<(u32, f64)> = weights.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| self.terms[a.0 as usize].cmp(&self.terms[b.0 as usize]))
        });
        ranked
            .into_iter()
            .take(k)
            .map(|(idx, _)| self.terms[idx as usize].clone())
            .collect()
    }
}

/// One above-threshold pair, indexed into the input text slice.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityPair {
    pub a: usize,
    pub b: usize,
    pub score: f64,
}

/// Result of a pairwise scan: the above-threshold pairs plus whether the
/// scan was cut short by cancellation.
#[derive(Debug, Default)]
pub struct PairwiseOutcome {
    pub pairs: Vec<SimilarityPair>,
    pub partial: bool,
}

/// Score all unordered pairs and keep those with similarity ≥ `threshold`.
///
/// Documents with no usable text are skipped; fewer than 2 usable documents
/// yields an empty outcome. On cancellation, blocks not yet started are
/// dropped and the outcome is flagged partial; already computed blocks are
/// kept.
pub fn pairwise_scores(
    texts: &[String],
    threshold: f64,
    block_size: usize,
    cancel: &CancellationToken,
) -> PairwiseOutcome {
    let model = TfIdfModel::fit(texts);
    let usable: Vec<usize> = (0..texts.len()).filter(|&i| model.has_text(i)).collect();
    if usable.len() < 2 {
        return PairwiseOutcome::default();
    }

    let mut all_pairs: Vec<(usize, usize)> = Vec::with_capacity(usable.len() * (usable.len() - 1) / 2);
    for (p, &i) in usable.iter().enumerate() {
        for &j in &usable[p + 1..] {
            all_pairs.push((i, j));
        }
    }

    let cancelled = AtomicBool::new(false);
    let mut pairs: Vec<SimilarityPair> = all_pairs
        .par_chunks(block_size)
        .map(|block| {
            if cancel.is_cancelled() {
                cancelled.store(true, Ordering::Relaxed);
                return Vec::new();
            }
            block
                .iter()
                .filter_map(|&(a, b)| {
                    let score = model.similarity(a, b);
                    (score >= threshold).then_some(SimilarityPair { a, b, score })
                })
                .collect()
        })
        .reduce(Vec::new, |mut acc, mut block| {
            acc.append(&mut block);
            acc
        });

    // rayon's reduce order is nondeterministic; restore pair order
    pairs.sort_unstable_by_key(|p| (p.a, p.b));

    let partial = cancelled.load(Ordering::Relaxed);
    if partial {
        tracing::debug!(
            kept = pairs.len(),
            total = all_pairs.len(),
            "similarity scan cancelled, keeping aggregated pairs"
        );
    }
    PairwiseOutcome { pairs, partial }
}
