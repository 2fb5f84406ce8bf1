//! Cause-of-death tagging by sentence similarity.
//!
//! Every cause is embedded once. A report's cause section is split into
//! sentences, and each cause scores the best cosine similarity it reaches
//! against any sentence. The highest scoring causes above a threshold become
//! the report's tags.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::report::Report;

/// Turns text into a fixed-length vector.
pub trait Embedder: Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Hashed bag of words: each lower-cased word and word bigram adds weight to
/// one bucket, and the vector is L2-normalised.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(512)
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dim];
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect();

        for word in &words {
            vector[bucket(word.as_bytes(), self.dim)] += 1.0;
        }
        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            vector[bucket(bigram.as_bytes(), self.dim)] += 0.5;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

// FNV-1a, stable across builds
fn bucket(bytes: &[u8], dim: usize) -> usize {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (hash % dim as u64) as usize
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(dot / denom)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CauseLabel {
    pub cause: String,
    pub similarity: f64,
}

pub struct CauseLabeler<'a, E: Embedder> {
    embedder: &'a E,
    causes: Vec<String>,
    cause_embeds: Vec<Vec<f32>>,
    max_num: usize,
    min_similarity: f64,
}

impl<'a, E: Embedder> CauseLabeler<'a, E> {
    pub fn new(embedder: &'a E, causes: Vec<String>, max_num: usize, min_similarity: f64) -> Self {
        let start_time = Instant::now();
        let cause_embeds = causes
            .par_iter()
            .map(|cause| embedder.embed(cause))
            .collect();

        info!(
            action = "complete",
            component = "cause_embedding",
            cause_count = causes.len(),
            duration_ms = start_time.elapsed().as_millis(),
            "Calculated cause embeddings"
        );
        Self {
            embedder,
            causes,
            cause_embeds,
            max_num,
            min_similarity,
        }
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// The `max_num` causes most similar to any sentence of `text`.
    pub fn most_likely(&self, text: &str) -> Vec<CauseLabel> {
        let sentence_embeds: Vec<Vec<f32>> = text
            .split('.')
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .map(|sentence| self.embedder.embed(sentence))
            .collect();
        if sentence_embeds.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = self
            .cause_embeds
            .iter()
            .enumerate()
            .map(|(index, cause)| {
                let best = sentence_embeds
                    .iter()
                    .filter_map(|sentence| cosine_similarity(cause, sentence))
                    .fold(f64::NEG_INFINITY, f64::max);
                (index, best)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        scored
            .into_iter()
            .take(self.max_num)
            .filter(|(_, similarity)| *similarity > self.min_similarity)
            .map(|(index, similarity)| CauseLabel {
                cause: self.causes[index].clone(),
                similarity,
            })
            .collect()
    }

    /// Labels every report in parallel; reports without a cause section get no labels.
    pub fn label_reports(&self, reports: &[Report]) -> Vec<Vec<CauseLabel>> {
        let start_time = Instant::now();
        let labels: Vec<Vec<CauseLabel>> = reports
            .par_iter()
            .map(|report| {
                report
                    .cause_section()
                    .map(|section| self.most_likely(&section))
                    .unwrap_or_default()
            })
            .collect();

        info!(
            action = "complete",
            component = "cause_labeling",
            report_count = labels.len(),
            labeled_count = labels.iter().filter(|l| !l.is_empty()).count(),
            duration_ms = start_time.elapsed().as_millis(),
            "Calculated tags"
        );
        labels
    }
}

pub fn format_labels(labels: &[CauseLabel]) -> String {
    labels
        .iter()
        .map(|label| format!("{} ({:.3})", label.cause, label.similarity))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Reads one cause per line, lower-cased; blank lines and `#` comments are skipped.
pub fn load_causes(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        anyhow::bail!("Causes file not found: {:?}", path);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let causes: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect();

    info!(action = "loaded", component = "causes_file", cause_count = causes.len(), file_path = ?path, "Loaded causes from file");
    Ok(causes)
}
