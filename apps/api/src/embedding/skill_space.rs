#![allow(dead_code)]

//! Skill embedding space — distributional vectors over skill tokens.
//!
//! The vectors are trained offline (a subword-aware FastText job over a
//! skills dataset) and exported in word2vec text format; this module only
//! loads and serves them. Loaded once at startup, read-only thereafter.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Read-only vector space over skill tokens.
pub struct SkillSpace {
    dim: usize,
    vocab: Vec<String>,
    index: HashMap<String, usize>,
    /// Row-major `vocab.len() × dim`.
    vectors: Vec<f32>,
}

impl SkillSpace {
    /// Loads vectors from word2vec text format: an optional "count dim"
    /// header line, then one `token v1 v2 ... vD` line per token. Tokens are
    /// lowercased on load.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open skill vectors at {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut entries: Vec<(String, Vec<f32>)> = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let token = parts.next().unwrap_or_default();
            let values: Vec<f32> = parts
                .map(|p| p.parse::<f32>())
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("Malformed vector on line {}", line_no + 1))?;

            // word2vec header: "<count> <dim>" — a numeric token with one value
            if line_no == 0 && values.len() == 1 && token.parse::<usize>().is_ok() {
                continue;
            }
            entries.push((token.to_lowercase(), values));
        }

        if entries.is_empty() {
            bail!("Skill vector file {} contains no vectors", path.display());
        }
        let dim = entries[0].1.len();
        if let Some((token, _)) = entries.iter().find(|(_, v)| v.len() != dim) {
            bail!("Inconsistent vector dimension for token '{token}' (expected {dim})");
        }

        Ok(Self::from_entries(entries))
    }

    /// Builds a space from in-memory (token, vector) pairs. Later duplicates
    /// of a token are ignored.
    pub fn from_entries(entries: Vec<(String, Vec<f32>)>) -> Self {
        let dim = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut vocab = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        let mut vectors = Vec::with_capacity(entries.len() * dim);

        for (token, vector) in entries {
            if index.contains_key(&token) || vector.len() != dim {
                continue;
            }
            index.insert(token.clone(), vocab.len());
            vocab.push(token);
            vectors.extend_from_slice(&vector);
        }

        Self {
            dim,
            vocab,
            index,
            vectors,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(&token.to_lowercase())
    }

    /// All tokens in the space, in load order.
    pub fn vocab(&self) -> impl Iterator<Item = &str> {
        self.vocab.iter().map(String::as_str)
    }

    pub fn vector(&self, token: &str) -> Option<&[f32]> {
        let idx = *self.index.get(&token.to_lowercase())?;
        Some(&self.vectors[idx * self.dim..(idx + 1) * self.dim])
    }

    /// Mean of the vectors for the given tokens. Tokens outside the
    /// vocabulary are ignored; an empty or fully-unknown set yields the zero
    /// vector.
    pub fn mean_vector<I, S>(&self, tokens: I) -> Vec<f32>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sum = vec![0.0f32; self.dim];
        let mut count = 0usize;
        for token in tokens {
            if let Some(v) = self.vector(token.as_ref()) {
                for (acc, x) in sum.iter_mut().zip(v) {
                    *acc += x;
                }
                count += 1;
            }
        }
        if count > 0 {
            for acc in &mut sum {
                *acc /= count as f32;
            }
        }
        sum
    }

    /// Cosine similarity between two tokens; None when either is outside the
    /// vocabulary.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        Some(cosine_similarity(self.vector(a)?, self.vector(b)?))
    }
}

/// Cosine similarity clamped to [0, 1]; zero-norm inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}
