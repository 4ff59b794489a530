//! ROUGE overlap scores between reference and generated summaries

use crisisbrief_common::{CrisisBriefError, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Precision, recall and F1 of one ROUGE variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl RougeScore {
    fn from_overlap(overlap: usize, candidate_total: usize, reference_total: usize) -> Self {
        if overlap == 0 || candidate_total == 0 || reference_total == 0 {
            return Self::default();
        }
        let precision = overlap as f64 / candidate_total as f64;
        let recall = overlap as f64 / reference_total as f64;
        Self {
            precision,
            recall,
            f1: 2.0 * precision * recall / (precision + recall),
        }
    }

    fn add(&mut self, other: &Self) {
        self.precision += other.precision;
        self.recall += other.recall;
        self.f1 += other.f1;
    }

    fn scale(&mut self, factor: f64) {
        self.precision *= factor;
        self.recall *= factor;
        self.f1 *= factor;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub rouge_1: RougeScore,
    pub rouge_2: RougeScore,
    pub rouge_l: RougeScore,
}

impl SummaryMetrics {
    /// Multi-line table for terminal output
    pub fn render(&self, title: &str) -> String {
        let rule = "=".repeat(60);
        let mut out = format!("{}\n{}\n{}\n", rule, title, rule);
        for (name, score) in [
            ("ROUGE-1", &self.rouge_1),
            ("ROUGE-2", &self.rouge_2),
            ("ROUGE-L", &self.rouge_l),
        ] {
            out.push_str(&format!(
                "{} F1:  {:.4} (P: {:.4}, R: {:.4})\n",
                name, score.f1, score.precision, score.recall
            ));
        }
        out.push_str(&rule);
        out
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

fn rouge_n(reference: &[String], candidate: &[String], n: usize) -> RougeScore {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);

    let overlap = candidate_counts
        .iter()
        .map(|(gram, count)| (*count).min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();

    RougeScore::from_overlap(
        overlap,
        candidate_counts.values().sum(),
        reference_counts.values().sum(),
    )
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// ROUGE-1, ROUGE-2 and ROUGE-L of `candidate` against `reference`
pub fn rouge(reference: &str, candidate: &str) -> SummaryMetrics {
    let reference = tokenize(reference);
    let candidate = tokenize(candidate);

    SummaryMetrics {
        rouge_1: rouge_n(&reference, &candidate, 1),
        rouge_2: rouge_n(&reference, &candidate, 2),
        rouge_l: RougeScore::from_overlap(
            lcs_len(&reference, &candidate),
            candidate.len(),
            reference.len(),
        ),
    }
}

/// Average scores over reference/candidate pairs
pub fn evaluate_batch(references: &[String], candidates: &[String]) -> Result<SummaryMetrics> {
    if references.len() != candidates.len() {
        return Err(CrisisBriefError::invalid_input(format!(
            "references and candidates must have the same length ({} vs {})",
            references.len(),
            candidates.len()
        )));
    }
    if references.is_empty() {
        return Err(CrisisBriefError::invalid_input("no summaries to evaluate"));
    }

    let mut total = SummaryMetrics::default();
    for (reference, candidate) in references.iter().zip(candidates) {
        let metrics = rouge(reference, candidate);
        total.rouge_1.add(&metrics.rouge_1);
        total.rouge_2.add(&metrics.rouge_2);
        total.rouge_l.add(&metrics.rouge_l);
    }

    let factor = 1.0 / references.len() as f64;
    total.rouge_1.scale(factor);
    total.rouge_2.scale(factor);
    total.rouge_l.scale(factor);

    info!("Evaluated {} summary pairs", references.len());
    Ok(total)
}
