use serde::{Deserialize, Serialize};

const DEFAULT_DECAY: f32 = 0.5;
const DEFAULT_SMOOTHING: f32 = 0.1;
const PROB_FLOOR: f32 = 1e-15;

/// Next-token sequence model backed by a dense transition table.
///
/// The distribution over the vocabulary conditions on the whole context:
/// each context token contributes its transition row, weighted by a
/// geometric decay in recency, on top of a flat add-k smoothing floor.
/// This is the entire model contract the decoder relies on; it keeps the
/// artifact small and the next-token interface cheap to evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainModel {
    vocab_size: usize,
    decay: f32,
    smoothing: f32,
    transitions: Vec<f32>,
}

impl ChainModel {
    pub fn new(vocab_size: usize) -> Self {
        Self::with_params(vocab_size, DEFAULT_DECAY, DEFAULT_SMOOTHING)
    }

    pub fn with_params(vocab_size: usize, decay: f32, smoothing: f32) -> Self {
        Self {
            vocab_size,
            decay,
            smoothing,
            transitions: vec![0.0; vocab_size * vocab_size],
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Record one observed `from -> to` adjacency.
    pub fn record_transition(&mut self, from: usize, to: usize) {
        if from < self.vocab_size && to < self.vocab_size {
            self.transitions[from * self.vocab_size + to] += 1.0;
        }
    }

    fn row(&self, token: usize) -> &[f32] {
        let start = token * self.vocab_size;
        &self.transitions[start..start + self.vocab_size]
    }

    /// Probability distribution over the next token given a context of
    /// token indices. Always sums to 1; degenerate mass falls back to a
    /// uniform distribution rather than NaN.
    pub fn next_token_probs(&self, context: &[usize]) -> Vec<f32> {
        let n = self.vocab_size;
        let mut scores = vec![self.smoothing; n];

        let mut weight = 1.0f32;
        for &token in context.iter().rev() {
            if token < n {
                for (score, count) in scores.iter_mut().zip(self.row(token)) {
                    *score += weight * count;
                }
            }
            weight *= self.decay;
            if weight == 0.0 {
                break;
            }
        }

        let sum: f32 = scores.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            let uniform = 1.0 / (n as f32).max(1.0);
            return vec![uniform; n];
        }
        for score in scores.iter_mut() {
            *score /= sum;
        }
        scores
    }

    /// Mean negative log-likelihood of a token sequence under the model.
    /// Reported by the trainer as a fit diagnostic.
    pub fn sequence_cross_entropy(&self, sequence: &[usize]) -> f32 {
        if sequence.len() < 2 {
            return 0.0;
        }
        let mut loss = 0.0f32;
        let mut steps = 0usize;
        for i in 1..sequence.len() {
            let target = sequence[i];
            if target >= self.vocab_size {
                continue;
            }
            let probs = self.next_token_probs(&sequence[..i]);
            loss -= probs[target].max(PROB_FLOOR).ln();
            steps += 1;
        }
        loss / (steps as f32).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_sums_to_one() {
        let mut model = ChainModel::new(4);
        model.record_transition(1, 2);
        model.record_transition(1, 3);
        model.record_transition(2, 1);

        for context in [&[1usize][..], &[2, 1], &[3]] {
            let probs = model.next_token_probs(context);
            assert_eq!(probs.len(), 4);
            let sum: f32 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_observed_transition_dominates() {
        let mut model = ChainModel::new(3);
        for _ in 0..50 {
            model.record_transition(1, 2);
        }
        let probs = model.next_token_probs(&[1]);
        assert!(probs[2] > 0.9);
    }

    #[test]
    fn test_unseen_context_falls_back_to_uniform() {
        let model = ChainModel::with_params(4, 0.5, 0.0);
        let probs = model.next_token_probs(&[1]);
        assert!(probs.iter().all(|&p| (p - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_training_reduces_cross_entropy() {
        let seq = [1usize, 2, 3, 1, 2, 3];
        let blank = ChainModel::new(4);
        let mut trained = ChainModel::new(4);
        for pair in seq.windows(2) {
            trained.record_transition(pair[0], pair[1]);
        }
        assert!(trained.sequence_cross_entropy(&seq) < blank.sequence_cross_entropy(&seq));
    }
}
