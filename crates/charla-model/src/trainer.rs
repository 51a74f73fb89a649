use std::fs;
use std::path::Path;

use crate::artifact::ModelArtifact;
use crate::chain::ChainModel;
use crate::error::ModelError;
use crate::vocab::{tokenize, Vocab};

/// Minimum prompt/response pairs the trainer accepts. Below this there is
/// nothing meaningful to fit.
pub const MIN_TRAINING_PAIRS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct TrainSummary {
    pub pairs: usize,
    pub vocab_size: usize,
    pub loss: f32,
}

/// Fit a model on the training-pair file and persist it as an artifact.
///
/// The file holds alternating prompt/response lines. Each pair becomes one
/// `prompt + response` token sequence; the model learns next-token
/// statistics over those sequences, so a prompt conditions the start of
/// its response. The reported loss is the mean cross-entropy of the fitted
/// model over its own training sequences.
pub fn train(dataset: &Path, model_out: &Path) -> Result<TrainSummary, ModelError> {
    let raw = fs::read_to_string(dataset)?;
    let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    let mut i = 0;
    while i + 1 < lines.len() {
        pairs.push((lines[i], lines[i + 1]));
        i += 2;
    }

    if pairs.len() < MIN_TRAINING_PAIRS {
        return Err(ModelError::InsufficientData {
            pairs: pairs.len(),
            min: MIN_TRAINING_PAIRS,
        });
    }

    let vocab = Vocab::build(&lines.join(" "));
    let mut model = ChainModel::new(vocab.len());

    let mut sequences: Vec<Vec<usize>> = Vec::with_capacity(pairs.len());
    for (prompt, response) in &pairs {
        let mut sequence: Vec<usize> =
            tokenize(prompt).iter().map(|t| vocab.id(t)).collect();
        sequence.extend(tokenize(response).iter().map(|t| vocab.id(t)));
        for window in sequence.windows(2) {
            model.record_transition(window[0], window[1]);
        }
        sequences.push(sequence);
    }

    let loss = sequences
        .iter()
        .map(|s| model.sequence_cross_entropy(s))
        .sum::<f32>()
        / sequences.len() as f32;

    let summary = TrainSummary {
        pairs: pairs.len(),
        vocab_size: vocab.len(),
        loss,
    };

    ModelArtifact::new(model, vocab).save(model_out)?;
    tracing::info!(
        pairs = summary.pairs,
        vocab = summary.vocab_size,
        loss = summary.loss,
        "model trained"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATASET: &str = "hola\nhola como estas\nque haces\nnada\nadios\nhasta luego\n";

    #[test]
    fn test_train_writes_loadable_artifact() {
        let tmp = TempDir::new().unwrap();
        let dataset = tmp.path().join("data.txt");
        let model_path = tmp.path().join("model.json");
        fs::write(&dataset, DATASET).unwrap();

        let summary = train(&dataset, &model_path).unwrap();

        assert_eq!(summary.pairs, 3);
        assert!(summary.loss.is_finite());
        let artifact = ModelArtifact::load(&model_path).unwrap();
        assert_eq!(artifact.vocab.len(), summary.vocab_size);
        assert_ne!(artifact.vocab.id("hola"), 0);
    }

    #[test]
    fn test_prompt_conditions_response() {
        let tmp = TempDir::new().unwrap();
        let dataset = tmp.path().join("data.txt");
        let model_path = tmp.path().join("model.json");
        fs::write(&dataset, DATASET).unwrap();

        train(&dataset, &model_path).unwrap();
        let artifact = ModelArtifact::load(&model_path).unwrap();

        // "hola" was always followed by "hola" or "como" in training.
        let probs = artifact
            .model
            .next_token_probs(&[artifact.vocab.id("hola")]);
        assert!(probs[artifact.vocab.id("como")] > probs[artifact.vocab.id("nada")]);
    }

    #[test]
    fn test_too_few_pairs_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dataset = tmp.path().join("data.txt");
        fs::write(&dataset, "hola\nbuenas\n").unwrap();

        assert!(matches!(
            train(&dataset, &tmp.path().join("model.json")),
            Err(ModelError::InsufficientData { pairs: 1, .. })
        ));
    }
}
