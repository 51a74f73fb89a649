use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::chain::ChainModel;
use crate::error::ModelError;
use crate::vocab::{Vocab, UNKNOWN_TOKEN};

/// A persisted model: weight state plus both vocabulary directions.
///
/// Two shapes are recognized on disk. The current bundle:
///
/// ```json
/// {"model_state": …, "stoi": {"hola": 1}, "itos": {"1": "hola"}, "vocab_size": 2}
/// ```
///
/// and the legacy 3-tuple `[model_state, stoi, itos]`. Anything else is a
/// fatal load error: a partially written or absent artifact means "no
/// model available", never a guess.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub model: ChainModel,
    pub vocab: Vocab,
}

impl ModelArtifact {
    pub fn new(model: ChainModel, vocab: Vocab) -> Self {
        Self { model, vocab }
    }

    /// Write the bundle shape atomically: temp file in the same directory,
    /// then rename over the target.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let stoi: HashMap<&str, usize> = self.vocab.entries().collect();
        let itos: HashMap<String, &str> = self
            .vocab
            .entries()
            .map(|(w, i)| (i.to_string(), w))
            .collect();
        let bundle = json!({
            "model_state": serde_json::to_value(&self.model)?,
            "stoi": stoi,
            "itos": itos,
            "vocab_size": self.vocab.len(),
        });

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&bundle)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;

        let (state, stoi) = match &value {
            Value::Object(map)
                if map.contains_key("model_state")
                    && map.contains_key("stoi")
                    && map.contains_key("itos") =>
            {
                (&map["model_state"], &map["stoi"])
            }
            Value::Array(items) if items.len() == 3 => (&items[0], &items[1]),
            _ => return Err(ModelError::UnrecognizedShape(path.to_path_buf())),
        };

        let model: ChainModel = serde_json::from_value(state.clone())?;
        let stoi: HashMap<String, usize> = serde_json::from_value(stoi.clone())?;
        let vocab = vocab_from_stoi(stoi);

        if model.vocab_size() != vocab.len() {
            return Err(ModelError::VocabMismatch {
                model: model.vocab_size(),
                vocab: vocab.len(),
            });
        }
        Ok(Self { model, vocab })
    }
}

fn vocab_from_stoi(stoi: HashMap<String, usize>) -> Vocab {
    let size = stoi.values().max().map_or(1, |&m| m + 1);
    let mut words = vec![UNKNOWN_TOKEN.to_string(); size];
    for (word, index) in stoi {
        if index > 0 && index < size {
            words[index] = word;
        }
    }
    Vocab::from_words(words)
}
