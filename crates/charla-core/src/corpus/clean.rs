use std::fs;
use std::path::Path;

use crate::corpus::accept::{MAX_WORDS, MIN_WORDS};
use crate::error::CoreError;

/// Corpus lines are kept up to 8 words: the accept bound of 6 plus the
/// room a label prefix and trailing filler can add.
const MAX_CORPUS_LINE_WORDS: usize = 8;

/// Lines removed by a cleaning pass, per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub corpus_removed: usize,
    pub dataset_removed: usize,
}

impl CleanReport {
    pub fn total(&self) -> usize {
        self.corpus_removed + self.dataset_removed
    }
}

fn rewrite_filtered(
    path: &Path,
    keep: impl Fn(&str) -> bool,
) -> Result<usize, CoreError> {
    if !path.exists() {
        return Ok(0);
    }
    let raw = fs::read_to_string(path)?;
    let mut kept = String::new();
    let mut removed = 0;
    for line in raw.lines() {
        let line = line.trim();
        if !line.is_empty() && keep(line) {
            kept.push_str(line);
            kept.push('\n');
        } else {
            removed += 1;
        }
    }
    fs::write(path, kept)?;
    Ok(removed)
}

/// Reapply the word-count filters to the persisted files without touching
/// the model: corpus lines over 8 words and dataset lines outside 1..=6
/// words are dropped, never repaired.
pub fn clean_files(corpus: &Path, dataset: &Path) -> Result<CleanReport, CoreError> {
    let corpus_removed = rewrite_filtered(corpus, |line| {
        line.split_whitespace().count() <= MAX_CORPUS_LINE_WORDS
    })?;
    if corpus_removed > 0 {
        tracing::info!(removed = corpus_removed, "dropped oversized corpus lines");
    }

    let dataset_removed = rewrite_filtered(dataset, |line| {
        (MIN_WORDS..=MAX_WORDS).contains(&line.split_whitespace().count())
    })?;
    if dataset_removed > 0 {
        tracing::info!(removed = dataset_removed, "dropped oversized dataset lines");
    }

    Ok(CleanReport {
        corpus_removed,
        dataset_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_oversized_lines_dropped() {
        let tmp = TempDir::new().unwrap();
        let corpus = tmp.path().join("chat_logs.txt");
        let dataset = tmp.path().join("data.txt");
        fs::write(
            &corpus,
            "usuario: hola\nia: una frase con claramente muchas mas de ocho palabras dentro\n",
        )
        .unwrap();
        fs::write(&dataset, "hola\nuna linea larga de siete palabras aqui\n\nbien\n").unwrap();

        let report = clean_files(&corpus, &dataset).unwrap();

        assert_eq!(report.corpus_removed, 1);
        // the 7-word line and the blank line
        assert_eq!(report.dataset_removed, 2);
        assert_eq!(fs::read_to_string(&corpus).unwrap(), "usuario: hola\n");
        assert_eq!(fs::read_to_string(&dataset).unwrap(), "hola\nbien\n");
    }

    #[test]
    fn test_missing_files_are_a_noop() {
        let tmp = TempDir::new().unwrap();
        let report = clean_files(
            &tmp.path().join("chat_logs.txt"),
            &tmp.path().join("data.txt"),
        )
        .unwrap();
        assert_eq!(report.total(), 0);
    }
}
