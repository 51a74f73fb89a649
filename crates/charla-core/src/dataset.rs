use std::fs;
use std::io::Write as _;
use std::path::Path;

use crate::corpus::CorpusStore;
use crate::error::CoreError;

/// Transform accepted corpus exchanges into flat prompt/response line
/// pairs appended to the training-pair file. The training file grows
/// monotonically across cycles; only an explicit reset shrinks it.
///
/// Returns the number of pairs appended.
pub fn build_dataset(corpus: &Path, dataset: &Path) -> Result<usize, CoreError> {
    let store = CorpusStore::open(corpus);
    let records = store.records()?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dataset)?;
    fs2::FileExt::lock_exclusive(&file)?;
    let mut result = Ok(());
    for record in &records {
        if let Err(e) =
            (&file).write_all(format!("{}\n{}\n", record.utterance, record.reply).as_bytes())
        {
            result = Err(e);
            break;
        }
    }
    fs2::FileExt::unlock(&file)?;
    result?;

    tracing::info!(pairs = records.len(), "dataset built");
    Ok(records.len())
}

/// Count non-blank lines in the training-pair file. Zero if absent.
pub fn dataset_line_count(dataset: &Path) -> Result<usize, CoreError> {
    if !dataset.exists() {
        return Ok(0);
    }
    let raw = fs::read_to_string(dataset)?;
    Ok(raw.lines().filter(|l| !l.trim().is_empty()).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pairs_appended_in_order() {
        let tmp = TempDir::new().unwrap();
        let corpus = tmp.path().join("chat_logs.txt");
        let dataset = tmp.path().join("data.txt");
        fs::write(
            &corpus,
            "usuario: hola\nia: buenas\nusuario: que haces\nia: nada\n",
        )
        .unwrap();
        fs::write(&dataset, "previo\ncontenido\n").unwrap();

        let appended = build_dataset(&corpus, &dataset).unwrap();

        assert_eq!(appended, 2);
        assert_eq!(
            fs::read_to_string(&dataset).unwrap(),
            "previo\ncontenido\nhola\nbuenas\nque haces\nnada\n"
        );
    }

    #[test]
    fn test_malformed_corpus_lines_do_not_produce_pairs() {
        let tmp = TempDir::new().unwrap();
        let corpus = tmp.path().join("chat_logs.txt");
        let dataset = tmp.path().join("data.txt");
        fs::write(&corpus, "ia: huerfana\nusuario: hola\nia: buenas\n").unwrap();

        let appended = build_dataset(&corpus, &dataset).unwrap();

        assert_eq!(appended, 1);
        assert_eq!(fs::read_to_string(&dataset).unwrap(), "hola\nbuenas\n");
    }

    #[test]
    fn test_missing_corpus_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(build_dataset(
            &tmp.path().join("chat_logs.txt"),
            &tmp.path().join("data.txt")
        )
        .is_err());
    }

    #[test]
    fn test_dataset_line_count() {
        let tmp = TempDir::new().unwrap();
        let dataset = tmp.path().join("data.txt");
        assert_eq!(dataset_line_count(&dataset).unwrap(), 0);
        fs::write(&dataset, "hola\n\nbuenas\n").unwrap();
        assert_eq!(dataset_line_count(&dataset).unwrap(), 2);
    }
}
