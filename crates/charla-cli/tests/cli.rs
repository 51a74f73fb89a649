use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn charla() -> Command {
    Command::cargo_bin("charla").unwrap()
}

#[test]
fn test_build_dataset_appends_pairs() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("chat_logs.txt"),
        "usuario: hola\nia: buenas\nusuario: que tal\nia: bien\n",
    )
    .unwrap();

    charla()
        .args(["build-dataset", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 pares"));

    let dataset = fs::read_to_string(tmp.path().join("data.txt")).unwrap();
    assert_eq!(dataset, "hola\nbuenas\nque tal\nbien\n");
}

#[test]
fn test_build_dataset_fails_without_corpus() {
    let tmp = TempDir::new().unwrap();

    charla()
        .args(["build-dataset", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure();
}

#[test]
fn test_train_model_rejects_insufficient_pairs() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("data.txt"), "hola\nbuenas\n").unwrap();

    charla()
        .args(["train-model", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to train"));

    assert!(!tmp.path().join("model.json").exists());
}

#[test]
fn test_train_model_writes_artifact() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("data.txt"),
        "hola\nbuenas\nque haces\nnada\ncomo estas\nbien\n",
    )
    .unwrap();

    charla()
        .args(["train-model", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 pares"));

    let raw = fs::read_to_string(tmp.path().join("model.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.get("model_state").is_some());
    assert!(value.get("stoi").is_some());
    assert!(value.get("itos").is_some());
}

#[test]
fn test_status_json_reports_files() {
    let tmp = TempDir::new().unwrap();

    let output = charla()
        .args(["status", "--json", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .get_output()
        .clone();

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // Opening the service seeds corpus and dataset in an empty directory.
    assert_eq!(status["model_exists"], serde_json::json!(false));
    assert_eq!(status["corpus_exists"], serde_json::json!(true));
    assert_eq!(status["training_active"], serde_json::json!(false));
    assert_eq!(status["lock_present"], serde_json::json!(false));
}

#[test]
fn test_ask_degraded_reply_is_not_stored() {
    let tmp = TempDir::new().unwrap();

    charla()
        .args(["ask", "hola", "--seed", "7", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("no puedo generar"));

    let corpus = fs::read_to_string(tmp.path().join("chat_logs.txt")).unwrap();
    assert_eq!(corpus, "");
}

#[test]
fn test_ask_replies_with_trained_model() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("data.txt"),
        "hola\nbuenas\nque haces\nnada\ncomo estas\nbien\n",
    )
    .unwrap();

    charla()
        .args(["train-model", "--dir"])
        .arg(tmp.path())
        .assert()
        .success();

    charla()
        .args(["ask", "hola", "--seed", "7", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_ask_empty_message_prompts_for_input() {
    let tmp = TempDir::new().unwrap();

    charla()
        .args(["ask", "   ", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Por favor, escribe un mensaje"));
}

#[test]
fn test_clean_drops_oversized_lines() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("chat_logs.txt"),
        "usuario: hola\nia: una respuesta larguisima con muchas mas de ocho palabras en total aqui\n",
    )
    .unwrap();
    fs::write(tmp.path().join("data.txt"), "hola\nbuenas\n").unwrap();

    charla()
        .args(["clean", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 líneas eliminadas del corpus"));

    let corpus = fs::read_to_string(tmp.path().join("chat_logs.txt")).unwrap();
    assert_eq!(corpus, "usuario: hola\n");
}

#[test]
fn test_logs_reports_empty_log() {
    let tmp = TempDir::new().unwrap();

    charla()
        .args(["logs", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Sin registros"));
}

#[test]
fn test_reset_removes_model_and_clears_corpus() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("model.json"), "{}").unwrap();
    fs::write(tmp.path().join("chat_logs.txt"), "usuario: hola\nia: buenas\n").unwrap();

    charla()
        .args(["reset", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Modelo eliminado"));

    assert!(!tmp.path().join("model.json").exists());
    let corpus = fs::read_to_string(tmp.path().join("chat_logs.txt")).unwrap();
    assert_eq!(corpus, "");
}