use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::open_service;

#[derive(Args)]
pub struct StatusArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &StatusArgs) -> Result<()> {
    let service = open_service(&args.dir, None)?;
    let status = service.status();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("Failed to serialize status")?
        );
        return Ok(());
    }

    println!("Estado a {}", status.timestamp);
    if status.model_exists {
        let bytes = status.model_bytes.unwrap_or(0);
        println!("  modelo: presente ({bytes} bytes)");
    } else {
        println!("  modelo: ausente");
    }
    println!(
        "  corpus: {} líneas ({} conversaciones)",
        status.corpus_lines, status.conversations
    );
    println!("  dataset: {} líneas", status.dataset_lines);
    println!(
        "  entrenamiento: {}",
        if status.training_active {
            "en curso"
        } else {
            "inactivo"
        }
    );
    if status.lock_present {
        println!("  lock de entrenamiento presente");
    }
    if status.should_train {
        println!("  el próximo mensaje almacenado lanzará un entrenamiento");
    }
    Ok(())
}
