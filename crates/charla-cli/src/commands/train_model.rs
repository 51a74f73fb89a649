use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use charla_core::ChatPaths;

#[derive(Args)]
pub struct TrainModelArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &TrainModelArgs) -> Result<()> {
    let paths = ChatPaths::new(&args.dir);
    let summary = charla_model::train(&paths.dataset(), &paths.model())
        .context("Failed to train the model")?;
    println!(
        "Modelo entrenado: {} pares, vocabulario de {} palabras, pérdida {:.4}",
        summary.pairs, summary.vocab_size, summary.loss
    );
    Ok(())
}
