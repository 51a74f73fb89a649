use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use charla_core::ChatPaths;

#[derive(Args)]
pub struct CleanArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &CleanArgs) -> Result<()> {
    let paths = ChatPaths::new(&args.dir);
    let report = charla_core::clean_files(&paths.corpus(), &paths.dataset())
        .context("Failed to clean the chat files")?;
    println!(
        "Limpieza completada: {} líneas eliminadas del corpus, {} del dataset",
        report.corpus_removed, report.dataset_removed
    );
    Ok(())
}
