use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use charla_core::ChatPaths;

#[derive(Args)]
pub struct BuildDatasetArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &BuildDatasetArgs) -> Result<()> {
    let paths = ChatPaths::new(&args.dir);
    let pairs = charla_core::build_dataset(&paths.corpus(), &paths.dataset())
        .context("Failed to build the dataset")?;
    println!("{pairs} pares añadidos al dataset");
    Ok(())
}
