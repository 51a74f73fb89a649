use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::open_service;

#[derive(Args)]
pub struct ResetArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &ResetArgs) -> Result<()> {
    let service = open_service(&args.dir, None)?;
    service
        .reset_model()
        .context("Failed to reset the model")?;
    println!("Modelo eliminado y corpus vaciado.");
    Ok(())
}
