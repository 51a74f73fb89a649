use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use charla_core::{ChatPaths, TrainLog};

#[derive(Args)]
pub struct LogsArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &LogsArgs) -> Result<()> {
    let paths = ChatPaths::new(&args.dir);
    let log = TrainLog::open(paths.train_log());
    let text = log.read().context("Failed to read the training log")?;
    if text.trim().is_empty() {
        println!("Sin registros de entrenamiento todavía.");
    } else {
        print!("{text}");
    }
    Ok(())
}
