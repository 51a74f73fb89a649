use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{describe_outcome, open_service};

#[derive(Args)]
pub struct AskArgs {
    /// Message to send
    pub message: String,

    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Fixed RNG seed for reproducible replies
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &AskArgs) -> Result<()> {
    let service = open_service(&args.dir, args.seed)?;
    let turn = service.handle_message(&args.message);
    println!("{}", turn.reply);

    // A one-shot invocation cannot leave training running behind it.
    if let Some(handle) = turn.training {
        eprintln!("Entrenamiento iniciado; esperando...");
        eprintln!("{}", describe_outcome(&handle.join()));
    }
    Ok(())
}
